//! 升（Square）
//!
//! 内部表現は `file * 9 + rank`。file 0 が USI の `1` 筋、rank 0 が `a` 段。

use std::fmt;

use super::Color;

/// 盤上の升
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// 升の数
    pub const NUM: usize = 81;
    /// 筋・段の数
    pub const FILES: u8 = 9;

    /// 1一
    pub const SQ_11: Square = Square(0);
    /// 9九
    pub const SQ_99: Square = Square(80);

    /// 筋・段から作成
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Square {
        debug_assert!(file < 9 && rank < 9);
        Square(file * 9 + rank)
    }

    /// インデックスから作成（範囲外なら None）
    #[inline]
    pub const fn from_index(index: usize) -> Option<Square> {
        if index < Self::NUM {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 / 9
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 % 9
    }

    /// 盤を180度回転させた升
    #[inline]
    pub const fn mirror(self) -> Square {
        Square(80 - self.0)
    }

    /// 手番から見た段（先手は一段目が0、後手は九段目が0）
    #[inline]
    pub const fn relative_rank(self, color: Color) -> u8 {
        match color {
            Color::Black => self.rank(),
            Color::White => 8 - self.rank(),
        }
    }

    /// 敵陣（相手側3段）にあるか
    #[inline]
    pub const fn is_promotion_zone(self, color: Color) -> bool {
        self.relative_rank(color) < 3
    }

    /// 筋・段方向にずらした升（盤外なら None）
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..9).contains(&file) && (0..9).contains(&rank) {
            Some(Square::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// 全ての升を列挙
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::NUM as u8).map(Square)
    }

    /// USI 形式の2文字（例: `7g`）から作成
    pub fn from_usi(file: u8, rank: u8) -> Option<Square> {
        if (b'1'..=b'9').contains(&file) && (b'a'..=b'i').contains(&rank) {
            Some(Square::new(file - b'1', rank - b'a'))
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'1' + self.file()) as char,
            (b'a' + self.rank()) as char
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_layout() {
        let sq = Square::new(6, 6);
        assert_eq!(sq.index(), 60);
        assert_eq!(sq.file(), 6);
        assert_eq!(sq.rank(), 6);
        assert_eq!(sq.to_string(), "7g");
    }

    #[test]
    fn test_square_mirror() {
        let sq = Square::new(1, 7);
        assert_eq!(sq.mirror(), Square::new(7, 1));
        assert_eq!(Square::SQ_11.mirror(), Square::SQ_99);
        for sq in Square::all() {
            assert_eq!(sq.mirror().mirror(), sq);
        }
    }

    #[test]
    fn test_square_usi() {
        assert_eq!(Square::from_usi(b'5', b'e'), Some(Square::new(4, 4)));
        assert_eq!(Square::from_usi(b'0', b'a'), None);
        assert_eq!(Square::from_usi(b'1', b'j'), None);
    }

    #[test]
    fn test_square_offset_bounds() {
        assert_eq!(Square::SQ_11.offset(-1, 0), None);
        assert_eq!(Square::SQ_11.offset(1, 1), Some(Square::new(1, 1)));
        assert_eq!(Square::SQ_99.offset(0, 1), None);
    }

    #[test]
    fn test_promotion_zone() {
        assert!(Square::new(4, 2).is_promotion_zone(Color::Black));
        assert!(!Square::new(4, 3).is_promotion_zone(Color::Black));
        assert!(Square::new(4, 6).is_promotion_zone(Color::White));
        assert!(!Square::new(4, 5).is_promotion_zone(Color::White));
    }
}
