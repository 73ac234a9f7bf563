//! 指し手
//!
//! - `Move`: 正規形。移動元・移動先・動かした駒・取った駒・手番・打ち/成りフラグを持つ
//! - `Move16`: 置換表に保存する16bit形式
//! - USI 文字列との相互変換（`usi`）

mod compact;
mod usi;

pub use compact::Move16;
pub use usi::UsiMoveError;

use std::fmt;

use crate::types::{Color, Piece, PieceType, Square};

const FLAG_DROP: u8 = 1;
const FLAG_PROMOTE: u8 = 2;

/// 駒打ちの移動元に入れる値（盤外）
const FROM_HAND: u8 = Square::NUM as u8;

/// 指し手（正規形）
///
/// 等価比較は全フィールドの比較。`RESIGN`/`WIN`/`NONE` は移動元と移動先が同じ升という、
/// 実際の指し手ではありえない形で表現する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: u8,
    to: u8,
    piece: Piece,
    captured: Piece,
    side: Color,
    flags: u8,
}

impl Move {
    /// 投了
    pub const RESIGN: Move = Move::special(2);
    /// 入玉宣言勝ち
    pub const WIN: Move = Move::special(3);
    /// 指し手なし
    pub const NONE: Move = Move::special(4);

    const fn special(sq: u8) -> Move {
        Move {
            from: sq,
            to: sq,
            piece: Piece::EMPTY,
            captured: Piece::EMPTY,
            side: Color::Black,
            flags: 0,
        }
    }

    /// 盤上の駒を動かす指し手
    ///
    /// `piece` は移動前の駒、`captured` は移動先にあった駒（無ければ `Piece::EMPTY`）。
    #[inline]
    pub const fn normal(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
        promote: bool,
    ) -> Move {
        Move {
            from: from.raw(),
            to: to.raw(),
            piece,
            captured,
            side: piece.color(),
            flags: if promote { FLAG_PROMOTE } else { 0 },
        }
    }

    /// 駒打ち
    #[inline]
    pub const fn drop(side: Color, piece_type: PieceType, to: Square) -> Move {
        Move {
            from: FROM_HAND,
            to: to.raw(),
            piece: Piece::new(side, piece_type),
            captured: Piece::EMPTY,
            side,
            flags: FLAG_DROP,
        }
    }

    /// 移動元（駒打ち・特殊な指し手は None）
    #[inline]
    pub const fn from(self) -> Option<Square> {
        if self.is_drop() || self.is_special() {
            None
        } else {
            Square::from_index(self.from as usize)
        }
    }

    #[inline]
    pub const fn to(self) -> Square {
        match Square::from_index(self.to as usize) {
            Some(sq) => sq,
            None => Square::SQ_11,
        }
    }

    /// 動かした駒（成る前）。駒打ちなら打った駒
    #[inline]
    pub const fn piece(self) -> Piece {
        self.piece
    }

    /// 移動後の駒
    #[inline]
    pub const fn moved_piece_after(self) -> Piece {
        if self.is_promote() {
            self.piece.promote()
        } else {
            self.piece
        }
    }

    #[inline]
    pub const fn captured(self) -> Piece {
        self.captured
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        !self.captured.is_empty()
    }

    #[inline]
    pub const fn side(self) -> Color {
        self.side
    }

    #[inline]
    pub const fn is_drop(self) -> bool {
        self.flags & FLAG_DROP != 0
    }

    #[inline]
    pub const fn is_promote(self) -> bool {
        self.flags & FLAG_PROMOTE != 0
    }

    /// 投了・宣言勝ち・指し手なしのいずれか
    #[inline]
    pub const fn is_special(self) -> bool {
        !self.is_drop() && self.from == self.to
    }

    /// 玉を動かす指し手か
    #[inline]
    pub const fn is_king_move(self) -> bool {
        matches!(self.piece.piece_type(), Some(PieceType::King)) && !self.is_drop()
    }

    #[inline]
    pub fn to_move16(self) -> Move16 {
        Move16::from_move(self)
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NONE
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_usi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_moves_are_distinct() {
        assert_ne!(Move::RESIGN, Move::WIN);
        assert_ne!(Move::WIN, Move::NONE);
        assert!(Move::RESIGN.is_special());
        assert_eq!(Move::NONE.from(), None);
    }

    #[test]
    fn test_normal_move_fields() {
        let piece = Piece::new(Color::Black, PieceType::Silver);
        let captured = Piece::new(Color::White, PieceType::Pawn);
        let mv = Move::normal(Square::new(2, 3), Square::new(2, 2), piece, captured, true);
        assert_eq!(mv.from(), Some(Square::new(2, 3)));
        assert_eq!(mv.to(), Square::new(2, 2));
        assert_eq!(mv.side(), Color::Black);
        assert!(mv.is_capture());
        assert!(mv.is_promote());
        assert!(!mv.is_special());
        assert_eq!(
            mv.moved_piece_after(),
            Piece::new(Color::Black, PieceType::ProSilver)
        );
    }

    #[test]
    fn test_drop_fields() {
        let mv = Move::drop(Color::White, PieceType::Knight, Square::new(4, 4));
        assert!(mv.is_drop());
        assert_eq!(mv.from(), None);
        assert_eq!(mv.piece(), Piece::new(Color::White, PieceType::Knight));
        assert!(!mv.is_king_move());
    }
}
