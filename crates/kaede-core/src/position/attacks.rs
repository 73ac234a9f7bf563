//! 駒の利き
//!
//! 方向は先手から見た (筋, 段) の増分。段は一段目方向が負。後手は段の符号を反転して使う。

use super::Position;
use crate::types::{Color, Piece, PieceType, Square};

pub(crate) type Direction = (i8, i8);

const PAWN_STEPS: &[Direction] = &[(0, -1)];
const KNIGHT_STEPS: &[Direction] = &[(-1, -2), (1, -2)];
const SILVER_STEPS: &[Direction] = &[(-1, -1), (0, -1), (1, -1), (-1, 1), (1, 1)];
const GOLD_STEPS: &[Direction] = &[(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (0, 1)];
const KING_STEPS: &[Direction] =
    &[(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
const ORTHOGONAL: &[Direction] = &[(0, -1), (0, 1), (-1, 0), (1, 0)];
const DIAGONAL: &[Direction] = &[(-1, -1), (1, -1), (-1, 1), (1, 1)];
const LANCE_SLIDE: &[Direction] = &[(0, -1)];

/// 1マスだけ進める方向
pub(crate) const fn step_directions(pt: PieceType) -> &'static [Direction] {
    match pt {
        PieceType::Pawn => PAWN_STEPS,
        PieceType::Knight => KNIGHT_STEPS,
        PieceType::Silver => SILVER_STEPS,
        PieceType::Gold
        | PieceType::ProPawn
        | PieceType::ProLance
        | PieceType::ProKnight
        | PieceType::ProSilver => GOLD_STEPS,
        PieceType::King => KING_STEPS,
        PieceType::Horse => ORTHOGONAL,
        PieceType::Dragon => DIAGONAL,
        PieceType::Lance | PieceType::Bishop | PieceType::Rook => &[],
    }
}

/// 駒に当たるまで進める方向
pub(crate) const fn slide_directions(pt: PieceType) -> &'static [Direction] {
    match pt {
        PieceType::Lance => LANCE_SLIDE,
        PieceType::Bishop | PieceType::Horse => DIAGONAL,
        PieceType::Rook | PieceType::Dragon => ORTHOGONAL,
        _ => &[],
    }
}

/// 先手視点の方向を手番に合わせる
#[inline]
pub(crate) const fn oriented(dir: Direction, color: Color) -> Direction {
    match color {
        Color::Black => dir,
        Color::White => (dir.0, -dir.1),
    }
}

impl Position {
    /// `sq` に `by` 側の駒が利いているか
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        // 周囲8方向に伸ばして最初に当たった駒を調べる
        for &(df, dr) in KING_STEPS {
            let mut cur = sq;
            let mut distance = 0;
            while let Some(next) = cur.offset(df, dr) {
                cur = next;
                distance += 1;
                let piece = self.piece_on(cur);
                if piece.is_empty() {
                    continue;
                }
                if piece.is_color(by) && attacks_toward(piece, (-df, -dr), distance) {
                    return true;
                }
                break;
            }
        }

        let knight = Piece::new(by, PieceType::Knight);
        KNIGHT_STEPS.iter().any(|&dir| {
            let (df, dr) = oriented(dir, by);
            sq.offset(-df, -dr)
                .is_some_and(|from| self.piece_on(from) == knight)
        })
    }

    /// `color` 側の玉に王手がかかっているか
    #[inline]
    pub fn in_check(&self, color: Color) -> bool {
        self.is_attacked(self.king_square(color), color.opponent())
    }
}

/// `piece` が絶対方向 `dir` に `distance` マス先まで利くか（間の升は空いている前提）
fn attacks_toward(piece: Piece, dir: Direction, distance: u32) -> bool {
    let Some(pt) = piece.piece_type() else {
        return false;
    };
    let relative = oriented(dir, piece.color());
    (distance == 1 && step_directions(pt).contains(&relative))
        || slide_directions(pt).contains(&relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_not_in_check() {
        let pos = Position::default();
        assert!(!pos.in_check(Color::Black));
        assert!(!pos.in_check(Color::White));
    }

    #[test]
    fn test_slider_blocked_and_open() {
        // 5九玉に5一香。間に駒があれば王手ではない
        let pos = Position::from_sfen("k3l4/9/9/9/9/9/9/9/4K4 b - 1").unwrap();
        assert!(pos.in_check(Color::Black));
        let pos = Position::from_sfen("k3l4/9/9/9/4P4/9/9/9/4K4 b - 1").unwrap();
        assert!(!pos.in_check(Color::Black));
        assert!(pos.is_attacked(Square::new(4, 3), Color::White));
    }

    #[test]
    fn test_checks_by_each_kind() {
        // 後手玉（5一、角の例のみ1一）に対する先手の駒
        let cases = [
            ("4k4/4P4/9/9/9/9/9/9/4K4 w - 1", true),  // 歩
            ("4k4/9/3N5/9/9/9/9/9/4K4 w - 1", true),  // 桂（6三→5一）
            ("4k4/9/4N4/9/9/9/9/9/4K4 w - 1", false), // 桂（5三からは利かない）
            ("4k4/3S5/9/9/9/9/9/9/4K4 w - 1", true),  // 銀の斜め前
            ("4k4/4S4/9/9/9/9/9/9/4K4 w - 1", true),  // 銀の前
            ("3Sk4/9/9/9/9/9/9/9/4K4 w - 1", false),  // 銀の横は利かない
            ("3Gk4/9/9/9/9/9/9/9/4K4 w - 1", true),   // 金の横
            ("8k/9/9/9/9/9/9/9/B3K4 w - 1", true),    // 角（9九→1一）
            ("4k4/9/9/9/9/9/9/4R4/4K4 w - 1", true),  // 飛車の縦
            ("4k4/9/9/9/9/9/9/9/3K+B4 w - 1", false), // 馬（5九）→5一は斜めでも隣でもない
            ("4k4/3+B5/9/9/9/9/9/9/4K4 w - 1", true), // 馬の斜め隣
        ];
        for (sfen, expected) in cases {
            let pos = Position::from_sfen(sfen).unwrap_or_else(|e| panic!("{sfen}: {e}"));
            assert_eq!(pos.in_check(Color::White), expected, "{sfen}");
        }
    }

    #[test]
    fn test_white_pawn_attacks_downward() {
        let pos = Position::from_sfen("4k4/9/9/9/9/9/9/4p4/4K4 b - 1").unwrap();
        assert!(pos.in_check(Color::Black));
        let pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/3pK4 b - 1").unwrap();
        assert!(!pos.in_check(Color::Black));
    }
}
