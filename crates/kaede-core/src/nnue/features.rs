//! HalfKP 特徴量
//!
//! 特徴量インデックスは `玉の升 * FE_END + BonaPiece`。BonaPiece は駒の種類・所属・升
//! （持ち駒なら枚数）を一つの整数にしたもの。視点ごとに二通り計算する。
//!
//! - 先手視点: 先手玉の升、盤面そのまま、先手の駒が味方
//! - 後手視点: 後手玉の升を180度回転、駒の升も回転、後手の駒が味方

use super::constants::{FE_END, FE_HAND_END};
use crate::position::{PieceSlot, Position};
use crate::types::{Color, PieceType, Square};

/// 持ち駒の BonaPiece の開始位置 [hand_index][味方=0/敵=1]
///
/// 1枚目が開始位置、n枚目は `開始位置 + n - 1`。
const HAND_BASE: [[usize; 2]; 7] = [
    [1, 20],  // 歩
    [39, 44], // 香
    [49, 54], // 桂
    [59, 64], // 銀
    [69, 74], // 金
    [79, 82], // 角
    [85, 88], // 飛
];

/// 盤上の駒の BonaPiece の開始位置（玉は特徴量に含めない）
const fn board_base(pt: PieceType, friend: bool) -> Option<usize> {
    let kind = match pt {
        PieceType::Pawn => 0,
        PieceType::Lance => 1,
        PieceType::Knight => 2,
        PieceType::Silver => 3,
        // 成った小駒は金と同じ扱い
        PieceType::Gold
        | PieceType::ProPawn
        | PieceType::ProLance
        | PieceType::ProKnight
        | PieceType::ProSilver => 4,
        PieceType::Bishop => 5,
        PieceType::Horse => 6,
        PieceType::Rook => 7,
        PieceType::Dragon => 8,
        PieceType::King => return None,
    };
    let side = if friend { 0 } else { 1 };
    Some(FE_HAND_END + (kind * 2 + side) * Square::NUM)
}

/// `perspective` 視点の特徴量インデックス
///
/// `king` はその視点側の玉の（回転前の）升。玉の駒は None。
#[inline]
pub fn feature_index(perspective: Color, king: Square, slot: PieceSlot) -> Option<usize> {
    let king = match perspective {
        Color::Black => king,
        Color::White => king.mirror(),
    };
    let bona_piece = match slot {
        PieceSlot::Board { piece, sq } => {
            let friend = piece.color() == perspective;
            let sq = match perspective {
                Color::Black => sq,
                Color::White => sq.mirror(),
            };
            board_base(piece.piece_type()?, friend)? + sq.index()
        }
        PieceSlot::Hand { color, piece_type, count } => {
            debug_assert!(count >= 1);
            let friend = color == perspective;
            HAND_BASE[piece_type.hand_index()?][if friend { 0 } else { 1 }] + count as usize - 1
        }
    };
    debug_assert!(bona_piece < FE_END);
    Some(king.index() * FE_END + bona_piece)
}

/// 局面の全特徴量を `perspective` 視点で列挙する
pub fn append_active_indices(pos: &Position, perspective: Color, out: &mut Vec<usize>) {
    let king = pos.king_square(perspective);
    for sq in Square::all() {
        let piece = pos.piece_on(sq);
        if piece.is_empty() {
            continue;
        }
        if let Some(index) = feature_index(perspective, king, PieceSlot::Board { piece, sq }) {
            out.push(index);
        }
    }
    for color in Color::ALL {
        for (piece_type, held) in pos.hand(color).iter() {
            for count in 1..=held {
                let slot = PieceSlot::Hand {
                    color,
                    piece_type,
                    count,
                };
                if let Some(index) = feature_index(perspective, king, slot) {
                    out.push(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnue::constants::INPUT_DIMENSIONS;
    use crate::types::Piece;

    #[test]
    fn test_board_feature_layout() {
        let king = Square::new(4, 8);
        let pawn = Piece::new(Color::Black, PieceType::Pawn);
        let slot = PieceSlot::Board {
            piece: pawn,
            sq: Square::new(6, 6),
        };
        assert_eq!(
            feature_index(Color::Black, king, slot),
            Some(44 * FE_END + 90 + 60)
        );

        // 後手視点では敵の歩、升と玉は回転
        let white_king = Square::new(4, 0);
        assert_eq!(
            feature_index(Color::White, white_king, slot),
            Some(44 * FE_END + 90 + 81 + 20)
        );
    }

    #[test]
    fn test_promoted_minor_is_gold() {
        let king = Square::SQ_11;
        let sq = Square::new(3, 3);
        let gold = feature_index(
            Color::Black,
            king,
            PieceSlot::Board {
                piece: Piece::new(Color::Black, PieceType::Gold),
                sq,
            },
        );
        for pt in [
            PieceType::ProPawn,
            PieceType::ProLance,
            PieceType::ProKnight,
            PieceType::ProSilver,
        ] {
            let slot = PieceSlot::Board {
                piece: Piece::new(Color::Black, pt),
                sq,
            };
            assert_eq!(feature_index(Color::Black, king, slot), gold);
        }
    }

    #[test]
    fn test_king_has_no_feature() {
        let slot = PieceSlot::Board {
            piece: Piece::new(Color::White, PieceType::King),
            sq: Square::SQ_11,
        };
        assert_eq!(feature_index(Color::Black, Square::SQ_99, slot), None);
    }

    #[test]
    fn test_hand_features() {
        let king = Square::SQ_11;
        let slot = |color, count| PieceSlot::Hand {
            color,
            piece_type: PieceType::Pawn,
            count,
        };
        assert_eq!(
            feature_index(Color::Black, king, slot(Color::Black, 1)),
            Some(1)
        );
        assert_eq!(
            feature_index(Color::Black, king, slot(Color::Black, 18)),
            Some(18)
        );
        assert_eq!(
            feature_index(Color::Black, king, slot(Color::White, 1)),
            Some(20)
        );
        let rook = PieceSlot::Hand {
            color: Color::White,
            piece_type: PieceType::Rook,
            count: 2,
        };
        assert_eq!(feature_index(Color::Black, king, rook), Some(89));
    }

    #[test]
    fn test_startpos_feature_count() {
        let pos = Position::default();
        for perspective in Color::ALL {
            let mut indices = Vec::new();
            append_active_indices(&pos, perspective, &mut indices);
            assert_eq!(indices.len(), 38);
            assert!(indices.iter().all(|&i| i < INPUT_DIMENSIONS));
        }
    }

    #[test]
    fn test_perspectives_are_symmetric_at_startpos() {
        // 平手は180度回転で先後が入れ替わる形なので、両視点の特徴量集合は一致する
        let pos = Position::default();
        let mut black = Vec::new();
        let mut white = Vec::new();
        append_active_indices(&pos, Color::Black, &mut black);
        append_active_indices(&pos, Color::White, &mut white);
        black.sort_unstable();
        white.sort_unstable();
        assert_eq!(black, white);
    }
}
