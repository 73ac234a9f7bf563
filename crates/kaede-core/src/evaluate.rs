//! 評価関数の抽象
//!
//! 探索は `Evaluator` 越しに静的評価を求める。本番は `nnue::Network`、
//! テストでは駒割りだけの `MaterialEvaluator` を使う。

use std::sync::Arc;

use crate::position::Position;
use crate::types::{Color, PieceType, Square, Value};

/// 局面の評価
///
/// 手番側から見た値を返す（正なら手番側が有利）。NNUE の Accumulator を更新するため
/// `&mut Position` を受け取るが、盤面そのものは変更しない。
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, pos: &mut Position) -> Value;
}

impl<T: Evaluator + ?Sized> Evaluator for Arc<T> {
    #[inline]
    fn evaluate(&self, pos: &mut Position) -> Value {
        (**self).evaluate(pos)
    }
}

impl<T: Evaluator + ?Sized> Evaluator for &T {
    #[inline]
    fn evaluate(&self, pos: &mut Position) -> Value {
        (**self).evaluate(pos)
    }
}

/// 駒割りのみの評価
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    /// 駒の価値（Apery の駒割り）
    pub const fn piece_value(pt: PieceType) -> i32 {
        match pt {
            PieceType::Pawn => 90,
            PieceType::Lance => 315,
            PieceType::Knight => 405,
            PieceType::Silver => 495,
            PieceType::Gold => 540,
            PieceType::Bishop => 855,
            PieceType::Rook => 990,
            PieceType::King => 0,
            PieceType::ProPawn => 540,
            PieceType::ProLance => 540,
            PieceType::ProKnight => 540,
            PieceType::ProSilver => 540,
            PieceType::Horse => 945,
            PieceType::Dragon => 1395,
        }
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, pos: &mut Position) -> Value {
        let us = pos.side_to_move();
        let sign = |color: Color| if color == us { 1 } else { -1 };
        let mut score = 0;
        for sq in Square::all() {
            let piece = pos.piece_on(sq);
            if let Some(pt) = piece.piece_type() {
                score += sign(piece.color()) * Self::piece_value(pt);
            }
        }
        for color in Color::ALL {
            for (pt, count) in pos.hand(color).iter() {
                score += sign(color) * Self::piece_value(pt) * count as i32;
            }
        }
        Value::new(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_startpos_is_balanced() {
        let mut pos = Position::default();
        assert_eq!(MaterialEvaluator.evaluate(&mut pos), Value::ZERO);
    }

    #[test]
    fn test_material_is_side_relative() {
        // 先手が飛車を1枚持っている
        let sfen = "4k4/9/9/9/9/9/9/9/4K4 b R 1";
        let mut pos = Position::from_sfen(sfen).unwrap();
        assert_eq!(MaterialEvaluator.evaluate(&mut pos).raw(), 990);
        let mut pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/4K4 w R 1").unwrap();
        assert_eq!(MaterialEvaluator.evaluate(&mut pos).raw(), -990);
    }

    #[test]
    fn test_arc_forwards() {
        let evaluator: Arc<dyn Evaluator> = Arc::new(MaterialEvaluator);
        let mut pos = Position::default();
        assert_eq!(evaluator.evaluate(&mut pos), Value::ZERO);
    }
}
