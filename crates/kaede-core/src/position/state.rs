//! 局面状態（StateInfo）
//!
//! 1手ごとに1つ確保し、NNUE 差分更新用の Accumulator と DirtyPiece を保持する。
//! `Position` 内で手数をインデックスとするアリーナとして再利用される。

use crate::moves::Move;
use crate::nnue::Accumulator;
use crate::types::{Color, Piece, PieceType, Square};

/// 駒の置き場所（特徴量の単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceSlot {
    /// 盤上の駒
    Board { piece: Piece, sq: Square },
    /// 持ち駒の `count` 枚目
    Hand {
        color: Color,
        piece_type: PieceType,
        count: u8,
    },
}

/// 1つの駒の変化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangedPiece {
    pub old: PieceSlot,
    pub new: PieceSlot,
}

/// 1手で変化した駒
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyPiece {
    /// 動かした駒（駒打ちなら持ち駒から盤上へ）
    pub moved: ChangedPiece,
    /// 取った駒（盤上から取った側の持ち駒へ）
    pub captured: Option<ChangedPiece>,
    pub king_moved: bool,
}

/// 局面状態
#[derive(Clone)]
pub struct StateInfo {
    /// この局面に至った指し手（初期局面は `Move::NONE`）
    pub last_move: Move,
    /// 指す前のハッシュ値
    pub previous_key: u64,
    /// 初期局面では None
    pub dirty_piece: Option<DirtyPiece>,
    pub accumulator: Accumulator,
}

impl StateInfo {
    pub(crate) fn root() -> Self {
        StateInfo {
            last_move: Move::NONE,
            previous_key: 0,
            dirty_piece: None,
            accumulator: Accumulator::new(),
        }
    }

    /// アリーナ上の古いスロットを新しい手番用に初期化する
    pub(crate) fn reset(&mut self, last_move: Move, previous_key: u64, dirty_piece: DirtyPiece) {
        self.last_move = last_move;
        self.previous_key = previous_key;
        self.dirty_piece = Some(dirty_piece);
        self.accumulator.invalidate();
    }
}
