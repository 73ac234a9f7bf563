//! 指し手生成
//!
//! 探索は `MoveGenerator` 越しに指し手を受け取る。`PseudoLegalGenerator` は自玉への王手放置を
//! 除外しない疑似合法手を返すので、探索側で do_move 後に `in_check` で弾く。

mod generator;

pub use generator::{PseudoLegalGenerator, generate_captures};

use smallvec::SmallVec;

use crate::moves::Move;
use crate::position::Position;

/// 指し手リスト
pub type MoveList = SmallVec<[Move; 128]>;

/// 指し手生成器
pub trait MoveGenerator: Send + Sync {
    /// `list` の末尾に現局面の手番の指し手を追加する
    fn generate(&self, pos: &Position, list: &mut MoveList);
}
