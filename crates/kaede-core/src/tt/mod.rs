//! 置換表モジュール
//!
//! 局面のハッシュ値から探索結果を引くキャッシュ。1インデックス1エントリで、
//! インデックスは `hash & (len - 1)`。
//!
//! ロックは取らない。複数スレッドが同じスロットを同時に読み書きすると、
//! 書きかけのエントリを読むことがある。ハッシュ値の一致判定で大半は弾けるので許容する。

mod entry;
mod table;

pub use entry::TTEntry;
pub use table::TranspositionTable;
