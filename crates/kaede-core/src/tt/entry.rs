//! 置換表エントリ

use crate::moves::Move16;
use crate::types::{Bound, Value};

/// 置換表エントリ
///
/// テーブル上では 16 バイト（ハッシュ値 8 バイト + データ 8 バイト）で保持する。
///
/// ```text
/// data bit  0..16 指し手（Move16）
///          16..24 深さ（i8）
///          24..26 Bound
///          32..48 世代
///          48..64 評価値（i16）
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TTEntry {
    pub hash: u64,
    pub mv: Move16,
    pub depth: i8,
    pub bound: Bound,
    pub generation: u16,
    pub value: i16,
}

impl TTEntry {
    #[inline]
    pub fn value(&self) -> Value {
        Value::new(self.value as i32)
    }

    #[inline]
    pub(crate) fn pack(&self) -> u64 {
        (self.mv.raw() as u64)
            | ((self.depth as u8 as u64) << 16)
            | ((self.bound as u64) << 24)
            | ((self.generation as u64) << 32)
            | ((self.value as u16 as u64) << 48)
    }

    #[inline]
    pub(crate) fn unpack(hash: u64, data: u64) -> TTEntry {
        TTEntry {
            hash,
            mv: Move16::from_raw(data as u16),
            depth: (data >> 16) as u8 as i8,
            bound: Bound::from_u8((data >> 24) as u8),
            generation: (data >> 32) as u16,
            value: (data >> 48) as u16 as i16,
        }
    }
}
