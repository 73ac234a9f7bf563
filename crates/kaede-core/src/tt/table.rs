//! TranspositionTable本体

use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};

use super::entry::TTEntry;
use crate::moves::Move16;
use crate::types::{Bound, Value};

/// エントリ1つあたりのバイト数（AtomicU64 × 2）
const ENTRY_BYTES: usize = 16;

/// 置換表
pub struct TranspositionTable {
    /// [hash, data] の繰り返し
    slots: Box<[AtomicU64]>,
    /// エントリ数（2のべき乗）
    len: usize,
    generation: AtomicU16,
}

impl TranspositionTable {
    /// 新しい置換表を作成（サイズはMB単位）
    pub fn new(mb_size: usize) -> Self {
        let len = entry_count(mb_size);
        log::debug!("transposition table: {mb_size}MB, {len} entries");
        TranspositionTable {
            slots: allocate(len),
            len,
            generation: AtomicU16::new(0),
        }
    }

    /// サイズを変更（内容は消える）
    pub fn resize(&mut self, mb_size: usize) {
        let len = entry_count(mb_size);
        if len != self.len {
            self.slots = allocate(len);
            self.len = len;
        } else {
            self.clear();
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// 全エントリを消す
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// エントリ数
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 探索開始ごとに世代を進める（16bitで一周する）
    pub fn new_search(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn generation(&self) -> u16 {
        self.generation.load(Ordering::Relaxed)
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & (self.len - 1)
    }

    /// エントリを引く
    ///
    /// 2つ目の値はスロットのハッシュ値が一致したかどうか。一致しなかったときのエントリの中身は
    /// 別の局面のものなので使ってはいけない。
    pub fn probe(&self, hash: u64) -> (TTEntry, bool) {
        let base = self.index(hash) * 2;
        let stored_hash = self.slots[base].load(Ordering::Relaxed);
        let data = self.slots[base + 1].load(Ordering::Relaxed);
        let entry = TTEntry::unpack(stored_hash, data);
        (entry, stored_hash == hash)
    }

    /// 探索結果を保存する
    ///
    /// Exact、スロットが別の局面、または保存済みの深さより深いときだけ上書きする。
    pub fn save(&self, hash: u64, value: Value, depth: i32, mv: Move16, bound: Bound) {
        let base = self.index(hash) * 2;
        let stored_hash = self.slots[base].load(Ordering::Relaxed);
        let stored = TTEntry::unpack(stored_hash, self.slots[base + 1].load(Ordering::Relaxed));
        let depth = depth.clamp(i8::MIN as i32, i8::MAX as i32) as i8;

        if bound != Bound::Exact && stored_hash == hash && stored.depth >= depth {
            return;
        }

        let entry = TTEntry {
            hash,
            mv,
            depth,
            bound,
            generation: self.generation(),
            value: value.raw().clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        };
        self.slots[base].store(hash, Ordering::Relaxed);
        self.slots[base + 1].store(entry.pack(), Ordering::Relaxed);
    }

    /// 使用率（先頭1000エントリのうち埋まっている割合、パーミル）
    pub fn hashfull(&self) -> u32 {
        let sample = self.len.min(1000);
        let filled = (0..sample)
            .filter(|&i| {
                self.slots[i * 2].load(Ordering::Relaxed) != 0
                    || self.slots[i * 2 + 1].load(Ordering::Relaxed) != 0
            })
            .count();
        (filled * 1000 / sample) as u32
    }
}

/// MB 単位のサイズから2のべき乗に切り下げたエントリ数（最低1）
fn entry_count(mb_size: usize) -> usize {
    let entries = (mb_size * 1024 * 1024 / ENTRY_BYTES).max(1);
    1 << (usize::BITS - 1 - entries.leading_zeros())
}

fn allocate(len: usize) -> Box<[AtomicU64]> {
    (0..len * 2).map(|_| AtomicU64::new(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_is_power_of_two() {
        assert_eq!(TranspositionTable::new(1).len(), 65536);
        assert_eq!(TranspositionTable::new(3).len(), 131072);
        assert_eq!(TranspositionTable::new(0).len(), 1);
    }

    #[test]
    fn test_probe_miss_and_hit() {
        let tt = TranspositionTable::new(1);
        let hash = 0x1234_5678_9abc_def0;
        let (_, found) = tt.probe(hash);
        assert!(!found);

        tt.save(
            hash,
            Value::new(150),
            6,
            Move16::from_raw(0x1234),
            Bound::Lower,
        );
        let (entry, found) = tt.probe(hash);
        assert!(found);
        assert_eq!(entry.value(), Value::new(150));
        assert_eq!(entry.depth, 6);
        assert_eq!(entry.bound, Bound::Lower);
        assert_eq!(entry.mv, Move16::from_raw(0x1234));

        // 同じインデックスの別局面は一致しない
        let (_, found) = tt.probe(hash ^ (1 << 40));
        assert!(!found);
    }

    #[test]
    fn test_exact_always_overwrites() {
        let tt = TranspositionTable::new(1);
        let hash = 42;
        tt.save(hash, Value::new(10), 10, Move16::NONE, Bound::Lower);
        tt.save(hash, Value::new(20), 1, Move16::NONE, Bound::Exact);
        let (entry, _) = tt.probe(hash);
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.value(), Value::new(20));
    }

    #[test]
    fn test_shallow_non_exact_keeps_deeper_entry() {
        let tt = TranspositionTable::new(1);
        let hash = 42;
        tt.save(hash, Value::new(10), 8, Move16::NONE, Bound::Upper);
        tt.save(hash, Value::new(20), 3, Move16::NONE, Bound::Lower);
        tt.save(hash, Value::new(30), 8, Move16::NONE, Bound::Upper);
        let (entry, _) = tt.probe(hash);
        assert_eq!(entry.depth, 8);
        assert_eq!(entry.value(), Value::new(10));

        tt.save(hash, Value::new(40), 9, Move16::NONE, Bound::Upper);
        assert_eq!(tt.probe(hash).0.value(), Value::new(40));
    }

    #[test]
    fn test_foreign_hash_is_replaced() {
        let tt = TranspositionTable::new(1);
        let a = 7;
        let b = 7 + tt.len() as u64;
        tt.save(a, Value::new(1), 20, Move16::NONE, Bound::Lower);
        tt.save(b, Value::new(2), 1, Move16::NONE, Bound::Upper);
        assert!(!tt.probe(a).1);
        assert!(tt.probe(b).1);
    }

    #[test]
    fn test_generation_wraps() {
        let tt = TranspositionTable::new(0);
        for _ in 0..0x10000 {
            tt.new_search();
        }
        assert_eq!(tt.generation(), 0);
        tt.new_search();
        tt.save(1, Value::ZERO, 1, Move16::NONE, Bound::Exact);
        assert_eq!(tt.probe(1).0.generation, 1);
    }

    #[test]
    fn test_clear_and_hashfull() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull(), 0);
        for i in 0..500u64 {
            tt.save(i + 1, Value::ZERO, 1, Move16::NONE, Bound::Exact);
        }
        assert_eq!(tt.hashfull(), 500);
        tt.clear();
        assert_eq!(tt.hashfull(), 0);
    }

    #[test]
    fn test_threads_share_table() {
        let tt = std::sync::Arc::new(TranspositionTable::new(1));
        std::thread::scope(|s| {
            for t in 0..4u64 {
                let tt = &tt;
                s.spawn(move || {
                    for i in 0..10_000u64 {
                        let hash = (i << 8) | t;
                        tt.save(hash, Value::new(t as i32), 1, Move16::NONE, Bound::Exact);
                    }
                });
            }
        });
        // 下位8bitがスレッドごとに異なるので、各スレッドの最後の書き込みが残る
        for t in 0..4u64 {
            let (entry, found) = tt.probe((9_999 << 8) | t);
            assert!(found);
            assert_eq!(entry.value(), Value::new(t as i32));
        }
    }
}
