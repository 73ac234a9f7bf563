//! 探索スレッド間で共有する停止フラグ

use std::sync::atomic::{AtomicBool, Ordering};

/// 「まだ考えている」フラグ
///
/// false になると各スレッドは新しいノードを展開せずに戻る。
#[derive(Debug, Default)]
pub struct SearchSignals {
    thinking: AtomicBool,
}

impl SearchSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.thinking.store(true, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.thinking.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_thinking(&self) -> bool {
        self.thinking.load(Ordering::Relaxed)
    }
}
