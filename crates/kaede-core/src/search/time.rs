//! 思考時間

use std::time::{Duration, Instant};

/// 探索を続けてよいかを判断する
///
/// 問い合わせは重い可能性があるので、探索側はスレッド0が一定ノードごとにだけ呼ぶ。
pub trait TimeBudget: Send + Sync {
    /// まだ考えてよいか
    fn is_thinking(&self) -> bool;

    /// 探索開始からの経過時間（ミリ秒）
    fn elapsed_ms(&self) -> u64;
}

/// 固定の思考時間で打ち切る
#[derive(Debug, Clone, Copy)]
pub struct TimeManager {
    start: Instant,
    /// None なら打ち切らない
    limit: Option<Duration>,
}

impl TimeManager {
    /// 今から `think_time` だけ考える
    pub fn new(think_time: Duration) -> Self {
        TimeManager {
            start: Instant::now(),
            limit: Some(think_time),
        }
    }

    /// 時間で打ち切らない（深さ制限か外部からの停止まで考える）
    pub fn infinite() -> Self {
        TimeManager {
            start: Instant::now(),
            limit: None,
        }
    }

    pub fn start_time(&self) -> Instant {
        self.start
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

impl TimeBudget for TimeManager {
    fn is_thinking(&self) -> bool {
        match self.limit {
            Some(limit) => self.start.elapsed() < limit,
            None => true,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_expires_immediately() {
        let tm = TimeManager::new(Duration::ZERO);
        assert!(!tm.is_thinking());
    }

    #[test]
    fn test_infinite_never_expires() {
        let tm = TimeManager::infinite();
        assert!(tm.is_thinking());
        assert_eq!(tm.limit(), None);
    }

    #[test]
    fn test_long_budget_is_thinking() {
        let tm = TimeManager::new(Duration::from_secs(3600));
        assert!(tm.is_thinking());
        assert!(tm.elapsed_ms() < 3_600_000);
    }
}
