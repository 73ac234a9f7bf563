//! Aspiration window
//!
//! 深さ4以上では前回の評価値を中心に半幅17の窓で探索し、窓の外に出たら広げて再探索する。
//! 再探索のたびに半幅は `delta / 4 + 5` ずつ増えるので、いずれ窓の内側に収まる。

use crate::types::{Bound, Value};

/// 狭い窓を使い始める深さ
pub const ASPIRATION_MIN_DEPTH: i32 = 4;
/// 初期の半幅
pub const ASPIRATION_INITIAL_DELTA: i32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspirationWindow {
    pub alpha: Value,
    pub beta: Value,
    pub delta: i32,
}

impl AspirationWindow {
    /// 深さ `depth` の最初の窓
    pub fn new(depth: i32, previous: Value) -> Self {
        if depth >= ASPIRATION_MIN_DEPTH {
            let delta = ASPIRATION_INITIAL_DELTA;
            AspirationWindow {
                alpha: (previous - delta).max(-Value::INFINITE),
                beta: (previous + delta).min(Value::INFINITE),
                delta,
            }
        } else {
            Self::full()
        }
    }

    /// 制限なしの窓
    pub fn full() -> Self {
        AspirationWindow {
            alpha: -Value::INFINITE,
            beta: Value::INFINITE,
            delta: Value::INFINITE.raw(),
        }
    }

    /// 窓に対する `value` の位置
    pub fn bound_of(&self, value: Value) -> Bound {
        if value <= self.alpha {
            Bound::Upper
        } else if value >= self.beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }

    /// fail low: beta を alpha 側へ寄せ、alpha を広げる
    pub fn fail_low(&mut self, value: Value) {
        self.beta = Value::new((self.alpha.raw() + self.beta.raw()) / 2);
        self.alpha = (value - self.delta).max(-Value::INFINITE);
        self.widen();
    }

    /// fail high: beta を広げる
    pub fn fail_high(&mut self, value: Value) {
        self.beta = (value + self.delta).min(Value::INFINITE);
        self.widen();
    }

    fn widen(&mut self) {
        self.delta += self.delta / 4 + 5;
        debug_assert!(-Value::INFINITE <= self.alpha);
        debug_assert!(self.beta <= Value::INFINITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallow_depth_uses_full_window() {
        for depth in 1..ASPIRATION_MIN_DEPTH {
            let w = AspirationWindow::new(depth, Value::new(300));
            assert_eq!(w, AspirationWindow::full());
        }
    }

    #[test]
    fn test_initial_window_is_clamped() {
        let w = AspirationWindow::new(4, Value::new(100));
        assert_eq!((w.alpha.raw(), w.beta.raw(), w.delta), (83, 117, 17));
        let w = AspirationWindow::new(6, Value::INFINITE - 5);
        assert_eq!(w.beta, Value::INFINITE);
    }

    #[test]
    fn test_delta_growth_sequence() {
        let mut w = AspirationWindow::new(5, Value::ZERO);
        let mut expected = 17;
        for k in 0..8 {
            if k % 2 == 0 {
                w.fail_high(w.beta);
            } else {
                w.fail_low(w.alpha);
            }
            expected += expected / 4 + 5;
            assert_eq!(w.delta, expected);
        }
    }

    #[test]
    fn test_fail_low_moves_both_edges() {
        let mut w = AspirationWindow::new(4, Value::new(100));
        w.fail_low(Value::new(50));
        assert_eq!(w.beta.raw(), 100);
        assert_eq!(w.alpha.raw(), 33);
        assert_eq!(w.delta, 26);
        assert_eq!(w.bound_of(Value::new(40)), Bound::Exact);
    }

    #[test]
    fn test_fail_high_moves_beta() {
        let mut w = AspirationWindow::new(4, Value::new(100));
        w.fail_high(Value::new(200));
        assert_eq!(w.alpha.raw(), 83);
        assert_eq!(w.beta.raw(), 217);
        assert_eq!(w.bound_of(Value::new(217)), Bound::Lower);
        assert_eq!(w.bound_of(Value::new(83)), Bound::Upper);
    }
}
