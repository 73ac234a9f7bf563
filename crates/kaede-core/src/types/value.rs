//! 評価値（Value）
//!
//! `Value::MATE` 付近を詰みスコアとして予約している。
//! 通常の評価値は [-MATE_IN_MAX_PLY, MATE_IN_MAX_PLY] の範囲に収まる。

use super::MAX_PLY;

/// 評価値
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Value(i32);

impl Value {
    pub const ZERO: Value = Value(0);
    /// 探索打ち切り時に返す中立値
    pub const DRAW: Value = Value(-1);
    /// 詰み（勝ち側の最大スコア）
    pub const MATE: Value = Value(32000);
    /// 無限大
    pub const INFINITE: Value = Value(32001);
    /// 無効値
    pub const NONE: Value = Value(32002);

    /// 最大探索深度内での詰みスコア
    pub const MATE_IN_MAX_PLY: Value = Value(Self::MATE.0 - MAX_PLY);
    /// 最大探索深度内での詰まされスコア
    pub const MATED_IN_MAX_PLY: Value = Value(-Self::MATE_IN_MAX_PLY.0);

    #[inline]
    pub const fn new(v: i32) -> Value {
        Value(v)
    }

    /// ply手で詰ますスコア
    #[inline]
    pub const fn mate_in(ply: i32) -> Value {
        Value(Self::MATE.0 - ply)
    }

    /// ply手で詰まされるスコア
    #[inline]
    pub const fn mated_in(ply: i32) -> Value {
        Value(-Self::MATE.0 + ply)
    }

    #[inline]
    pub const fn is_win(self) -> bool {
        self.0 > Self::MATE_IN_MAX_PLY.0
    }

    #[inline]
    pub const fn is_loss(self) -> bool {
        self.0 < Self::MATED_IN_MAX_PLY.0
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// 探索結果の詰みまでの手数（詰みスコアでなければ None、詰まされる側なら負）
    ///
    /// 探索は合法手のない局面を `mated_in(1)` とし、1段戻るごとに1ずつ0へ寄せるので、
    /// 手数は `MATE - 1 - |v|` になる。
    #[inline]
    pub const fn mate_ply(self) -> Option<i32> {
        if self.is_win() {
            Some(Self::MATE.0 - 1 - self.0)
        } else if self.is_loss() {
            Some(-(Self::MATE.0 - 1 + self.0))
        } else {
            None
        }
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    #[inline]
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl std::ops::Add<i32> for Value {
    type Output = Value;

    #[inline]
    fn add(self, rhs: i32) -> Value {
        Value(self.0 + rhs)
    }
}

impl std::ops::Sub<i32> for Value {
    type Output = Value;

    #[inline]
    fn sub(self, rhs: i32) -> Value {
        Value(self.0 - rhs)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value(v)
    }
}

impl From<Value> for i32 {
    fn from(v: Value) -> i32 {
        v.0
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_constants() {
        assert_eq!(Value::MATE_IN_MAX_PLY.raw(), 31872);
        assert_eq!(Value::MATED_IN_MAX_PLY.raw(), -31872);
        assert_eq!(Value::mated_in(1).raw(), -31999);
        assert!(Value::INFINITE > Value::MATE);
    }

    #[test]
    fn test_mate_ply() {
        // 1手詰め: 詰まされた局面 mated_in(1) の1つ上
        assert_eq!((-Value::mated_in(1) - 1).mate_ply(), Some(1));
        assert_eq!(Value::mate_in(4).mate_ply(), Some(3));
        assert_eq!(Value::mated_in(3).mate_ply(), Some(-2));
        assert_eq!(Value::new(500).mate_ply(), None);
        assert_eq!(Value::MATE_IN_MAX_PLY.mate_ply(), None);
    }

    #[test]
    fn test_value_ops() {
        let v = Value::new(100);
        assert_eq!(-v, Value::new(-100));
        assert_eq!(v + 5, Value::new(105));
        assert_eq!(v - 5, Value::new(95));
    }
}
