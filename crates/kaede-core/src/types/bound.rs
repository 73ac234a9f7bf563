/// 置換表に保存する評価値の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Bound {
    #[default]
    None = 0,
    /// 全ての手が alpha 以下だった（真の値はこれ以下）
    Upper = 1,
    /// beta cut が起きた（真の値はこれ以上）
    Lower = 2,
    Exact = 3,
}

impl Bound {
    #[inline]
    pub const fn from_u8(v: u8) -> Bound {
        match v & 3 {
            1 => Bound::Upper,
            2 => Bound::Lower,
            3 => Bound::Exact,
            _ => Bound::None,
        }
    }
}
