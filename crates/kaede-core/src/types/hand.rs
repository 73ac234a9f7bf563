//! 持ち駒（Hand）

use super::PieceType;

/// 片方の手番の持ち駒枚数
///
/// `PieceType::HAND_KINDS` の順に枚数を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hand([u8; 7]);

impl Hand {
    pub const EMPTY: Hand = Hand([0; 7]);

    /// 枚数（玉は常に0）
    #[inline]
    pub fn count(&self, pt: PieceType) -> u8 {
        pt.hand_index().map_or(0, |i| self.0[i])
    }

    /// 1枚増やし、増やした後の枚数を返す
    #[inline]
    pub fn add(&mut self, pt: PieceType) -> u8 {
        match pt.hand_index() {
            Some(i) => {
                self.0[i] += 1;
                self.0[i]
            }
            None => 0,
        }
    }

    /// 1枚減らし、減らす前の枚数を返す
    #[inline]
    pub fn remove(&mut self, pt: PieceType) -> u8 {
        match pt.hand_index() {
            Some(i) => {
                debug_assert!(self.0[i] > 0, "no {pt:?} in hand");
                let before = self.0[i];
                self.0[i] -= 1;
                before
            }
            None => 0,
        }
    }

    #[inline]
    pub fn set(&mut self, pt: PieceType, count: u8) {
        if let Some(i) = pt.hand_index() {
            self.0[i] = count;
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// 持っている駒種と枚数
    pub fn iter(&self) -> impl Iterator<Item = (PieceType, u8)> + '_ {
        PieceType::HAND_KINDS
            .iter()
            .zip(self.0.iter())
            .filter(|(_, c)| **c > 0)
            .map(|(pt, c)| (*pt, *c))
    }
}
