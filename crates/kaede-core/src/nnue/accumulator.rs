//! 特徴量変換層の出力（Accumulator）とその差分更新
//!
//! Accumulator は手数ごとの `StateInfo` に1つずつ置かれる。評価時に現在の手数の
//! Accumulator が未計算なら、玉が動いていない手だけを遡って計算済みの祖先を探し、
//! そこから DirtyPiece を順に適用する。見つからなければ全計算する。
//!
//! Accumulator はどのネットワークで計算したかを持たないので、1つの局面は1つのネットワークで
//! だけ評価すること。

use super::constants::HALF_DIMENSIONS;
use super::features::{append_active_indices, feature_index};
use super::network::FeatureTransformer;
use super::simd::{add_row, sub_row};
use crate::position::{DirtyPiece, Position};
use crate::types::{Color, Square};

/// 両視点の特徴量変換層の出力
#[derive(Clone)]
#[repr(C, align(32))]
pub struct Accumulator {
    /// `[視点の手番][次元]`
    pub accumulation: [[i16; HALF_DIMENSIONS]; 2],
    /// 両視点とも計算済みなら true
    pub computed: bool,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator {
            accumulation: [[0; HALF_DIMENSIONS]; 2],
            computed: false,
        }
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.computed = false;
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("computed", &self.computed)
            .finish_non_exhaustive()
    }
}

impl FeatureTransformer {
    /// 現在の手数の Accumulator を計算済みにする
    pub fn update_accumulator(&self, pos: &mut Position) {
        if pos.state().accumulator.computed {
            return;
        }
        match self.find_computed_ancestor(pos) {
            Some(source) => {
                let kings = [pos.king_square(Color::Black), pos.king_square(Color::White)];
                for ply in source + 1..=pos.ply() {
                    let (prev, cur) = pos.state_pair_mut(ply);
                    cur.accumulator.accumulation = prev.accumulator.accumulation;
                    if let Some(dirty) = cur.dirty_piece {
                        self.apply_dirty_piece(&mut cur.accumulator, &dirty, kings);
                    }
                    cur.accumulator.computed = true;
                }
            }
            None => self.refresh_accumulator(pos),
        }
    }

    /// 差分更新の起点にできる計算済みの手数
    ///
    /// 途中に玉の移動や初期局面があれば None。
    fn find_computed_ancestor(&self, pos: &Position) -> Option<usize> {
        let mut ply = pos.ply();
        while ply > 0 {
            match pos.state_at(ply).dirty_piece {
                Some(dirty) if !dirty.king_moved => {}
                _ => return None,
            }
            if pos.state_at(ply - 1).accumulator.computed {
                return Some(ply - 1);
            }
            ply -= 1;
        }
        None
    }

    /// 1手分の変化を両視点に適用する
    fn apply_dirty_piece(&self, acc: &mut Accumulator, dirty: &DirtyPiece, kings: [Square; 2]) {
        for change in dirty.captured.iter().chain(std::iter::once(&dirty.moved)) {
            for perspective in Color::ALL {
                let king = kings[perspective.index()];
                let target = &mut acc.accumulation[perspective.index()];
                if let Some(index) = feature_index(perspective, king, change.new) {
                    add_row(target, self.row(index));
                }
                if let Some(index) = feature_index(perspective, king, change.old) {
                    sub_row(target, self.row(index));
                }
            }
        }
    }

    /// 盤面から両視点を全計算する
    pub fn refresh_accumulator(&self, pos: &mut Position) {
        let mut indices = Vec::with_capacity(64);
        for perspective in Color::ALL {
            indices.clear();
            append_active_indices(pos, perspective, &mut indices);
            let target = &mut pos.state_mut().accumulator.accumulation[perspective.index()];
            target.copy_from_slice(&self.bias);
            for &index in &indices {
                add_row(target, self.row(index));
            }
        }
        pos.state_mut().accumulator.computed = true;
    }

    /// 全計算した結果を返す（現在の Accumulator は変更しない）
    pub fn compute_fresh(&self, pos: &Position) -> Accumulator {
        let mut acc = Accumulator::new();
        let mut indices = Vec::with_capacity(64);
        for perspective in Color::ALL {
            indices.clear();
            append_active_indices(pos, perspective, &mut indices);
            let target = &mut acc.accumulation[perspective.index()];
            target.copy_from_slice(&self.bias);
            for &index in &indices {
                add_row(target, self.row(index));
            }
        }
        acc.computed = true;
        acc
    }
}
