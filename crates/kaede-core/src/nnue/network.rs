//! HalfKP 256x2-32-32 ネットワーク
//!
//! 特徴量変換層（i16）と3つの全結合層（i8 重み・i32 バイアス）から成る。
//! 数値の扱いは以下の通りで、経路（SIMD かスカラーか、差分か全計算か）によらず一致する。
//!
//! 1. Accumulator を [0, 127] に丸め、手番側・相手側の順に並べて 512 次元にする
//! 2. 512 → 32 の全結合、`>> 6` して [0, 127] に丸める
//! 3. 32 → 32 の全結合、同じく丸める
//! 4. 32 → 1 の全結合（丸めなし）
//! 5. `FV_SCALE` で割った値（0方向への切り捨て）を評価値とする

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::constants::{
    ARCHITECTURE_STRING, FV_SCALE, HALF_DIMENSIONS, HIDDEN1_DIMENSIONS, HIDDEN2_DIMENSIONS,
    INPUT_DIMENSIONS, OUTPUT_DIMENSIONS, TRANSFORMED_DIMENSIONS,
};
use super::simd::{affine, clip_accumulator, clipped_relu};
use crate::evaluate::Evaluator;
use crate::position::Position;
use crate::types::Value;

/// 特徴量変換層
#[derive(Clone, PartialEq, Eq)]
pub struct FeatureTransformer {
    pub(crate) bias: Box<[i16]>,
    /// `[特徴量][HALF_DIMENSIONS]`
    pub(crate) weights: Box<[i16]>,
}

impl FeatureTransformer {
    pub(crate) fn zeroed() -> Self {
        FeatureTransformer {
            bias: vec![0; HALF_DIMENSIONS].into_boxed_slice(),
            weights: vec![0; HALF_DIMENSIONS * INPUT_DIMENSIONS].into_boxed_slice(),
        }
    }

    /// 特徴量 `index` の重み行
    #[inline]
    pub(crate) fn row(&self, index: usize) -> &[i16] {
        let offset = HALF_DIMENSIONS * index;
        &self.weights[offset..offset + HALF_DIMENSIONS]
    }
}

/// 全結合層
#[derive(Clone, PartialEq, Eq)]
pub struct AffineLayer {
    pub(crate) bias: Box<[i32]>,
    /// 出力ごとに入力次元ぶん並ぶ
    pub(crate) weights: Box<[i8]>,
}

impl AffineLayer {
    pub(crate) fn zeroed(input_dim: usize, output_dim: usize) -> Self {
        AffineLayer {
            bias: vec![0; output_dim].into_boxed_slice(),
            weights: vec![0; input_dim * output_dim].into_boxed_slice(),
        }
    }

    #[inline]
    fn propagate(&self, input: &[u8], output: &mut [i32]) {
        affine(input, &self.weights, &self.bias, output);
    }
}

/// 評価関数のパラメータ一式
#[derive(Clone, PartialEq, Eq)]
pub struct Network {
    pub(crate) architecture: String,
    pub(crate) transformer: FeatureTransformer,
    pub(crate) hidden1: AffineLayer,
    pub(crate) hidden2: AffineLayer,
    pub(crate) output: AffineLayer,
}

impl Network {
    /// 全パラメータが 0 のネットワーク
    pub fn zeroed() -> Self {
        Network {
            architecture: ARCHITECTURE_STRING.to_string(),
            transformer: FeatureTransformer::zeroed(),
            hidden1: AffineLayer::zeroed(TRANSFORMED_DIMENSIONS, HIDDEN1_DIMENSIONS),
            hidden2: AffineLayer::zeroed(HIDDEN1_DIMENSIONS, HIDDEN2_DIMENSIONS),
            output: AffineLayer::zeroed(HIDDEN2_DIMENSIONS, OUTPUT_DIMENSIONS),
        }
    }

    /// シードから決定的に作る小さな重みのネットワーク（テスト・ベンチ用）
    pub fn random(seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut network = Network::zeroed();
        let mut small = |range: u32| (rng.next_u32() % (2 * range + 1)) as i32 - range as i32;

        for b in network.transformer.bias.iter_mut() {
            *b = small(64) as i16;
        }
        for w in network.transformer.weights.iter_mut() {
            *w = small(30) as i16;
        }
        for layer in [&mut network.hidden1, &mut network.hidden2, &mut network.output] {
            for b in layer.bias.iter_mut() {
                *b = small(2000);
            }
            for w in layer.weights.iter_mut() {
                *w = small(8) as i8;
            }
        }
        network
    }

    /// ファイルに記録されていたアーキテクチャ文字列
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn feature_transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    /// 手番側から見た評価値
    pub fn evaluate(&self, pos: &mut Position) -> Value {
        self.transformer.update_accumulator(pos);

        let us = pos.side_to_move();
        let acc = &pos.state().accumulator;
        let mut transformed = [0u8; TRANSFORMED_DIMENSIONS];
        let (own, other) = transformed.split_at_mut(HALF_DIMENSIONS);
        clip_accumulator(&acc.accumulation[us.index()], own);
        clip_accumulator(&acc.accumulation[us.opponent().index()], other);

        Value::new(self.propagate(&transformed) / FV_SCALE)
    }

    /// 変換済みの入力から出力層の生の値を計算する
    fn propagate(&self, transformed: &[u8; TRANSFORMED_DIMENSIONS]) -> i32 {
        let mut hidden1 = [0i32; HIDDEN1_DIMENSIONS];
        let mut hidden1_out = [0u8; HIDDEN1_DIMENSIONS];
        self.hidden1.propagate(transformed, &mut hidden1);
        clipped_relu(&hidden1, &mut hidden1_out);

        let mut hidden2 = [0i32; HIDDEN2_DIMENSIONS];
        let mut hidden2_out = [0u8; HIDDEN2_DIMENSIONS];
        self.hidden2.propagate(&hidden1_out, &mut hidden2);
        clipped_relu(&hidden2, &mut hidden2_out);

        let mut output = [0i32; OUTPUT_DIMENSIONS];
        self.output.propagate(&hidden2_out, &mut output);
        output[0]
    }
}

impl Evaluator for Network {
    #[inline]
    fn evaluate(&self, pos: &mut Position) -> Value {
        Network::evaluate(self, pos)
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("architecture", &self.architecture)
            .finish_non_exhaustive()
    }
}
