//! NNUE 評価関数（HalfKP 256x2-32-32）
//!
//! - `features`: 特徴量インデックス
//! - `accumulator`: 特徴量変換層の出力と差分更新
//! - `network`: ネットワーク本体と推論
//! - `weights`: nn.bin の読み書き
//! - `simd`: 演算カーネル（AVX2 / スカラー）

mod accumulator;
pub mod constants;
pub mod features;
mod network;
mod simd;
mod weights;

pub use accumulator::Accumulator;
pub use network::{AffineLayer, FeatureTransformer, Network};
pub use weights::WeightsError;
