//! HalfKP 256x2-32-32 の定数

/// 評価関数ファイルのバージョン
pub const VERSION: u32 = 0x7AF3_2F16;
/// ネットワーク全体のハッシュ値
pub const ARCHITECTURE_HASH: u32 = 0x3E5A_A6EE;
/// 特徴量変換層のハッシュ値
pub const FEATURE_TRANSFORMER_HASH: u32 = 0x5D69_D7B8;
/// 全結合層部分のハッシュ値
pub const NETWORK_HASH: u32 = 0x6333_7156;

/// 玉の位置を除いた特徴量（BonaPiece）の数
pub const FE_END: usize = 1548;
/// 持ち駒の特徴量の終端（盤上の駒はここから始まる）
pub const FE_HAND_END: usize = 90;
/// 入力特徴量の次元（81 × FE_END）
pub const INPUT_DIMENSIONS: usize = 81 * FE_END;

/// 片側の Accumulator の次元
pub const HALF_DIMENSIONS: usize = 256;
/// 変換後の入力次元（両視点）
pub const TRANSFORMED_DIMENSIONS: usize = HALF_DIMENSIONS * 2;
pub const HIDDEN1_DIMENSIONS: usize = 32;
pub const HIDDEN2_DIMENSIONS: usize = 32;
pub const OUTPUT_DIMENSIONS: usize = 1;

/// 隠れ層の出力を右シフトする量
pub const WEIGHT_SCALE_BITS: u32 = 6;
/// 出力を評価値に変換する除数
pub const FV_SCALE: i32 = 16;

/// 評価関数ファイルのバイト数
pub const FILE_SIZE: usize = 4 * 3
    + ARCHITECTURE_STRING.len()
    + 4
    + 2 * HALF_DIMENSIONS
    + 2 * HALF_DIMENSIONS * INPUT_DIMENSIONS
    + 4
    + 4 * HIDDEN1_DIMENSIONS
    + HIDDEN1_DIMENSIONS * TRANSFORMED_DIMENSIONS
    + 4 * HIDDEN2_DIMENSIONS
    + HIDDEN2_DIMENSIONS * HIDDEN1_DIMENSIONS
    + 4 * OUTPUT_DIMENSIONS
    + OUTPUT_DIMENSIONS * HIDDEN2_DIMENSIONS;

/// 書き出すときのアーキテクチャ文字列
pub const ARCHITECTURE_STRING: &str = "Features=HalfKP(Friend)[125388->256x2],Network=AffineTransform[1<-32](ClippedReLU[32](AffineTransform[32<-32](ClippedReLU[32](AffineTransform[32<-512](InputSlice[512(0:512)])))))";

const _: () = assert!(INPUT_DIMENSIONS == 125_388);
const _: () = assert!(ARCHITECTURE_HASH == FEATURE_TRANSFORMER_HASH ^ NETWORK_HASH);
const _: () = assert!(HALF_DIMENSIONS % 32 == 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_hashes() {
        assert_eq!(VERSION, 2062757654);
        assert_eq!(ARCHITECTURE_HASH, 1046128366);
        assert_eq!(FEATURE_TRANSFORMER_HASH, 1567217592);
        assert_eq!(ARCHITECTURE_HASH, FEATURE_TRANSFORMER_HASH ^ NETWORK_HASH);
    }
}
