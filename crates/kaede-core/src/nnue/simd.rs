//! NNUE の演算カーネル
//!
//! x86_64 では実行時に AVX2 を検出して 256bit 版を使い、それ以外はスカラー版を使う。
//! 検出結果は std がキャッシュする。
//! どちらの経路も整数演算の結果はビット単位で一致する。

use super::constants::{HALF_DIMENSIONS, WEIGHT_SCALE_BITS};

/// `acc += row`（i16 のラップアラウンド加算、飽和なし）
#[inline]
pub(crate) fn add_row(acc: &mut [i16; HALF_DIMENSIONS], row: &[i16]) {
    debug_assert_eq!(row.len(), HALF_DIMENSIONS);
    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 は検出済み
        unsafe { avx2::add_row(acc, row) };
        return;
    }
    scalar::add_row(acc, row);
}

/// `acc -= row`（i16 のラップアラウンド減算、飽和なし）
#[inline]
pub(crate) fn sub_row(acc: &mut [i16; HALF_DIMENSIONS], row: &[i16]) {
    debug_assert_eq!(row.len(), HALF_DIMENSIONS);
    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 は検出済み
        unsafe { avx2::sub_row(acc, row) };
        return;
    }
    scalar::sub_row(acc, row);
}

/// Accumulator を [0, 127] に丸めて `output` に書き込む
#[inline]
pub(crate) fn clip_accumulator(acc: &[i16; HALF_DIMENSIONS], output: &mut [u8]) {
    debug_assert_eq!(output.len(), HALF_DIMENSIONS);
    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 は検出済み
        unsafe { avx2::clip_accumulator(acc, output) };
        return;
    }
    scalar::clip_accumulator(acc, output);
}

/// 全結合層 `output = bias + weights · input`
///
/// `weights` は出力ごとに `input.len()` 個並ぶ行優先。
#[inline]
pub(crate) fn affine(input: &[u8], weights: &[i8], bias: &[i32], output: &mut [i32]) {
    debug_assert_eq!(weights.len(), input.len() * output.len());
    debug_assert_eq!(bias.len(), output.len());
    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") && input.len().is_multiple_of(32) {
        // SAFETY: AVX2 は検出済み、入力次元は32の倍数
        unsafe { avx2::affine(input, weights, bias, output) };
        return;
    }
    scalar::affine(input, weights, bias, output);
}

/// `(x >> WEIGHT_SCALE_BITS)` を [0, 127] に丸める
#[inline]
pub(crate) fn clipped_relu(input: &[i32], output: &mut [u8]) {
    debug_assert_eq!(input.len(), output.len());
    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 は検出済み
        unsafe { avx2::clipped_relu(input, output) };
        return;
    }
    scalar::clipped_relu(input, output);
}

mod scalar {
    use super::{HALF_DIMENSIONS, WEIGHT_SCALE_BITS};

    #[inline]
    pub(super) fn add_row(acc: &mut [i16; HALF_DIMENSIONS], row: &[i16]) {
        for (a, &w) in acc.iter_mut().zip(row) {
            *a = a.wrapping_add(w);
        }
    }

    #[inline]
    pub(super) fn sub_row(acc: &mut [i16; HALF_DIMENSIONS], row: &[i16]) {
        for (a, &w) in acc.iter_mut().zip(row) {
            *a = a.wrapping_sub(w);
        }
    }

    #[inline]
    pub(super) fn clip_accumulator(acc: &[i16; HALF_DIMENSIONS], output: &mut [u8]) {
        for (o, &a) in output.iter_mut().zip(acc.iter()) {
            *o = a.clamp(0, 127) as u8;
        }
    }

    #[inline]
    pub(super) fn affine(input: &[u8], weights: &[i8], bias: &[i32], output: &mut [i32]) {
        let input_dim = input.len();
        output.copy_from_slice(bias);
        for (o, out) in output.iter_mut().enumerate() {
            let row = &weights[o * input_dim..(o + 1) * input_dim];
            *out += input
                .iter()
                .zip(row)
                .map(|(&x, &w)| x as i32 * w as i32)
                .sum::<i32>();
        }
    }

    #[inline]
    pub(super) fn clipped_relu(input: &[i32], output: &mut [u8]) {
        for (o, &x) in output.iter_mut().zip(input) {
            *o = (x >> WEIGHT_SCALE_BITS).clamp(0, 127) as u8;
        }
    }
}

/// AVX2 版
///
/// # Safety
///
/// どの関数も呼び出し元で AVX2 が使えることを確認しておくこと。
/// loadu/storeu を使うのでアライメントは要らない。
#[cfg(target_arch = "x86_64")]
mod avx2 {
    use std::arch::x86_64::*;

    use super::{HALF_DIMENSIONS, WEIGHT_SCALE_BITS};

    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn add_row(acc: &mut [i16; HALF_DIMENSIONS], row: &[i16]) {
        // SAFETY: acc と row は HALF_DIMENSIONS(=256) 要素
        unsafe {
            let acc_ptr = acc.as_mut_ptr() as *mut __m256i;
            let row_ptr = row.as_ptr() as *const __m256i;
            for i in 0..HALF_DIMENSIONS / 16 {
                let a = _mm256_loadu_si256(acc_ptr.add(i));
                let w = _mm256_loadu_si256(row_ptr.add(i));
                _mm256_storeu_si256(acc_ptr.add(i), _mm256_add_epi16(a, w));
            }
        }
    }

    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn sub_row(acc: &mut [i16; HALF_DIMENSIONS], row: &[i16]) {
        // SAFETY: add_row と同じ
        unsafe {
            let acc_ptr = acc.as_mut_ptr() as *mut __m256i;
            let row_ptr = row.as_ptr() as *const __m256i;
            for i in 0..HALF_DIMENSIONS / 16 {
                let a = _mm256_loadu_si256(acc_ptr.add(i));
                let w = _mm256_loadu_si256(row_ptr.add(i));
                _mm256_storeu_si256(acc_ptr.add(i), _mm256_sub_epi16(a, w));
            }
        }
    }

    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn clip_accumulator(acc: &[i16; HALF_DIMENSIONS], output: &mut [u8]) {
        // SAFETY: 入力 256 要素、出力 256 バイト
        unsafe {
            let zero = _mm256_setzero_si256();
            let in_ptr = acc.as_ptr() as *const __m256i;
            let out_ptr = output.as_mut_ptr() as *mut __m256i;
            for i in 0..HALF_DIMENSIONS / 32 {
                let a = _mm256_loadu_si256(in_ptr.add(i * 2));
                let b = _mm256_loadu_si256(in_ptr.add(i * 2 + 1));
                // i16 -> i8 の飽和パックで上限 127、max で下限 0
                let packed = _mm256_max_epi8(_mm256_packs_epi16(a, b), zero);
                // packs は 128bit レーンごとに交互に並ぶので並べ直す
                let ordered = _mm256_permute4x64_epi64(packed, 0b11_01_10_00);
                _mm256_storeu_si256(out_ptr.add(i), ordered);
            }
        }
    }

    /// `input.len()` は32の倍数
    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn affine(input: &[u8], weights: &[i8], bias: &[i32], output: &mut [i32]) {
        let input_dim = input.len();
        debug_assert!(input_dim.is_multiple_of(32));
        output.copy_from_slice(bias);
        // SAFETY: 各行は weights[o * input_dim..(o + 1) * input_dim]
        unsafe {
            let chunks = input_dim / 32;
            for (o, out) in output.iter_mut().enumerate() {
                let row = weights.as_ptr().add(o * input_dim);
                let mut sum = _mm256_setzero_si256();
                for c in 0..chunks {
                    let x = _mm256_loadu_si256(input.as_ptr().add(c * 32) as *const __m256i);
                    let w = _mm256_loadu_si256(row.add(c * 32) as *const __m256i);
                    // 入力は u8 → i16、重みは i8 → i16 に広げてから積和（i32、飽和なし）
                    let x_lo = _mm256_cvtepu8_epi16(_mm256_castsi256_si128(x));
                    let x_hi = _mm256_cvtepu8_epi16(_mm256_extracti128_si256(x, 1));
                    let w_lo = _mm256_cvtepi8_epi16(_mm256_castsi256_si128(w));
                    let w_hi = _mm256_cvtepi8_epi16(_mm256_extracti128_si256(w, 1));
                    sum = _mm256_add_epi32(sum, _mm256_madd_epi16(x_lo, w_lo));
                    sum = _mm256_add_epi32(sum, _mm256_madd_epi16(x_hi, w_hi));
                }
                *out += hsum_epi32(sum);
            }
        }
    }

    /// 32 個単位は AVX2、端数はスカラー
    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn clipped_relu(input: &[i32], output: &mut [u8]) {
        let chunks = input.len() / 32;
        // SAFETY: chunks * 32 <= input.len() == output.len()
        unsafe {
            let zero = _mm256_setzero_si256();
            let max = _mm256_set1_epi32(127);
            let perm = _mm256_setr_epi32(0, 4, 1, 5, 2, 6, 3, 7);
            let in_ptr = input.as_ptr() as *const __m256i;
            let out_ptr = output.as_mut_ptr() as *mut __m256i;
            for i in 0..chunks {
                let mut v = [zero; 4];
                for (j, slot) in v.iter_mut().enumerate() {
                    let x = _mm256_srai_epi32(
                        _mm256_loadu_si256(in_ptr.add(i * 4 + j)),
                        WEIGHT_SCALE_BITS as i32,
                    );
                    *slot = _mm256_min_epi32(_mm256_max_epi32(x, zero), max);
                }
                let words0 = _mm256_packs_epi32(v[0], v[1]);
                let words1 = _mm256_packs_epi32(v[2], v[3]);
                let bytes = _mm256_packs_epi16(words0, words1);
                _mm256_storeu_si256(out_ptr.add(i), _mm256_permutevar8x32_epi32(bytes, perm));
            }
        }
        let processed = chunks * 32;
        super::scalar::clipped_relu(&input[processed..], &mut output[processed..]);
    }

    /// 8 個の i32 の総和
    #[target_feature(enable = "avx2")]
    unsafe fn hsum_epi32(v: __m256i) -> i32 {
        // SAFETY: 呼び出し元で AVX2 が有効
        unsafe {
            let sum128 = _mm_add_epi32(_mm256_castsi256_si128(v), _mm256_extracti128_si256(v, 1));
            let sum64 = _mm_add_epi32(sum128, _mm_unpackhi_epi64(sum128, sum128));
            let sum32 = _mm_add_epi32(sum64, _mm_shuffle_epi32(sum64, 0b01));
            _mm_cvtsi128_si32(sum32)
        }
    }
}
