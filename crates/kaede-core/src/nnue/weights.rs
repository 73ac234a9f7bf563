//! 評価関数ファイル（nn.bin）の読み書き
//!
//! リトルエンディアンで以下の順に並ぶ。サイズは過不足なく一致しなければならない。
//!
//! | 内容 | 型 |
//! |---|---|
//! | バージョン | u32 |
//! | ハッシュ値 | u32 |
//! | アーキテクチャ文字列長 + 文字列 | u32 + bytes |
//! | 特徴量変換層ヘッダ | u32 |
//! | バイアス / 重み | i16 × 256 / i16 × 256 × 125388 |
//! | ネットワークヘッダ | u32 |
//! | 各全結合層のバイアス / 重み | i32 × 出力 / i8 × 出力 × 入力 |

use std::io::{self, Read, Write};
use std::path::Path;

use log::info;

use super::constants::{
    ARCHITECTURE_HASH, FEATURE_TRANSFORMER_HASH, HALF_DIMENSIONS, NETWORK_HASH, VERSION,
};
use super::network::{AffineLayer, Network};
use crate::config::EngineOptions;

/// アーキテクチャ文字列の長さの上限
const MAX_ARCHITECTURE_LEN: usize = 4096;

/// 評価関数ファイルの読み込みエラー
#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error("failed to read the eval file: {0}")]
    Io(#[from] io::Error),

    #[error("bad version in eval file: found {found:#010x}, expected {expected:#010x}")]
    BadMagic { found: u32, expected: u32 },

    #[error("architecture hash mismatch: found {found:#010x}, expected {expected:#010x}")]
    HashMismatch { found: u32, expected: u32 },

    #[error("{section} header mismatch: found {found:#010x}, expected {expected:#010x}")]
    MarkerMismatch {
        section: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("eval file is truncated in {section}")]
    Truncated { section: &'static str },

    #[error("eval file has {extra} trailing bytes")]
    TrailingBytes { extra: usize },

    #[error("architecture string is too long: {len} bytes")]
    ArchitectureTooLong { len: usize },
}

/// バイト列を先頭から順に読む
struct ByteReader<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteReader<'a> {
    fn take(&mut self, len: usize, section: &'static str) -> Result<&'a [u8], WeightsError> {
        if self.bytes.len() < len {
            return Err(WeightsError::Truncated { section });
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn u32(&mut self, section: &'static str) -> Result<u32, WeightsError> {
        let b = self.take(4, section)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn marker(&mut self, section: &'static str, expected: u32) -> Result<(), WeightsError> {
        let found = self.u32(section)?;
        if found != expected {
            return Err(WeightsError::MarkerMismatch {
                section,
                found,
                expected,
            });
        }
        Ok(())
    }

    fn i16s(&mut self, out: &mut [i16], section: &'static str) -> Result<(), WeightsError> {
        let bytes = self.take(out.len() * 2, section)?;
        for (v, b) in out.iter_mut().zip(bytes.chunks_exact(2)) {
            *v = i16::from_le_bytes([b[0], b[1]]);
        }
        Ok(())
    }

    fn i32s(&mut self, out: &mut [i32], section: &'static str) -> Result<(), WeightsError> {
        let bytes = self.take(out.len() * 4, section)?;
        for (v, b) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *v = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        }
        Ok(())
    }

    fn i8s(&mut self, out: &mut [i8], section: &'static str) -> Result<(), WeightsError> {
        let bytes = self.take(out.len(), section)?;
        for (v, &b) in out.iter_mut().zip(bytes) {
            *v = b as i8;
        }
        Ok(())
    }

    fn affine(
        &mut self,
        layer: &mut AffineLayer,
        section: &'static str,
    ) -> Result<(), WeightsError> {
        self.i32s(&mut layer.bias, section)?;
        self.i8s(&mut layer.weights, section)
    }
}

impl Network {
    /// ファイルから読み込む
    pub fn load(path: impl AsRef<Path>) -> Result<Network, WeightsError> {
        let path = path.as_ref();
        info!("Loading an eval file: {}", path.display());
        let file = std::fs::File::open(path)?;
        let network = Network::read_from(io::BufReader::new(file))?;
        info!("Loaded an eval file: {}", path.display());
        Ok(network)
    }

    /// `<EvalDir>/nn.bin` を読み込む
    pub fn load_from_options(options: &EngineOptions) -> Result<Network, WeightsError> {
        Network::load(options.eval_file())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Network, WeightsError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Network::parse(&bytes)
    }

    fn parse(bytes: &[u8]) -> Result<Network, WeightsError> {
        let mut reader = ByteReader { bytes };

        let version = reader.u32("header")?;
        if version != VERSION {
            return Err(WeightsError::BadMagic {
                found: version,
                expected: VERSION,
            });
        }
        let hash = reader.u32("header")?;
        if hash != ARCHITECTURE_HASH {
            return Err(WeightsError::HashMismatch {
                found: hash,
                expected: ARCHITECTURE_HASH,
            });
        }
        let len = reader.u32("header")? as usize;
        if len > MAX_ARCHITECTURE_LEN {
            return Err(WeightsError::ArchitectureTooLong { len });
        }
        let bytes = reader.take(len, "architecture")?;
        let architecture = String::from_utf8_lossy(bytes).into_owned();

        let mut network = Network::zeroed();
        network.architecture = architecture;

        reader.marker("feature transformer", FEATURE_TRANSFORMER_HASH)?;
        reader.i16s(&mut network.transformer.bias, "feature transformer")?;
        reader.i16s(&mut network.transformer.weights, "feature transformer")?;

        reader.marker("network", NETWORK_HASH)?;
        reader.affine(&mut network.hidden1, "hidden layer 1")?;
        reader.affine(&mut network.hidden2, "hidden layer 2")?;
        reader.affine(&mut network.output, "output layer")?;

        if !reader.bytes.is_empty() {
            return Err(WeightsError::TrailingBytes {
                extra: reader.bytes.len(),
            });
        }
        Ok(network)
    }

    /// `read_from` で読める形式で書き出す
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&ARCHITECTURE_HASH.to_le_bytes())?;
        writer.write_all(&(self.architecture.len() as u32).to_le_bytes())?;
        writer.write_all(self.architecture.as_bytes())?;

        writer.write_all(&FEATURE_TRANSFORMER_HASH.to_le_bytes())?;
        let mut row = [0u8; HALF_DIMENSIONS * 2];
        for values in std::iter::once(&self.transformer.bias[..])
            .chain(self.transformer.weights.chunks_exact(HALF_DIMENSIONS))
        {
            for (b, v) in row.chunks_exact_mut(2).zip(values) {
                b.copy_from_slice(&v.to_le_bytes());
            }
            writer.write_all(&row)?;
        }

        writer.write_all(&NETWORK_HASH.to_le_bytes())?;
        for layer in [&self.hidden1, &self.hidden2, &self.output] {
            for b in layer.bias.iter() {
                writer.write_all(&b.to_le_bytes())?;
            }
            let weights: Vec<u8> = layer.weights.iter().map(|&w| w as u8).collect();
            writer.write_all(&weights)?;
        }
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_reader_reports_section() {
        let bytes = [1u8, 0, 0];
        let mut reader = ByteReader { bytes: &bytes };
        assert!(matches!(
            reader.u32("header"),
            Err(WeightsError::Truncated { section: "header" })
        ));
    }

    #[test]
    fn test_rejects_long_architecture_string() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&ARCHITECTURE_HASH.to_le_bytes());
        bytes.extend_from_slice(&(1u32 << 20).to_le_bytes());
        assert!(matches!(
            Network::read_from(&bytes[..]),
            Err(WeightsError::ArchitectureTooLong { len: 1_048_576 })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Network::load("/nonexistent/kaede/nn.bin").unwrap_err();
        assert!(matches!(err, WeightsError::Io(_)));
    }

    #[test]
    fn test_error_message_names_field() {
        let err = WeightsError::MarkerMismatch {
            section: "network",
            found: 1,
            expected: 2,
        };
        assert_eq!(
            err.to_string(),
            "network header mismatch: found 0x00000001, expected 0x00000002"
        );
    }
}
