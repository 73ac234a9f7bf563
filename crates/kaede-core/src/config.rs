//! エンジンオプション
//!
//! USI の `setoption` と同じく名前と値の文字列の組で保持する。TOML から読む場合は
//! 数値や真偽値もそのまま書ける。

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::MAX_PLY;

pub const EVAL_DIR: &str = "EvalDir";
pub const USI_HASH: &str = "USI_Hash";
pub const THREADS: &str = "Threads";
pub const MAX_DEPTH: &str = "MaxDepth";

/// 評価関数ファイル名
pub const EVAL_FILE_NAME: &str = "nn.bin";

const DEFAULT_EVAL_DIR: &str = "eval";
const DEFAULT_HASH_MB: usize = 16;
const DEFAULT_THREADS: usize = 1;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("option {name} has an invalid value: {value:?}")]
    InvalidValue { name: String, value: String },

    #[error("option {name} is out of range: {value}")]
    OutOfRange { name: String, value: String },

    #[error("malformed option {0:?} (expected name=value)")]
    Malformed(String),
}

/// 設定ファイル上の値（文字列に変換して保持する）
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<OptionValue> for String {
    fn from(value: OptionValue) -> String {
        match value {
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Int(n) => n.to_string(),
            OptionValue::Text(s) => s,
        }
    }
}

/// オプション名と値
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, OptionValue>")]
pub struct EngineOptions {
    values: BTreeMap<String, String>,
}

impl From<BTreeMap<String, OptionValue>> for EngineOptions {
    fn from(map: BTreeMap<String, OptionValue>) -> Self {
        EngineOptions {
            values: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// `name=value` の形式を1つ取り込む
    pub fn parse_assignment(&mut self, text: &str) -> Result<(), ConfigError> {
        let (name, value) = text
            .split_once('=')
            .ok_or_else(|| ConfigError::Malformed(text.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::Malformed(text.to_string()));
        }
        self.set(name, value.trim());
        Ok(())
    }

    /// 正の整数のオプション。未設定なら `default`
    fn positive(&self, name: &str, default: usize) -> Result<usize, ConfigError> {
        let Some(text) = self.get(name) else {
            return Ok(default);
        };
        let value: usize = text.parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: text.to_string(),
        })?;
        if value == 0 {
            return Err(ConfigError::OutOfRange {
                name: name.to_string(),
                value: text.to_string(),
            });
        }
        Ok(value)
    }

    pub fn eval_dir(&self) -> PathBuf {
        PathBuf::from(self.get(EVAL_DIR).unwrap_or(DEFAULT_EVAL_DIR))
    }

    /// `<EvalDir>/nn.bin`
    pub fn eval_file(&self) -> PathBuf {
        self.eval_dir().join(EVAL_FILE_NAME)
    }

    /// 置換表のサイズ（MiB）
    pub fn hash_mb(&self) -> Result<usize, ConfigError> {
        self.positive(USI_HASH, DEFAULT_HASH_MB)
    }

    pub fn threads(&self) -> Result<usize, ConfigError> {
        self.positive(THREADS, DEFAULT_THREADS)
    }

    /// 反復深化の最大深さ（1..MAX_PLY）
    pub fn max_depth(&self) -> Result<i32, ConfigError> {
        let depth = self.positive(MAX_DEPTH, MAX_PLY as usize - 1)?;
        if depth >= MAX_PLY as usize {
            let value = depth.to_string();
            return Err(ConfigError::OutOfRange {
                name: MAX_DEPTH.to_string(),
                value,
            });
        }
        Ok(depth as i32)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
