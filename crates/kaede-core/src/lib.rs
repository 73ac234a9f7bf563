//! kaede-core: 将棋エンジンの思考部
//!
//! - `types`: 手番・升・駒・評価値などの基本型
//! - `moves`: 指し手（正規形・16bit圧縮形・USI文字列）
//! - `position`: 局面と Zobrist ハッシュ
//! - `movegen`: 疑似合法手生成
//! - `evaluate`: 評価関数の抽象と駒割り評価
//! - `nnue`: HalfKP 256x2-32-32 評価関数
//! - `tt`: 置換表
//! - `search`: 反復深化 + aspiration window + PVS

pub mod config;
pub mod evaluate;
pub mod movegen;
pub mod moves;
pub mod nnue;
pub mod position;
pub mod search;
pub mod tt;
pub mod types;

pub use config::{ConfigError, EngineOptions};
pub use evaluate::{Evaluator, MaterialEvaluator};
pub use movegen::{MoveGenerator, MoveList, PseudoLegalGenerator};
pub use moves::{Move, Move16, UsiMoveError};
pub use nnue::{Network, WeightsError};
pub use position::{Position, SfenError, Zobrist};
pub use types::{Bound, Color, Hand, MAX_PLY, Piece, PieceType, Square, Value};
