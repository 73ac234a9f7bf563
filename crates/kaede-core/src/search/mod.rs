//! 探索
//!
//! - `alpha_beta`: 1スレッド分の反復深化・negamax・PVS
//! - `aspiration`: aspiration window の更新規則
//! - `pool`: 複数スレッドでの探索
//! - `info`: 読み筋と info 行
//! - `time` / `signals`: 思考時間と停止フラグ

mod alpha_beta;
mod aspiration;
mod info;
mod pool;
mod signals;
mod time;

pub use alpha_beta::{INTERMEDIATE_REPORT_MS, SearchWorker, TIME_CHECK_INTERVAL};
pub use aspiration::{ASPIRATION_INITIAL_DELTA, ASPIRATION_MIN_DEPTH, AspirationWindow};
pub use info::{PvNode, SearchInfo};
pub use pool::Searchers;
pub use signals::SearchSignals;
pub use time::{TimeBudget, TimeManager};
