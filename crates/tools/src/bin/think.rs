//! 局面を1つ探索するツール
//!
//! 評価関数を読み込み、指定した局面（と続く指し手）から探索して、info 行と bestmove を
//! 標準出力に書く。
//!
//! ```text
//! think --eval-dir eval --sfen startpos --moves 7g7f 3c3d --movetime 5000 --threads 4
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use kaede_core::config::{EVAL_DIR, MAX_DEPTH, THREADS, USI_HASH};
use kaede_core::search::{Searchers, TimeBudget, TimeManager};
use kaede_core::tt::TranspositionTable;
use kaede_core::{
    EngineOptions, Move, MoveGenerator, MoveList, Network, Position, PseudoLegalGenerator,
};

#[derive(Parser, Debug)]
#[command(name = "think")]
#[command(about = "局面を探索して最善手を出力する")]
struct Cli {
    /// 開始局面（SFEN または startpos）
    #[arg(long, default_value = "startpos")]
    sfen: String,

    /// 開始局面から進める指し手（USI形式）
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,

    /// nn.bin のあるディレクトリ
    #[arg(long)]
    eval_dir: Option<PathBuf>,

    /// 置換表のサイズ（MiB）
    #[arg(long)]
    hash: Option<usize>,

    /// 探索スレッド数
    #[arg(long)]
    threads: Option<usize>,

    /// 反復深化の最大深さ
    #[arg(long)]
    depth: Option<i32>,

    /// 思考時間（ミリ秒）。省略時は深さ制限まで考える
    #[arg(long)]
    movetime: Option<u64>,

    /// エンジンオプションの TOML ファイル
    #[arg(long)]
    config: Option<PathBuf>,

    /// 追加のオプション（NAME=VALUE、複数指定可）
    #[arg(long = "option", value_name = "NAME=VALUE")]
    options: Vec<String>,
}

/// TOML・`--option`・個別の引数の順に上書きしてオプションを決める
fn build_options(cli: &Cli) -> Result<EngineOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => EngineOptions::new(),
    };
    for assignment in &cli.options {
        options.parse_assignment(assignment)?;
    }
    if let Some(dir) = &cli.eval_dir {
        options.set(EVAL_DIR, dir.to_string_lossy());
    }
    if let Some(hash) = cli.hash {
        options.set(USI_HASH, hash.to_string());
    }
    if let Some(threads) = cli.threads {
        options.set(THREADS, threads.to_string());
    }
    if let Some(depth) = cli.depth {
        options.set(MAX_DEPTH, depth.to_string());
    }
    Ok(options)
}

/// 開始局面に `moves` を順に適用する。生成される合法手でなければエラー
fn build_position(sfen: &str, moves: &[String]) -> Result<Position> {
    let mut pos = Position::from_sfen(sfen).context("invalid --sfen")?;
    for text in moves {
        let mv = Move::from_usi(&pos, text).with_context(|| format!("invalid move {text:?}"))?;
        let mut candidates = MoveList::new();
        PseudoLegalGenerator.generate(&pos, &mut candidates);
        if !candidates.contains(&mv) {
            bail!("illegal move {text:?} in {}", pos.to_sfen());
        }
        let us = pos.side_to_move();
        pos.do_move(mv);
        if pos.in_check(us) {
            bail!("illegal move {text:?}: leaves the king in check");
        }
    }
    Ok(pos)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let options = build_options(&cli)?;
    let pos = build_position(&cli.sfen, &cli.moves)?;

    let network = Network::load_from_options(&options)
        .with_context(|| format!("failed to load {}", options.eval_file().display()))?;
    let hash_mb = options.hash_mb()?;
    let tt = Arc::new(TranspositionTable::new(hash_mb));
    let threads = options.threads()?;
    let searchers = Searchers::new(Arc::new(network), PseudoLegalGenerator, tt, threads)
        .with_max_depth(options.max_depth()?);

    let time: Arc<dyn TimeBudget> = match cli.movetime {
        Some(ms) => Arc::new(TimeManager::new(Duration::from_millis(ms))),
        None => Arc::new(TimeManager::infinite()),
    };

    info!("position: {}", pos.to_sfen());
    info!("threads: {}, hash: {hash_mb}MB", searchers.threads());
    let best = searchers.think(&pos, time, |info| println!("{}", info.to_usi_line()));
    println!("bestmove {}", best.mv);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaede_core::{Color, PieceType};

    fn moves(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_build_position_applies_moves() {
        let pos = build_position("startpos", &moves(&["7g7f", "3c3d", "8h2b+"])).unwrap();
        assert_eq!(pos.ply(), 3);
        assert_eq!(pos.hand(Color::Black).count(PieceType::Bishop), 1);
    }

    #[test]
    fn test_build_position_rejects_impossible_moves() {
        // 持っていない駒を打つ
        assert!(build_position("startpos", &moves(&["P*5e"])).is_err());
        // 相手の駒を動かす
        assert!(build_position("startpos", &moves(&["3c3d"])).is_err());
        // 飛び越し
        assert!(build_position("startpos", &moves(&["8h2b"])).is_err());
        // 王手放置（5筋の飛車に王手されている）
        let sfen = "4k4/9/9/9/4r4/9/9/9/4K4 b - 1";
        assert!(build_position(sfen, &moves(&["5i4h"])).is_ok());
        assert!(build_position(sfen, &moves(&["5i5h"])).is_err());
    }
}
