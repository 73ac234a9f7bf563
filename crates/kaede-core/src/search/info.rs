//! 探索結果と読み筋の出力

use std::fmt::Write as _;

use crate::moves::Move;
use crate::types::{Bound, Value};

/// 探索結果のノード
///
/// `next` をたどると読み筋になる。末端（評価値を返しただけのノード）は `Move::NONE`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvNode {
    pub mv: Move,
    pub value: Value,
    pub depth: i32,
    pub next: Option<Box<PvNode>>,
}

impl PvNode {
    /// 指し手を持たない末端ノード
    pub fn leaf(value: Value) -> Self {
        PvNode {
            mv: Move::NONE,
            value,
            depth: 0,
            next: None,
        }
    }

    /// 読み筋の指し手列
    pub fn pv(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut node = Some(self);
        while let Some(n) = node {
            if n.mv.is_special() {
                break;
            }
            moves.push(n.mv);
            node = n.next.as_deref();
        }
        moves
    }
}

/// 1回の反復（または再探索）の報告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: i32,
    pub value: Value,
    /// 探索窓に対する値の位置（窓の中なら Exact）
    pub bound: Bound,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

impl SearchInfo {
    /// USI の info 行
    pub fn to_usi_line(&self) -> String {
        let mut line = format!("info depth {}", self.depth);
        match self.value.mate_ply() {
            Some(ply) => {
                let _ = write!(line, " score mate {ply}");
            }
            None => {
                let _ = write!(line, " score cp {}", self.value.raw());
            }
        }
        match self.bound {
            Bound::Lower => line.push_str(" lowerbound"),
            Bound::Upper => line.push_str(" upperbound"),
            Bound::Exact | Bound::None => {}
        }
        let nps = self.nodes * 1000 / self.elapsed_ms.max(1);
        let _ = write!(
            line,
            " nodes {} nps {} time {} hashfull {}",
            self.nodes, nps, self.elapsed_ms, self.hashfull
        );
        if !self.pv.is_empty() {
            line.push_str(" pv");
            for mv in &self.pv {
                let _ = write!(line, " {mv}");
            }
        }
        line
    }
}
