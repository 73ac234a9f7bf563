//! 複数スレッドでの探索
//!
//! スレッドごとに局面を複製し、置換表・評価関数・停止フラグを共有する。
//! スレッド0だけが時間を確認し、info を出力し、結果を返す。

use std::sync::Arc;
use std::thread;

use log::{debug, warn};

use super::alpha_beta::SearchWorker;
use super::info::{PvNode, SearchInfo};
use super::signals::SearchSignals;
use super::time::TimeBudget;
use crate::evaluate::Evaluator;
use crate::movegen::MoveGenerator;
use crate::position::Position;
use crate::tt::TranspositionTable;
use crate::types::MAX_PLY;

/// 探索スレッド群
pub struct Searchers<E, G> {
    evaluator: E,
    generator: G,
    tt: Arc<TranspositionTable>,
    signals: Arc<SearchSignals>,
    threads: usize,
    max_depth: i32,
}

impl<E, G> Searchers<E, G>
where
    E: Evaluator + Clone,
    G: MoveGenerator + Clone,
{
    pub fn new(evaluator: E, generator: G, tt: Arc<TranspositionTable>, threads: usize) -> Self {
        Searchers {
            evaluator,
            generator,
            tt,
            signals: Arc::new(SearchSignals::new()),
            threads: threads.max(1),
            max_depth: MAX_PLY - 1,
        }
    }

    pub fn with_max_depth(mut self, depth: i32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn tt(&self) -> &Arc<TranspositionTable> {
        &self.tt
    }

    /// 外部から探索を止めるためのフラグ
    pub fn signals(&self) -> &Arc<SearchSignals> {
        &self.signals
    }

    fn worker(&self, thread_id: usize, time: &Arc<dyn TimeBudget>) -> SearchWorker<E, G> {
        SearchWorker::new(
            thread_id,
            self.evaluator.clone(),
            self.generator.clone(),
            Arc::clone(&self.tt),
            Arc::clone(&self.signals),
            Arc::clone(time),
        )
        .with_max_depth(self.max_depth)
    }

    /// `pos` から探索し、スレッド0の結果を返す
    pub fn think(
        &self,
        pos: &Position,
        time: Arc<dyn TimeBudget>,
        on_info: impl FnMut(&SearchInfo),
    ) -> PvNode {
        self.tt.new_search();
        self.signals.start();

        thread::scope(|scope| {
            let helpers: Vec<_> = (1..self.threads)
                .map(|thread_id| {
                    let mut worker = self.worker(thread_id, &time);
                    let mut pos = pos.clone();
                    scope.spawn(move || {
                        worker.think(&mut pos, |_| {});
                        worker.nodes()
                    })
                })
                .collect();

            let mut main = self.worker(0, &time);
            let mut main_pos = pos.clone();
            let best = main.think(&mut main_pos, on_info);
            self.signals.stop();

            let mut nodes = main.nodes();
            for handle in helpers {
                match handle.join() {
                    Ok(n) => nodes += n,
                    Err(_) => warn!("a helper search thread panicked"),
                }
            }
            debug!("search finished: {} threads, {} nodes", self.threads, nodes);
            best
        })
    }
}
