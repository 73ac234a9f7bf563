//! 反復深化 + aspiration window + PVS による探索
//!
//! 1スレッド分の探索器。局面は呼び出し側が所有し、do_move / undo_move で書き換えながら潜る。
//! 置換表は指し手の並べ替えにだけ使い、評価値は読まない。

use std::sync::Arc;

use log::debug;

use super::aspiration::AspirationWindow;
use super::info::{PvNode, SearchInfo};
use super::signals::SearchSignals;
use super::time::TimeBudget;
use crate::evaluate::Evaluator;
use crate::movegen::{MoveGenerator, MoveList};
use crate::moves::{Move, Move16};
use crate::position::Position;
use crate::tt::TranspositionTable;
use crate::types::{Bound, MAX_PLY, Value};

// =============================================================================
// 定数
// =============================================================================

/// スレッド0が思考時間を確認する間隔（ノード数）
pub const TIME_CHECK_INTERVAL: u64 = 4096;

/// fail high / fail low の途中経過を出力し始める経過時間（ミリ秒）
pub const INTERMEDIATE_REPORT_MS: u64 = 3000;

// =============================================================================
// SearchWorker
// =============================================================================

/// 1スレッド分の探索器
pub struct SearchWorker<E, G> {
    thread_id: usize,
    evaluator: E,
    generator: G,
    tt: Arc<TranspositionTable>,
    signals: Arc<SearchSignals>,
    time: Arc<dyn TimeBudget>,
    max_depth: i32,
    nodes: u64,
}

impl<E: Evaluator, G: MoveGenerator> SearchWorker<E, G> {
    pub fn new(
        thread_id: usize,
        evaluator: E,
        generator: G,
        tt: Arc<TranspositionTable>,
        signals: Arc<SearchSignals>,
        time: Arc<dyn TimeBudget>,
    ) -> Self {
        SearchWorker {
            thread_id,
            evaluator,
            generator,
            tt,
            signals,
            time,
            max_depth: MAX_PLY - 1,
            nodes: 0,
        }
    }

    /// 反復深化の最大深さ（1..MAX_PLY に丸める）
    pub fn with_max_depth(mut self, depth: i32) -> Self {
        self.max_depth = depth.clamp(1, MAX_PLY - 1);
        self
    }

    pub fn thread_id(&self) -> usize {
        self.thread_id
    }

    /// 直近の `think` で訪れたノード数
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// 反復深化
    ///
    /// 停止フラグが立つか最大深さに達するまで深さを1ずつ増やす。途中で打ち切られた反復の
    /// 結果は捨て、最後に完了した反復の結果を返す。1回も完了しなければ投了。
    pub fn think(&mut self, pos: &mut Position, mut on_info: impl FnMut(&SearchInfo)) -> PvNode {
        self.nodes = 0;
        let mut best = PvNode {
            mv: Move::RESIGN,
            value: Value::ZERO,
            depth: 1,
            next: None,
        };

        for depth in 1..=self.max_depth {
            if !self.signals.is_thinking() {
                break;
            }

            let mut window = AspirationWindow::new(depth, best.value);
            let candidate = loop {
                let mut candidate = self.search(pos, window.alpha, window.beta, depth);
                candidate.depth = depth;

                let bound = window.bound_of(candidate.value);
                if bound != Bound::Exact && self.time.elapsed_ms() > INTERMEDIATE_REPORT_MS {
                    on_info(&self.info(&candidate, bound));
                }

                if !self.signals.is_thinking() {
                    break candidate;
                }
                match bound {
                    Bound::Upper => window.fail_low(candidate.value),
                    Bound::Lower => window.fail_high(candidate.value),
                    Bound::Exact | Bound::None => break candidate,
                }
            };

            if self.signals.is_thinking() {
                best = candidate;
            }
            on_info(&self.info(&best, Bound::Exact));
            debug!(
                "thread {} depth {} value {} nodes {} bestmove {}",
                self.thread_id, depth, best.value, self.nodes, best.mv
            );
        }
        best
    }

    fn info(&self, node: &PvNode, bound: Bound) -> SearchInfo {
        SearchInfo {
            depth: node.depth,
            value: node.value,
            bound,
            nodes: self.nodes,
            elapsed_ms: self.time.elapsed_ms(),
            hashfull: self.tt.hashfull(),
            pv: node.pv(),
        }
    }

    /// 停止の確認とノード数の加算
    #[inline]
    fn count_node(&mut self) {
        if self.thread_id == 0
            && self.nodes % TIME_CHECK_INTERVAL == 0
            && !self.time.is_thinking()
        {
            self.signals.stop();
        }
        self.nodes += 1;
    }

    /// negamax（fail hard）
    ///
    /// 返す値は手番側から見た評価値で、[alpha, beta] に収まる。停止フラグが落ちていれば
    /// 何もせず `Value::DRAW` を返す。
    pub fn search(&mut self, pos: &mut Position, alpha: Value, beta: Value, depth: i32) -> PvNode {
        if !self.signals.is_thinking() {
            return PvNode::leaf(Value::DRAW);
        }
        self.count_node();

        if depth <= 0 {
            return PvNode::leaf(self.evaluator.evaluate(pos));
        }

        let key = pos.key();
        let mut moves = MoveList::new();
        self.generator.generate(pos, &mut moves);
        self.order_tt_move(pos, key, &mut moves);

        let us = pos.side_to_move();
        let mut alpha = alpha;
        let mut best_move = Move::RESIGN;
        let mut best_child = None;
        let mut search_pv = true;
        let mut legal_moves = 0;

        for &mv in moves.iter() {
            if !self.signals.is_thinking() {
                break;
            }

            pos.do_move(mv);
            if pos.in_check(us) {
                // 王手放置
                pos.undo_move(mv);
                continue;
            }
            legal_moves += 1;

            let child = if search_pv {
                self.search(pos, -beta, -alpha, depth - 1)
            } else {
                let probe = self.search(pos, -alpha - 1, -alpha, depth - 1);
                if -probe.value > alpha {
                    self.search(pos, -beta, -alpha, depth - 1)
                } else {
                    probe
                }
            };
            pos.undo_move(mv);

            let value = -child.value;
            if value >= beta {
                if self.signals.is_thinking() {
                    self.tt.save(key, beta, depth, mv.to_move16(), Bound::Lower);
                }
                return PvNode {
                    mv,
                    value: beta,
                    depth,
                    next: Some(Box::new(child)),
                };
            }
            if value > alpha {
                alpha = value;
                best_move = mv;
                best_child = Some(Box::new(child));
                search_pv = false;
            }
        }

        let value = if legal_moves == 0 {
            Value::mated_in(1)
        } else if alpha < Value::MATED_IN_MAX_PLY {
            alpha + 1
        } else if alpha > Value::MATE_IN_MAX_PLY {
            alpha - 1
        } else {
            alpha
        };

        if self.signals.is_thinking() {
            let (bound, stored_move) = if best_move.is_special() {
                let bound = if legal_moves == 0 {
                    Bound::Exact
                } else {
                    Bound::Upper
                };
                (bound, Move16::NONE)
            } else {
                (Bound::Exact, best_move.to_move16())
            };
            self.tt.save(key, value, depth, stored_move, bound);
        }

        PvNode {
            mv: best_move,
            value,
            depth,
            next: best_child,
        }
    }

    /// 置換表の指し手が生成されていれば先頭に移す
    fn order_tt_move(&self, pos: &Position, key: u64, moves: &mut MoveList) {
        let (entry, found) = self.tt.probe(key);
        if !found {
            return;
        }
        let Some(tt_move) = entry.mv.to_move(pos) else {
            return;
        };
        if let Some(index) = moves.iter().position(|&mv| mv == tt_move) {
            moves[..=index].rotate_right(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::MaterialEvaluator;
    use crate::movegen::PseudoLegalGenerator;
    use crate::nnue::Network;
    use crate::search::{ASPIRATION_INITIAL_DELTA, TimeManager};
    use crate::types::Color;
    use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

    fn worker<E: Evaluator>(evaluator: E) -> SearchWorker<E, PseudoLegalGenerator> {
        let signals = Arc::new(SearchSignals::new());
        signals.start();
        SearchWorker::new(
            0,
            evaluator,
            PseudoLegalGenerator,
            Arc::new(TranspositionTable::new(1)),
            signals,
            Arc::new(TimeManager::infinite()),
        )
    }

    /// `limit` 回目の問い合わせで時間切れを返す
    struct PollBudget {
        polls: AtomicU64,
        limit: u64,
    }

    impl TimeBudget for PollBudget {
        fn is_thinking(&self) -> bool {
            self.polls.fetch_add(1, Ordering::Relaxed) + 1 < self.limit
        }

        fn elapsed_ms(&self) -> u64 {
            0
        }
    }

    #[test]
    fn test_depth_zero_returns_static_eval() {
        let network = Network::random(1);
        let mut w = worker(&network);
        let mut pos = Position::from_sfen(
            "l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w RGgsn5p 1",
        )
        .unwrap();
        let expected = network.evaluate(&mut pos);
        let node = w.search(&mut pos, -Value::INFINITE, Value::INFINITE, 0);
        assert_eq!(node.value, expected);
        assert_eq!(node.mv, Move::NONE);
        assert_eq!(w.nodes(), 1);
    }

    #[test]
    fn test_single_legal_move_is_chosen() {
        // 2筋に後手の飛車。1九玉の動ける升は 1八 だけ
        let sfen = "k6r1/9/9/9/9/9/9/9/8K b - 1";
        let mut pos = Position::from_sfen(sfen).unwrap();
        for depth in 1..=3 {
            let mut w = worker(MaterialEvaluator).with_max_depth(depth);
            let best = w.think(&mut pos, |_| {});
            assert_eq!(best.mv.to_usi(), "1i1h", "depth {depth}");
        }
    }

    #[test]
    fn test_finds_mate_in_one() {
        // 1一玉に対して 金打ちで頭金
        let sfen = "8k/9/8P/9/9/9/9/9/K8 b G 1";
        let mut pos = Position::from_sfen(sfen).unwrap();
        let mut w = worker(MaterialEvaluator).with_max_depth(3);
        let best = w.think(&mut pos, |_| {});
        assert_eq!(best.mv.to_usi(), "G*1b");
        assert_eq!(best.value.mate_ply(), Some(1));
    }

    #[test]
    fn test_checkmated_root_scores_mated() {
        // 頭金で詰んでいる後手玉
        let sfen = "8k/8G/8P/9/9/9/9/9/K8 w - 1";
        let mut pos = Position::from_sfen(sfen).unwrap();
        let mut w = worker(MaterialEvaluator);
        let node = w.search(&mut pos, -Value::INFINITE, Value::INFINITE, 2);
        assert_eq!(node.value, Value::mated_in(1));
        assert_eq!(node.mv, Move::RESIGN);
    }

    #[test]
    fn test_captures_hanging_rook() {
        let sfen = "k8/9/9/9/4r4/9/9/4R4/K8 b - 1";
        let mut pos = Position::from_sfen(sfen).unwrap();
        let mut w = worker(MaterialEvaluator).with_max_depth(2);
        let best = w.think(&mut pos, |_| {});
        assert_eq!(best.mv.to_usi(), "5h5e");
        assert_eq!(best.pv()[0], best.mv);
    }

    #[test]
    fn test_stopped_search_returns_draw() {
        let mut w = worker(MaterialEvaluator);
        w.signals.stop();
        let mut pos = Position::default();
        let node = w.search(&mut pos, -Value::INFINITE, Value::INFINITE, 3);
        assert_eq!(node.value, Value::DRAW);
        assert_eq!(w.nodes(), 0);
    }

    #[test]
    fn test_time_budget_stops_iterative_deepening() {
        let signals = Arc::new(SearchSignals::new());
        signals.start();
        let budget = Arc::new(PollBudget {
            polls: AtomicU64::new(0),
            limit: 3,
        });
        let mut w = SearchWorker::new(
            0,
            MaterialEvaluator,
            PseudoLegalGenerator,
            Arc::new(TranspositionTable::new(1)),
            signals.clone(),
            budget,
        );
        let mut pos = Position::default();
        let mut completed = Vec::new();
        let best = w.think(&mut pos, |info| completed.push(info.depth));
        assert!(!signals.is_thinking());
        // 打ち切られるまでに完了した反復の結果が残る
        assert!(!best.mv.is_special());
        assert!(best.depth < MAX_PLY - 1);
        assert_eq!(*completed.last().unwrap(), best.depth);
        // 局面は元に戻っている
        assert_eq!(pos.ply(), 0);
        assert_eq!(pos.key(), Position::default().key());
    }

    #[test]
    fn test_search_stores_root_in_tt() {
        let mut w = worker(MaterialEvaluator).with_max_depth(2);
        let mut pos = Position::default();
        let best = w.think(&mut pos, |_| {});
        let (entry, found) = w.tt.probe(pos.key());
        assert!(found);
        assert_eq!(entry.mv, best.mv.to_move16());
    }

    #[test]
    fn test_info_reported_each_iteration() {
        let mut w = worker(MaterialEvaluator).with_max_depth(3);
        let mut pos = Position::default();
        let mut depths = Vec::new();
        w.think(&mut pos, |info| {
            assert_eq!(info.bound, Bound::Exact);
            depths.push(info.depth);
        });
        assert_eq!(depths, vec![1, 2, 3]);
    }

    /// 先手から見て常に同じ値を返す。値は外から書き換える
    struct ShiftEvaluator(Arc<AtomicI32>);

    impl Evaluator for ShiftEvaluator {
        fn evaluate(&self, pos: &mut Position) -> Value {
            let v = self.0.load(Ordering::Relaxed);
            let v = if pos.side_to_move() == Color::Black {
                v
            } else {
                -v
            };
            Value::new(v)
        }
    }

    /// 打ち切らず、途中経過を出す時刻を過ぎている
    struct LateBudget;

    impl TimeBudget for LateBudget {
        fn is_thinking(&self) -> bool {
            true
        }

        fn elapsed_ms(&self) -> u64 {
            INTERMEDIATE_REPORT_MS + 1000
        }
    }

    #[test]
    fn test_aspiration_research_until_inside_window() {
        let shift = Arc::new(AtomicI32::new(0));
        let signals = Arc::new(SearchSignals::new());
        signals.start();
        let mut w = SearchWorker::new(
            0,
            ShiftEvaluator(shift.clone()),
            PseudoLegalGenerator,
            Arc::new(TranspositionTable::new(1)),
            signals,
            Arc::new(LateBudget),
        )
        .with_max_depth(5);
        let mut pos = Position::from_sfen("k6r1/9/9/9/9/9/9/9/8K b - 1").unwrap();

        // 深さ3の後で +500、深さ4の後で -500 に跳ばす
        let mut reports = Vec::new();
        let best = w.think(&mut pos, |info| {
            if info.bound == Bound::Exact {
                match info.depth {
                    3 => shift.store(500, Ordering::Relaxed),
                    4 => shift.store(-500, Ordering::Relaxed),
                    _ => {}
                }
            }
            reports.push((info.depth, info.bound, info.value.raw()));
        });
        assert_eq!(best.value, Value::new(-500));
        assert_eq!(best.depth, 5);

        let values = |depth: i32, bound: Bound| -> Vec<i32> {
            reports
                .iter()
                .filter(|r| r.0 == depth && r.1 == bound)
                .map(|r| r.2)
                .collect()
        };
        let steps = |v: &[i32]| -> Vec<i32> {
            v.windows(2).map(|p| (p[1] - p[0]).abs()).collect()
        };
        let mut deltas = vec![ASPIRATION_INITIAL_DELTA];
        while deltas.len() < 12 {
            let d = *deltas.last().unwrap();
            deltas.push(d + d / 4 + 5);
        }
        assert_eq!(&deltas[..4], &[17, 26, 37, 51]);

        // 深さ4: fail high のたびに beta = 前回の beta + delta
        let highs = values(4, Bound::Lower);
        assert_eq!(highs[0], 17);
        assert!(highs.len() >= 2);
        assert_eq!(steps(&highs), deltas[..highs.len() - 1].to_vec());
        assert!(values(4, Bound::Upper).is_empty());
        assert_eq!(values(4, Bound::Exact), vec![500]);

        // 深さ5: fail low のたびに alpha = 前回の alpha - delta
        let lows = values(5, Bound::Upper);
        assert_eq!(lows[0], 500 - 17);
        assert!(lows.len() >= 2);
        assert_eq!(steps(&lows), deltas[..lows.len() - 1].to_vec());
        assert!(values(5, Bound::Lower).is_empty());
        assert_eq!(values(5, Bound::Exact), vec![-500]);

        for depth in 1..=3 {
            assert_eq!(values(depth, Bound::Exact), vec![0], "depth {depth}");
        }
    }
}
