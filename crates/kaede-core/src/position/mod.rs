//! 局面（Position）
//!
//! 盤面・手番・持ち駒・玉の位置・Zobrist ハッシュと、手数ごとの `StateInfo` を持つ。
//! 1つの局面は1つの探索スレッドだけが do_move/undo_move で書き換える。

mod attacks;
mod sfen;
mod state;
mod zobrist;

pub(crate) use attacks::{oriented, slide_directions, step_directions};
pub use sfen::{SFEN_HIRATE, SfenError};
pub use state::{ChangedPiece, DirtyPiece, PieceSlot, StateInfo};
pub use zobrist::Zobrist;

use std::sync::Arc;

use crate::moves::Move;
use crate::types::{Color, Hand, Piece, PieceType, Square};

/// 局面
#[derive(Clone)]
pub struct Position {
    board: [Piece; Square::NUM],
    hands: [Hand; Color::NUM],
    side_to_move: Color,
    king_square: [Square; Color::NUM],
    key: u64,
    game_ply: u32,
    /// 探索開始局面からの手数（`states` のインデックス）
    ply: usize,
    /// `ply` までが有効。それより先は再利用待ちのスロット
    states: Vec<StateInfo>,
    zobrist: Arc<Zobrist>,
}

impl Position {
    /// 平手初期局面
    pub fn new(zobrist: Arc<Zobrist>) -> Position {
        let mut pos = Position::empty(zobrist);
        // 定数の SFEN なので失敗しない
        if let Err(e) = pos.set_sfen(SFEN_HIRATE) {
            unreachable!("hirate sfen must parse: {e}");
        }
        pos
    }

    /// 既定の乱数表で SFEN から作成
    pub fn from_sfen(sfen: &str) -> Result<Position, SfenError> {
        let mut pos = Position::empty(Arc::new(Zobrist::default()));
        pos.set_sfen(sfen)?;
        Ok(pos)
    }

    pub(crate) fn empty(zobrist: Arc<Zobrist>) -> Position {
        Position {
            board: [Piece::EMPTY; Square::NUM],
            hands: [Hand::EMPTY; Color::NUM],
            side_to_move: Color::Black,
            king_square: [Square::SQ_11; Color::NUM],
            key: 0,
            game_ply: 1,
            ply: 0,
            states: vec![StateInfo::root()],
            zobrist,
        }
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    #[inline]
    pub fn hand(&self, color: Color) -> &Hand {
        &self.hands[color.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_square[color.index()]
    }

    /// ハッシュ値
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn game_ply(&self) -> u32 {
        self.game_ply
    }

    /// 探索開始局面からの手数
    #[inline]
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// 直前の指し手（開始局面では `Move::NONE`）
    #[inline]
    pub fn last_move(&self) -> Move {
        self.states[self.ply].last_move
    }

    #[inline]
    pub fn zobrist(&self) -> &Arc<Zobrist> {
        &self.zobrist
    }

    #[inline]
    pub fn state(&self) -> &StateInfo {
        &self.states[self.ply]
    }

    #[inline]
    pub(crate) fn state_mut(&mut self) -> &mut StateInfo {
        &mut self.states[self.ply]
    }

    #[inline]
    pub(crate) fn state_at(&self, ply: usize) -> &StateInfo {
        &self.states[ply]
    }

    /// `ply - 1` と `ply` の状態を同時に借りる
    pub(crate) fn state_pair_mut(&mut self, ply: usize) -> (&StateInfo, &mut StateInfo) {
        debug_assert!(ply >= 1 && ply <= self.ply);
        let (before, after) = self.states.split_at_mut(ply);
        (&before[ply - 1], &mut after[0])
    }

    /// 盤面と持ち駒からハッシュ値を計算し直す
    pub fn compute_key(&self) -> u64 {
        let z = &self.zobrist;
        let mut key = 0;
        for sq in Square::all() {
            key ^= z.psq(self.piece_on(sq), sq);
        }
        for color in Color::ALL {
            for (pt, count) in self.hand(color).iter() {
                for _ in 0..count {
                    key ^= z.hand(color, pt);
                }
            }
        }
        if self.side_to_move == Color::White {
            key ^= z.side();
        }
        key
    }

    /// 指し手で局面を進める
    ///
    /// `mv` は現局面の手番の指し手で、`captured` が盤面と一致していること。
    pub fn do_move(&mut self, mv: Move) {
        debug_assert!(!mv.is_special());
        debug_assert_eq!(mv.side(), self.side_to_move);

        let us = self.side_to_move;
        let previous_key = self.key;
        let to = mv.to();
        let z = Arc::clone(&self.zobrist);

        let dirty_piece = match mv.from() {
            None => {
                let piece = mv.piece();
                let Some(pt) = piece.piece_type() else {
                    unreachable!("drop without piece: {mv:?}");
                };
                debug_assert!(self.piece_on(to).is_empty());
                let before = self.hands[us.index()].remove(pt);
                self.key ^= z.hand(us, pt);
                self.board[to.index()] = piece;
                self.key ^= z.psq(piece, to);
                DirtyPiece {
                    moved: ChangedPiece {
                        old: PieceSlot::Hand {
                            color: us,
                            piece_type: pt,
                            count: before,
                        },
                        new: PieceSlot::Board { piece, sq: to },
                    },
                    captured: None,
                    king_moved: false,
                }
            }
            Some(from) => {
                let piece = self.piece_on(from);
                debug_assert_eq!(piece, mv.piece());
                let captured = self.piece_on(to);
                debug_assert_eq!(captured, mv.captured());

                self.board[from.index()] = Piece::EMPTY;
                self.key ^= z.psq(piece, from);

                let captured_change = match captured.piece_type() {
                    Some(captured_pt) => {
                        self.key ^= z.psq(captured, to);
                        let hand_pt = captured_pt.unpromote();
                        let after = self.hands[us.index()].add(hand_pt);
                        self.key ^= z.hand(us, hand_pt);
                        Some(ChangedPiece {
                            old: PieceSlot::Board {
                                piece: captured,
                                sq: to,
                            },
                            new: PieceSlot::Hand {
                                color: us,
                                piece_type: hand_pt,
                                count: after,
                            },
                        })
                    }
                    None => None,
                };

                let moved = if mv.is_promote() {
                    piece.promote()
                } else {
                    piece
                };
                self.board[to.index()] = moved;
                self.key ^= z.psq(moved, to);

                let king_moved = piece.piece_type() == Some(PieceType::King);
                if king_moved {
                    self.king_square[us.index()] = to;
                }
                DirtyPiece {
                    moved: ChangedPiece {
                        old: PieceSlot::Board { piece, sq: from },
                        new: PieceSlot::Board {
                            piece: moved,
                            sq: to,
                        },
                    },
                    captured: captured_change,
                    king_moved,
                }
            }
        };

        self.side_to_move = !us;
        self.key ^= z.side();
        self.game_ply += 1;

        self.ply += 1;
        if self.states.len() <= self.ply {
            self.states.push(StateInfo::root());
        }
        self.states[self.ply].reset(mv, previous_key, dirty_piece);
    }

    /// `do_move` を取り消す
    pub fn undo_move(&mut self, mv: Move) {
        debug_assert!(self.ply > 0, "undo_move at root");
        debug_assert_eq!(self.states[self.ply].last_move, mv);

        let them = self.side_to_move;
        let us = !them;
        let to = mv.to();
        let z = Arc::clone(&self.zobrist);

        self.key ^= z.side();
        self.side_to_move = us;
        self.game_ply -= 1;

        match mv.from() {
            None => {
                let piece = self.piece_on(to);
                self.board[to.index()] = Piece::EMPTY;
                self.key ^= z.psq(piece, to);
                if let Some(pt) = piece.piece_type() {
                    self.hands[us.index()].add(pt);
                    self.key ^= z.hand(us, pt);
                }
            }
            Some(from) => {
                let moved = self.piece_on(to);
                self.key ^= z.psq(moved, to);
                let piece = mv.piece();
                self.board[from.index()] = piece;
                self.key ^= z.psq(piece, from);

                let captured = mv.captured();
                self.board[to.index()] = captured;
                if let Some(captured_pt) = captured.piece_type() {
                    self.key ^= z.psq(captured, to);
                    let hand_pt = captured_pt.unpromote();
                    self.hands[us.index()].remove(hand_pt);
                    self.key ^= z.hand(us, hand_pt);
                }

                if piece.piece_type() == Some(PieceType::King) {
                    self.king_square[us.index()] = from;
                }
            }
        }

        debug_assert_eq!(self.key, self.states[self.ply].previous_key);
        self.ply -= 1;
    }
}

impl Default for Position {
    /// 既定の乱数表による平手初期局面
    fn default() -> Self {
        Position::new(Arc::new(Zobrist::default()))
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Position")
            .field("sfen", &self.to_sfen())
            .field("key", &format_args!("{:016x}", self.key))
            .field("ply", &self.ply)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::{MoveGenerator, MoveList, PseudoLegalGenerator};

    const MATSURI: &str =
        "l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w RGgsn5p 1";
    const MAX_HAND: &str = "8R/kSS1S1K2/4B4/9/9/9/9/9/3L1L1L1 b RBGSNLP3g3n17p 1";

    #[test]
    fn test_king_squares_at_startpos() {
        let pos = Position::default();
        assert_eq!(pos.king_square(Color::Black), Square::new(4, 8));
        assert_eq!(pos.king_square(Color::White), Square::new(4, 0));
        assert_eq!(pos.key(), pos.compute_key());
    }

    #[test]
    fn test_do_undo_restores_every_move() {
        for sfen in [SFEN_HIRATE, MATSURI, MAX_HAND] {
            let mut pos = Position::from_sfen(sfen).unwrap();
            let original_key = pos.key();
            let original_sfen = pos.to_sfen();
            let mut moves = MoveList::new();
            PseudoLegalGenerator.generate(&pos, &mut moves);
            assert!(!moves.is_empty(), "{sfen}");
            for &mv in moves.iter() {
                pos.do_move(mv);
                assert_eq!(pos.key(), pos.compute_key(), "{sfen} {mv}");
                assert_eq!(pos.last_move(), mv);
                pos.undo_move(mv);
                assert_eq!(pos.key(), original_key, "{sfen} {mv}");
                assert_eq!(pos.to_sfen(), original_sfen, "{sfen} {mv}");
            }
        }
    }

    #[test]
    fn test_repetition_cycle_restores_key() {
        let mut pos = Position::default();
        let start = pos.key();
        let mut played = Vec::new();
        for usi in ["5i5h", "5a5b", "5h5i", "5b5a"] {
            let mv = Move::from_usi(&pos, usi).unwrap();
            pos.do_move(mv);
            played.push(mv);
        }
        assert_eq!(pos.key(), start);
        assert_eq!(pos.ply(), 4);
        for mv in played.into_iter().rev() {
            pos.undo_move(mv);
        }
        assert_eq!(pos.ply(), 0);
    }

    #[test]
    fn test_capture_moves_piece_to_hand() {
        let mut pos = Position::from_sfen("4k4/9/9/9/4p4/4P4/9/9/4K4 b - 1").unwrap();
        let mv = Move::from_usi(&pos, "5f5e").unwrap();
        assert!(mv.is_capture());
        pos.do_move(mv);
        assert_eq!(pos.hand(Color::Black).count(PieceType::Pawn), 1);
        assert_eq!(pos.key(), pos.compute_key());
        let dirty = pos.state().dirty_piece.unwrap();
        assert_eq!(
            dirty.captured.map(|c| c.new),
            Some(PieceSlot::Hand {
                color: Color::Black,
                piece_type: PieceType::Pawn,
                count: 1,
            })
        );
        pos.undo_move(mv);
        assert!(pos.hand(Color::Black).is_empty());
    }

    #[test]
    fn test_king_move_updates_king_square() {
        let mut pos = Position::default();
        let mv = Move::from_usi(&pos, "5i4h").unwrap();
        pos.do_move(mv);
        assert_eq!(pos.king_square(Color::Black), Square::new(3, 7));
        assert!(pos.state().dirty_piece.is_some_and(|d| d.king_moved));
        pos.undo_move(mv);
        assert_eq!(pos.king_square(Color::Black), Square::new(4, 8));
    }
}
