//! 16bit 形式の指し手
//!
//! ```text
//! bit  0..=6  移動先の升
//! bit  7..=13 移動元の升（駒打ちなら打った駒の値）
//! bit 14      駒打ちフラグ
//! bit 15      成りフラグ
//! ```

use super::Move;
use crate::position::Position;
use crate::types::{Piece, Square};

const SQUARE_MASK: u16 = 0x7f;
const DROP_BIT: u16 = 1 << 14;
const PROMOTE_BIT: u16 = 1 << 15;

/// 置換表に保存する16bitの指し手
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Move16(u16);

impl Move16 {
    /// 移動元 == 移動先 の形は実際の指し手に現れないので特殊な指し手に使う
    pub const RESIGN: Move16 = Move16((2 << 7) | 2);
    pub const WIN: Move16 = Move16((3 << 7) | 3);
    pub const NONE: Move16 = Move16((4 << 7) | 4);

    #[inline]
    pub const fn from_raw(raw: u16) -> Move16 {
        Move16(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    pub fn from_move(mv: Move) -> Move16 {
        if mv == Move::RESIGN {
            return Move16::RESIGN;
        }
        if mv == Move::WIN {
            return Move16::WIN;
        }
        if mv.is_special() {
            return Move16::NONE;
        }
        let to = mv.to().raw() as u16;
        let (from, drop) = match mv.from() {
            Some(from) => (from.raw() as u16, 0),
            None => (mv.piece().raw() as u16, DROP_BIT),
        };
        let promote = if mv.is_promote() { PROMOTE_BIT } else { 0 };
        Move16(to | (from << 7) | drop | promote)
    }

    #[inline]
    pub const fn is_drop(self) -> bool {
        self.0 & DROP_BIT != 0
    }

    #[inline]
    pub const fn is_promote(self) -> bool {
        self.0 & PROMOTE_BIT != 0
    }

    /// 局面を使って正規形に戻す
    ///
    /// 盤面と矛盾する値（空の升から動かす、手番でない駒を動かす、埋まった升に打つ等）は None。
    pub fn to_move(self, pos: &Position) -> Option<Move> {
        match self {
            Move16::RESIGN => return Some(Move::RESIGN),
            Move16::WIN => return Some(Move::WIN),
            Move16::NONE => return Some(Move::NONE),
            _ => {}
        }

        let to = Square::from_index((self.0 & SQUARE_MASK) as usize)?;
        let from_bits = ((self.0 >> 7) & SQUARE_MASK) as u8;
        let captured = pos.piece_on(to);

        if self.is_drop() {
            let piece = Piece::from_raw(from_bits)?;
            let pt = piece.piece_type()?;
            if self.is_promote() || !piece.is_color(pos.side_to_move()) || !captured.is_empty() {
                return None;
            }
            // 打てるのは持ち駒にある成る前の駒だけ
            if pt.is_promoted() || pos.hand(piece.color()).count(pt) == 0 {
                return None;
            }
            return Some(Move::drop(piece.color(), pt, to));
        }

        let from = Square::from_index(from_bits as usize)?;
        if from == to {
            return None;
        }
        let piece = pos.piece_on(from);
        if !piece.is_color(pos.side_to_move()) || captured.is_color(pos.side_to_move()) {
            return None;
        }
        Some(Move::normal(from, to, piece, captured, self.is_promote()))
    }
}
