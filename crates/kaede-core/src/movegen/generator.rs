use super::{MoveGenerator, MoveList};
use crate::moves::Move;
use crate::position::{Position, oriented, slide_directions, step_directions};
use crate::types::{Color, Piece, PieceType, Square};

/// 疑似合法手の生成器
///
/// 盤上の駒の移動（成り・不成）と駒打ちを生成する。行き所のない駒と二歩は生成しない。
/// 打ち歩詰めと自玉の王手放置は判定しない。
#[derive(Debug, Clone, Copy, Default)]
pub struct PseudoLegalGenerator;

impl MoveGenerator for PseudoLegalGenerator {
    fn generate(&self, pos: &Position, list: &mut MoveList) {
        generate_board_moves(pos, list, false);
        generate_drops(pos, list);
    }
}

/// 駒を取る指し手だけを生成する
pub fn generate_captures(pos: &Position, list: &mut MoveList) {
    generate_board_moves(pos, list, true);
}

fn generate_board_moves(pos: &Position, list: &mut MoveList, captures_only: bool) {
    let us = pos.side_to_move();
    for from in Square::all() {
        let piece = pos.piece_on(from);
        if !piece.is_color(us) {
            continue;
        }
        let Some(pt) = piece.piece_type() else {
            continue;
        };

        for &dir in step_directions(pt) {
            let (df, dr) = oriented(dir, us);
            if let Some(to) = from.offset(df, dr) {
                push_board_move(pos, list, from, to, piece, pt, captures_only);
            }
        }
        for &dir in slide_directions(pt) {
            let (df, dr) = oriented(dir, us);
            let mut cur = from;
            while let Some(to) = cur.offset(df, dr) {
                let target = pos.piece_on(to);
                if target.is_color(us) {
                    break;
                }
                push_board_move(pos, list, from, to, piece, pt, captures_only);
                if !target.is_empty() {
                    break;
                }
                cur = to;
            }
        }
    }
}

fn push_board_move(
    pos: &Position,
    list: &mut MoveList,
    from: Square,
    to: Square,
    piece: Piece,
    pt: PieceType,
    captures_only: bool,
) {
    let us = piece.color();
    let captured = pos.piece_on(to);
    if captured.is_color(us) || (captures_only && captured.is_empty()) {
        return;
    }

    let in_zone = from.is_promotion_zone(us) || to.is_promotion_zone(us);
    if pt.can_promote() && in_zone {
        list.push(Move::normal(from, to, piece, captured, true));
        if !must_promote(pt, to, us) {
            list.push(Move::normal(from, to, piece, captured, false));
        }
    } else {
        list.push(Move::normal(from, to, piece, captured, false));
    }
}

/// 成らないと行き所がなくなるか（打つ場合も同じ条件で打てない）
#[inline]
fn must_promote(pt: PieceType, to: Square, us: Color) -> bool {
    let rank = to.relative_rank(us);
    match pt {
        PieceType::Pawn | PieceType::Lance => rank == 0,
        PieceType::Knight => rank <= 1,
        _ => false,
    }
}

fn generate_drops(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let hand = pos.hand(us);
    if hand.is_empty() {
        return;
    }

    // 歩のある筋
    let own_pawn = Piece::new(us, PieceType::Pawn);
    let mut pawn_files = [false; 9];
    for sq in Square::all() {
        if pos.piece_on(sq) == own_pawn {
            pawn_files[sq.file() as usize] = true;
        }
    }

    for (pt, _) in hand.iter() {
        for to in Square::all() {
            if !pos.piece_on(to).is_empty() || must_promote(pt, to, us) {
                continue;
            }
            if pt == PieceType::Pawn && pawn_files[to.file() as usize] {
                continue;
            }
            list.push(Move::drop(us, pt, to));
        }
    }
}
