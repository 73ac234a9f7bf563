//! SFEN形式の解析・出力

use thiserror::Error;

use super::{Position, StateInfo};
use crate::types::{Color, Hand, Piece, PieceType, Square};

/// 平手初期局面のSFEN
pub const SFEN_HIRATE: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// SFENパースエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SfenError {
    #[error("invalid board: {0}")]
    Board(String),
    #[error("invalid side to move: {0}")]
    SideToMove(String),
    #[error("invalid hand: {0}")]
    Hand(String),
    #[error("invalid ply: {0}")]
    Ply(String),
    #[error("missing {0:?} king")]
    MissingKing(Color),
}

/// 持ち駒の出力順
const HAND_ORDER: [PieceType; 7] = [
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Gold,
    PieceType::Silver,
    PieceType::Knight,
    PieceType::Lance,
    PieceType::Pawn,
];

impl Position {
    /// SFEN文字列から局面を設定（失敗したときは元の局面のまま）
    ///
    /// `startpos` も受け付ける。探索開始局面として手数ごとの状態はリセットされる。
    pub fn set_sfen(&mut self, sfen: &str) -> Result<(), SfenError> {
        let sfen = match sfen.trim() {
            "startpos" => SFEN_HIRATE,
            s => s.strip_prefix("sfen ").unwrap_or(s),
        };
        let parts: Vec<&str> = sfen.split_whitespace().collect();
        if parts.len() < 3 {
            let message = format!("expected at least 3 fields: {sfen:?}");
            return Err(SfenError::Board(message));
        }

        let mut board = [Piece::EMPTY; Square::NUM];
        let mut kings: [Option<Square>; Color::NUM] = [None; Color::NUM];
        parse_board(parts[0], &mut board, &mut kings)?;

        let side_to_move = match parts[1] {
            "b" => Color::Black,
            "w" => Color::White,
            other => return Err(SfenError::SideToMove(other.to_string())),
        };

        let hands = parse_hands(parts[2])?;

        let game_ply = match parts.get(3) {
            Some(s) => s.parse().map_err(|_| SfenError::Ply(s.to_string()))?,
            None => 1,
        };

        let black_king = kings[Color::Black.index()]
            .ok_or(SfenError::MissingKing(Color::Black))?;
        let white_king = kings[Color::White.index()]
            .ok_or(SfenError::MissingKing(Color::White))?;

        self.board = board;
        self.hands = hands;
        self.side_to_move = side_to_move;
        self.king_square = [black_king, white_king];
        self.game_ply = game_ply;
        self.ply = 0;
        self.states.truncate(1);
        self.states[0] = StateInfo::root();
        self.key = self.compute_key();
        Ok(())
    }

    /// 現局面のSFEN文字列
    pub fn to_sfen(&self) -> String {
        let mut result = String::new();

        for rank in 0..9 {
            let mut empty = 0;
            for file in (0..9).rev() {
                let piece = self.piece_on(Square::new(file, rank));
                if piece.is_empty() {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    result.push_str(&empty.to_string());
                    empty = 0;
                }
                result.push_str(&piece.to_string());
            }
            if empty > 0 {
                result.push_str(&empty.to_string());
            }
            if rank < 8 {
                result.push('/');
            }
        }

        result.push(' ');
        result.push(match self.side_to_move {
            Color::Black => 'b',
            Color::White => 'w',
        });

        result.push(' ');
        let mut hand = String::new();
        for color in Color::ALL {
            for pt in HAND_ORDER {
                let count = self.hand(color).count(pt);
                if count == 0 {
                    continue;
                }
                if count > 1 {
                    hand.push_str(&count.to_string());
                }
                hand.push_str(&Piece::new(color, pt).to_string());
            }
        }
        if hand.is_empty() {
            hand.push('-');
        }
        result.push_str(&hand);

        result.push(' ');
        result.push_str(&self.game_ply.to_string());
        result
    }
}

fn parse_board(
    text: &str,
    board: &mut [Piece; Square::NUM],
    kings: &mut [Option<Square>; Color::NUM],
) -> Result<(), SfenError> {
    let rows: Vec<&str> = text.split('/').collect();
    if rows.len() != 9 {
        return Err(SfenError::Board(format!("expected 9 ranks: {text:?}")));
    }

    for (rank, row) in rows.iter().enumerate() {
        // 左端が9筋
        let mut file: i32 = 8;
        let mut promoted = false;
        for c in row.chars() {
            if c == '+' {
                promoted = true;
                continue;
            }
            if let Some(n) = c.to_digit(10) {
                if promoted || n == 0 {
                    return Err(SfenError::Board(format!("unexpected {c:?} in {row:?}")));
                }
                file -= n as i32;
                continue;
            }
            if file < 0 {
                return Err(SfenError::Board(format!("rank too long: {row:?}")));
            }
            let piece = Piece::from_sfen(c, promoted)
                .ok_or_else(|| SfenError::Board(format!("unknown piece {c:?} in {row:?}")))?;
            promoted = false;
            let sq = Square::new(file as u8, rank as u8);
            if piece.piece_type() == Some(PieceType::King) {
                let slot = &mut kings[piece.color().index()];
                if slot.is_some() {
                    return Err(SfenError::Board(format!("two {:?} kings", piece.color())));
                }
                *slot = Some(sq);
            }
            board[sq.index()] = piece;
            file -= 1;
        }
        if file != -1 || promoted {
            return Err(SfenError::Board(format!("rank width is not 9: {row:?}")));
        }
    }
    Ok(())
}

fn parse_hands(text: &str) -> Result<[Hand; Color::NUM], SfenError> {
    let mut hands = [Hand::EMPTY; Color::NUM];
    if text == "-" {
        return Ok(hands);
    }

    let mut count: u32 = 0;
    for c in text.chars() {
        if let Some(n) = c.to_digit(10) {
            count = count * 10 + n;
            if count > 18 {
                return Err(SfenError::Hand(text.to_string()));
            }
            continue;
        }
        let piece = Piece::from_sfen(c, false)
            .filter(|p| p.piece_type().is_some_and(|pt| pt != PieceType::King))
            .ok_or_else(|| SfenError::Hand(text.to_string()))?;
        let Some(pt) = piece.piece_type() else {
            return Err(SfenError::Hand(text.to_string()));
        };
        let n = if count == 0 { 1 } else { count };
        let hand = &mut hands[piece.color().index()];
        let total = hand.count(pt) as u32 + n;
        if total > pt.max_hand_count() as u32 {
            return Err(SfenError::Hand(text.to_string()));
        }
        hand.set(pt, total as u8);
        count = 0;
    }
    if count != 0 {
        return Err(SfenError::Hand(text.to_string()));
    }
    Ok(hands)
}
