//! USI 形式の指し手文字列

use thiserror::Error;

use super::Move;
use crate::position::Position;
use crate::types::{PieceType, Square};

/// USI 指し手文字列の解析エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsiMoveError {
    #[error("empty move string")]
    Empty,
    #[error("invalid move length: {0:?}")]
    InvalidLength(String),
    #[error("invalid square in move: {0:?}")]
    InvalidSquare(String),
    #[error("unknown drop piece in move: {0:?}")]
    UnknownPiece(String),
    #[error("no piece to move at {square} in {text:?}")]
    EmptyOrigin { square: Square, text: String },
}

impl Move {
    /// USI 文字列（例: `7g7f`, `8h2b+`, `P*5e`, `resign`）
    pub fn to_usi(self) -> String {
        if self == Move::RESIGN {
            return "resign".to_string();
        }
        if self == Move::WIN {
            return "win".to_string();
        }
        if self.is_special() {
            return "none".to_string();
        }

        let mut s = String::with_capacity(5);
        match self.from() {
            Some(from) => s.push_str(&from.to_string()),
            None => {
                let pt = self.piece().piece_type().unwrap_or(PieceType::Pawn);
                s.push(pt.usi_char());
                s.push('*');
            }
        }
        s.push_str(&self.to().to_string());
        if self.is_promote() {
            s.push('+');
        }
        s
    }

    /// USI 文字列を解析する
    ///
    /// 動かす駒と取る駒は局面から補う。手番は局面の手番。
    pub fn from_usi(pos: &Position, text: &str) -> Result<Move, UsiMoveError> {
        match text {
            "" => return Err(UsiMoveError::Empty),
            "resign" => return Ok(Move::RESIGN),
            "win" => return Ok(Move::WIN),
            "none" => return Ok(Move::NONE),
            _ => {}
        }

        let bytes = text.as_bytes();
        let promote = match bytes.len() {
            4 => false,
            5 if bytes[4] == b'+' => true,
            _ => return Err(UsiMoveError::InvalidLength(text.to_string())),
        };
        let to = Square::from_usi(bytes[2], bytes[3])
            .ok_or_else(|| UsiMoveError::InvalidSquare(text.to_string()))?;

        if bytes[1] == b'*' {
            let pt = PieceType::from_usi_char(bytes[0] as char)
                .filter(|pt| pt.hand_index().is_some() && !pt.is_promoted())
                .ok_or_else(|| UsiMoveError::UnknownPiece(text.to_string()))?;
            if promote {
                return Err(UsiMoveError::InvalidLength(text.to_string()));
            }
            return Ok(Move::drop(pos.side_to_move(), pt, to));
        }

        let from = Square::from_usi(bytes[0], bytes[1])
            .ok_or_else(|| UsiMoveError::InvalidSquare(text.to_string()))?;
        let piece = pos.piece_on(from);
        if piece.is_empty() {
            return Err(UsiMoveError::EmptyOrigin {
                square: from,
                text: text.to_string(),
            });
        }
        Ok(Move::normal(from, to, piece, pos.piece_on(to), promote))
    }
}
