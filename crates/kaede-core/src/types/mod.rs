//! 基本型

mod bound;
mod color;
mod hand;
mod piece;
mod square;
mod value;

pub use bound::Bound;
pub use color::Color;
pub use hand::Hand;
pub use piece::{Piece, PieceType};
pub use square::Square;
pub use value::Value;

/// 探索の最大手数
pub const MAX_PLY: i32 = 128;
