//! 駒種（PieceType）と駒（Piece）

use std::fmt;

use super::Color;

/// 駒種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 1,
    Lance = 2,
    Knight = 3,
    Silver = 4,
    Bishop = 5,
    Rook = 6,
    Gold = 7,
    King = 8,
    ProPawn = 9,
    ProLance = 10,
    ProKnight = 11,
    ProSilver = 12,
    Horse = 13,
    Dragon = 14,
}

impl PieceType {
    /// 持ち駒になる駒種（`hand_index` の順）
    pub const HAND_KINDS: [PieceType; 7] = [
        PieceType::Pawn,
        PieceType::Lance,
        PieceType::Knight,
        PieceType::Silver,
        PieceType::Gold,
        PieceType::Bishop,
        PieceType::Rook,
    ];

    #[inline]
    pub const fn from_u8(v: u8) -> Option<PieceType> {
        Some(match v {
            1 => PieceType::Pawn,
            2 => PieceType::Lance,
            3 => PieceType::Knight,
            4 => PieceType::Silver,
            5 => PieceType::Bishop,
            6 => PieceType::Rook,
            7 => PieceType::Gold,
            8 => PieceType::King,
            9 => PieceType::ProPawn,
            10 => PieceType::ProLance,
            11 => PieceType::ProKnight,
            12 => PieceType::ProSilver,
            13 => PieceType::Horse,
            14 => PieceType::Dragon,
            _ => return None,
        })
    }

    #[inline]
    pub const fn is_promoted(self) -> bool {
        self as u8 >= PieceType::ProPawn as u8
    }

    /// 成れる駒種か（歩・香・桂・銀・角・飛）
    #[inline]
    pub const fn can_promote(self) -> bool {
        self as u8 <= PieceType::Rook as u8
    }

    /// 成った駒種（成れない駒種は None）
    #[inline]
    pub const fn promote(self) -> Option<PieceType> {
        if self.can_promote() {
            PieceType::from_u8(self as u8 + 8)
        } else {
            None
        }
    }

    /// 成る前の駒種
    #[inline]
    pub const fn unpromote(self) -> PieceType {
        if self.is_promoted() {
            match PieceType::from_u8(self as u8 - 8) {
                Some(pt) => pt,
                None => self,
            }
        } else {
            self
        }
    }

    /// 持ち駒配列のインデックス（玉は None、成駒は成る前の駒種で数える）
    #[inline]
    pub const fn hand_index(self) -> Option<usize> {
        match self.unpromote() {
            PieceType::Pawn => Some(0),
            PieceType::Lance => Some(1),
            PieceType::Knight => Some(2),
            PieceType::Silver => Some(3),
            PieceType::Gold => Some(4),
            PieceType::Bishop => Some(5),
            PieceType::Rook => Some(6),
            _ => None,
        }
    }

    /// 持ち駒として持てる最大枚数（持ち駒にならない駒種は0）
    #[inline]
    pub const fn max_hand_count(self) -> u8 {
        match self {
            PieceType::Pawn => 18,
            PieceType::Lance | PieceType::Knight | PieceType::Silver | PieceType::Gold => 4,
            PieceType::Bishop | PieceType::Rook => 2,
            _ => 0,
        }
    }

    /// USI/SFEN の駒文字（成駒は成る前の文字）
    pub const fn usi_char(self) -> char {
        match self.unpromote() {
            PieceType::Pawn => 'P',
            PieceType::Lance => 'L',
            PieceType::Knight => 'N',
            PieceType::Silver => 'S',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Gold => 'G',
            _ => 'K',
        }
    }

    /// 大文字の駒文字から駒種
    pub const fn from_usi_char(c: char) -> Option<PieceType> {
        Some(match c {
            'P' => PieceType::Pawn,
            'L' => PieceType::Lance,
            'N' => PieceType::Knight,
            'S' => PieceType::Silver,
            'B' => PieceType::Bishop,
            'R' => PieceType::Rook,
            'G' => PieceType::Gold,
            'K' => PieceType::King,
            _ => return None,
        })
    }
}

/// 駒（手番付き）
///
/// 0 が空、先手は駒種の値そのまま、後手は +16。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    pub const EMPTY: Piece = Piece(0);
    /// 駒の値の上限（配列サイズ用）
    pub const NUM: usize = 31;

    const WHITE_BIT: u8 = 16;

    #[inline]
    pub const fn new(color: Color, piece_type: PieceType) -> Piece {
        match color {
            Color::Black => Piece(piece_type as u8),
            Color::White => Piece(piece_type as u8 | Self::WHITE_BIT),
        }
    }

    /// 生の値から作成（駒として不正な値は None）
    #[inline]
    pub const fn from_raw(raw: u8) -> Option<Piece> {
        if raw == 0 {
            return Some(Piece::EMPTY);
        }
        if raw & !(Self::WHITE_BIT | 0x0f) != 0 {
            return None;
        }
        match PieceType::from_u8(raw & 0x0f) {
            Some(_) => Some(Piece(raw)),
            None => None,
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 手番（空の升では Black を返すので呼び出し側で `is_empty` を確認すること）
    #[inline]
    pub const fn color(self) -> Color {
        if self.0 & Self::WHITE_BIT != 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline]
    pub const fn piece_type(self) -> Option<PieceType> {
        PieceType::from_u8(self.0 & 0x0f)
    }

    #[inline]
    pub const fn is_color(self, color: Color) -> bool {
        !self.is_empty() && self.color() as u8 == color as u8
    }

    /// 成った駒（成れない駒はそのまま）
    #[inline]
    pub const fn promote(self) -> Piece {
        match self.piece_type() {
            Some(pt) => match pt.promote() {
                Some(promoted) => Piece::new(self.color(), promoted),
                None => self,
            },
            None => self,
        }
    }

    /// SFEN の1文字（成駒は `+` が前置される）
    pub fn from_sfen(c: char, promoted: bool) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::Black
        } else {
            Color::White
        };
        let pt = PieceType::from_usi_char(c.to_ascii_uppercase())?;
        let pt = if promoted { pt.promote()? } else { pt };
        Some(Piece::new(color, pt))
    }
}

impl fmt::Display for Piece {
    /// SFEN 表記（例: `P`, `+r`）。空の升は `.`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(pt) = self.piece_type() else {
            return f.write_str(".");
        };
        if pt.is_promoted() {
            f.write_str("+")?;
        }
        let c = pt.usi_char();
        match self.color() {
            Color::Black => write!(f, "{c}"),
            Color::White => write!(f, "{}", c.to_ascii_lowercase()),
        }
    }
}
