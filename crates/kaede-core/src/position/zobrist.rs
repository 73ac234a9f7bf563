//! Zobrist ハッシュ
//!
//! 乱数表は固定シードから生成するので、同じシードなら実行ごとに同じ値になる。
//! 局面は `Arc<Zobrist>` を共有して使う。

use rand::RngCore;
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use crate::types::{Color, Piece, PieceType, Square};

/// Zobrist ハッシュ用乱数テーブル
pub struct Zobrist {
    /// 駒×升 [Piece.index()][Square.index()]
    psq: [[u64; Square::NUM]; Piece::NUM],
    /// 手駒 [Color][hand_index]
    hand: [[u64; 7]; Color::NUM],
    /// 手番（後手番のとき XOR する）
    side: u64,
}

impl Zobrist {
    pub const DEFAULT_SEED: u64 = 0x6b61_6564_655f_7a62;

    pub fn new(seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        // 最下位ビットは手番キー専用。他のキーで立てると XOR で手番と混ざる
        let mut next = || rng.next_u64() & !1;

        let mut psq = [[0; Square::NUM]; Piece::NUM];
        for row in psq.iter_mut().skip(1) {
            for key in row.iter_mut() {
                *key = next();
            }
        }
        let mut hand = [[0; 7]; Color::NUM];
        for row in hand.iter_mut() {
            for key in row.iter_mut() {
                *key = next();
            }
        }

        Zobrist { psq, hand, side: 1 }
    }

    /// 盤上の駒のキー（空の升は0）
    #[inline]
    pub fn psq(&self, piece: Piece, sq: Square) -> u64 {
        self.psq[piece.index()][sq.index()]
    }

    /// 持ち駒1枚分のキー
    #[inline]
    pub fn hand(&self, color: Color, pt: PieceType) -> u64 {
        pt.hand_index().map_or(0, |i| self.hand[color.index()][i])
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.side
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Zobrist::new(Self::DEFAULT_SEED)
    }
}
