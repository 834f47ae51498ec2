//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position fingerprints for the
//! transposition table, plus a pawn-structure key maintained alongside.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{Color, PieceType, Square};

pub struct ZobristKeys {
    /// piece[color][piece_type][square]
    pub pieces: [[[u64; 64]; 6]; 2],
    /// One random per castling-rights combination, so an update is
    /// `hash ^= castling[before] ^ castling[after]`.
    pub castling: [u64; 16],
    /// en_passant[file]; only the file of the target square matters.
    pub en_passant: [u64; 8],
    pub black_to_move: u64,
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed keeps keys reproducible across runs and platforms.
        let mut rng = StdRng::seed_from_u64(0x00C0_FFEE_5EED_0001);
        let mut pieces = [[[0u64; 64]; 6]; 2];
        for color in &mut pieces {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let mut castling = [0u64; 16];
        // No rights hashes to zero so an empty-rights position needs no term.
        for key in castling.iter_mut().skip(1) {
            *key = rng.gen();
        }

        let mut en_passant = [0u64; 8];
        for key in &mut en_passant {
            *key = rng.gen();
        }

        ZobristKeys {
            pieces,
            castling,
            en_passant,
            black_to_move: rng.gen(),
        }
    }

    #[inline]
    #[must_use]
    pub fn piece(&self, color: Color, pt: PieceType, sq: Square) -> u64 {
        self.pieces[color.index()][pt.index()][sq.index()]
    }
}

pub static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);
