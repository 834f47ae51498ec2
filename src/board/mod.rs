//! Board representation and move generation.
//!
//! Bitboard position with make/unmake, incremental Zobrist hashing,
//! attack queries, and batched or phased pseudo-legal and legal move
//! enumeration.
//!
//! # Example
//! ```
//! use rampart::board::{movegen, GenMode, Position};
//!
//! let mut pos = Position::new();
//! let moves = movegen::generate_legal(&mut pos, GenMode::All);
//! assert_eq!(moves.len(), 20);
//! ```

pub mod attack_tables;
mod error;
pub mod fen;
mod make_unmake;
pub mod movegen;
mod picker;
mod position;
mod pst;
pub mod perft;
mod san;
mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, SanError, SquareError};
pub use movegen::GenMode;
pub use picker::MoveGenerator;
pub use position::{Position, GAME_PHASE_MAX};
pub use types::{
    is_mate_value, mate_distance, mate_in, mated_in, Bitboard, CastlingRights, Color, Move,
    MoveList, MoveType, PieceType, Square, Value, MAX_PLY, PIECE_TYPES, PROMOTION_PIECES,
    VALUE_DRAW, VALUE_INFINITE, VALUE_MATE, VALUE_MATE_THRESHOLD, VALUE_NA,
};
