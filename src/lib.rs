//! Rampart: a UCI chess engine.
//!
//! Bitboard board representation with magic-bitboard slider attacks,
//! phased move generation, and an iterative-deepening PVS alpha-beta
//! search with a transposition table, running on its own worker thread
//! under cooperative cancellation.

pub mod board;
pub mod config;
pub mod eval;
pub mod history;
pub mod search;
pub mod see;
pub mod tt;
pub mod uci;
pub mod zobrist;

/// One-time process setup: build the attack tables and the Zobrist key
/// set so the first search does not pay for them.
pub fn init() {
    board::attack_tables::init();
    once_cell::sync::Lazy::force(&zobrist::ZOBRIST);
}
