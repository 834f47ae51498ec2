//! Random playouts exercising make/unmake and the incremental keys.

use rand::prelude::*;

use crate::board::movegen::{generate_legal, GenMode};
use crate::board::Position;

fn random_playout(seed: u64, plies: usize) {
    let mut pos = Position::new();
    let start_fen = pos.to_fen();
    let start_key = pos.zobrist();
    let start_pawn_key = pos.pawn_zobrist();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut played = 0;

    for _ in 0..plies {
        let moves = generate_legal(&mut pos, GenMode::All);
        if moves.is_empty() {
            break;
        }
        let m = moves[rng.gen_range(0..moves.len())];
        pos.do_move(m);
        played += 1;

        assert!(pos.was_legal_move());
        assert_eq!(pos.zobrist(), pos.compute_zobrist(), "key drift after {m}");
        assert_eq!(
            pos.pawn_zobrist(),
            pos.compute_pawn_zobrist(),
            "pawn key drift after {m}"
        );
    }

    for _ in 0..played {
        pos.undo_move();
    }

    assert_eq!(pos.to_fen(), start_fen);
    assert_eq!(pos.zobrist(), start_key);
    assert_eq!(pos.pawn_zobrist(), start_pawn_key);
    assert_eq!(pos.ply_count(), 0);
}

#[test]
fn test_random_playouts_round_trip() {
    for seed in 0..8 {
        random_playout(0xC0FFEE + seed, 120);
    }
}

#[test]
fn test_playout_from_tactical_position() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut pos = Position::from_fen(fen).unwrap();
    let start_fen = pos.to_fen();
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut played = 0;

    for _ in 0..80 {
        let moves = generate_legal(&mut pos, GenMode::All);
        if moves.is_empty() {
            break;
        }
        let m = moves[rng.gen_range(0..moves.len())];
        pos.do_move(m);
        played += 1;
        assert_eq!(pos.zobrist(), pos.compute_zobrist());
    }
    for _ in 0..played {
        pos.undo_move();
    }
    assert_eq!(pos.to_fen(), start_fen);
}

#[test]
fn test_null_moves_interleaved_with_moves() {
    let mut pos = Position::new();
    let before = pos.to_fen();
    let key = pos.zobrist();

    let e4 = pos.from_uci("e2e4").unwrap();
    pos.do_move(e4);
    // Null move hands the turn back to white
    pos.do_null_move();
    let nf3 = pos.from_uci("g1f3").unwrap();
    pos.do_move(nf3);

    pos.undo_move();
    pos.undo_null_move();
    pos.undo_move();

    assert_eq!(pos.to_fen(), before);
    assert_eq!(pos.zobrist(), key);
}
