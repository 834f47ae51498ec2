//! Property tests over random legal move sequences.

use proptest::prelude::*;

use crate::board::movegen::{generate_legal, generate_pseudo_legal, GenMode};
use crate::board::{MoveGenerator, Position};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Any sequence of legal moves keeps the incremental Zobrist key in
    /// agreement with a from-scratch recomputation, and fully unwinds.
    #[test]
    fn prop_playout_keys_and_round_trip(choices in prop::collection::vec(0usize..512, 0..40)) {
        let mut pos = Position::new();
        let start_fen = pos.to_fen();
        let mut played = 0;

        for pick in choices {
            let moves = generate_legal(&mut pos, GenMode::All);
            if moves.is_empty() {
                break;
            }
            pos.do_move(moves[pick % moves.len()]);
            played += 1;
            prop_assert_eq!(pos.zobrist(), pos.compute_zobrist());
            prop_assert_eq!(pos.pawn_zobrist(), pos.compute_pawn_zobrist());
        }
        for _ in 0..played {
            pos.undo_move();
        }
        prop_assert_eq!(pos.to_fen(), start_fen);
    }

    /// The phased generator yields exactly the batched pseudo-legal set
    /// in any reachable position.
    #[test]
    fn prop_phased_matches_batched(choices in prop::collection::vec(0usize..512, 0..24)) {
        let mut pos = Position::new();
        for pick in choices {
            let moves = generate_legal(&mut pos, GenMode::All);
            if moves.is_empty() {
                break;
            }
            pos.do_move(moves[pick % moves.len()]);
        }

        let batched = generate_pseudo_legal(&pos, GenMode::All, pos.has_check());
        let mut generator = MoveGenerator::new();
        let mut count = 0;
        loop {
            let m = generator.next(&pos, GenMode::All, pos.has_check(), None);
            if !m.is_valid() {
                break;
            }
            prop_assert!(batched.contains(m), "phased emitted {} not in batch", m);
            count += 1;
        }
        prop_assert_eq!(count, batched.len());
    }

    /// FEN round-trips through any reachable position.
    #[test]
    fn prop_fen_round_trip(choices in prop::collection::vec(0usize..512, 0..30)) {
        let mut pos = Position::new();
        for pick in choices {
            let moves = generate_legal(&mut pos, GenMode::All);
            if moves.is_empty() {
                break;
            }
            pos.do_move(moves[pick % moves.len()]);
        }
        let fen = pos.to_fen();
        let reparsed = Position::from_fen(&fen).unwrap();
        prop_assert_eq!(reparsed.to_fen(), fen);
        prop_assert_eq!(reparsed.zobrist(), pos.zobrist());
    }
}
