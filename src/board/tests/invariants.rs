//! Cross-cutting board invariants: the pseudo-legal/legal relationship,
//! attack-query consistency, and full-game move sequences that exercise them.

use crate::board::movegen::{generate_legal, generate_pseudo_legal, has_legal_move, GenMode};
use crate::board::{Color, MoveType, Position, Square};

const SAMPLE_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "4r3/8/8/8/8/3N4/8/4K2k w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
];

#[test]
fn test_legal_is_filtered_pseudo_legal() {
    for fen in SAMPLE_FENS {
        let mut pos = Position::from_fen(fen).unwrap();
        let pseudo = generate_pseudo_legal(&pos, GenMode::All, pos.has_check());
        let legal = generate_legal(&mut pos, GenMode::All);

        let mut filtered = Vec::new();
        for m in &pseudo {
            if pos.is_legal_move(*m) {
                filtered.push(*m);
            }
        }
        assert_eq!(filtered.len(), legal.len(), "mismatch for {fen}");
        for m in &legal {
            assert!(filtered.iter().any(|f| f.same_move(*m)));
        }
    }
}

#[test]
fn test_has_legal_move_agrees_with_enumeration() {
    for fen in SAMPLE_FENS {
        let mut pos = Position::from_fen(fen).unwrap();
        let any = has_legal_move(&mut pos);
        let count = generate_legal(&mut pos, GenMode::All).len();
        assert_eq!(any, count > 0, "mismatch for {fen}");
    }

    // Stalemate: no legal move, not in check
    let mut stalemate = Position::from_fen("7k/5K2/6Q1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(!stalemate.has_check());
    assert!(!has_legal_move(&mut stalemate));

    // Checkmate: no legal move, in check
    let mut mated = Position::from_fen("6Qk/5K2/8/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(mated.has_check());
    assert!(!has_legal_move(&mut mated));
}

#[test]
fn test_castling_rights_round_trip() {
    let fen = "r3k2r/pbppqppp/1pn2n2/1B2p3/1b2P3/N1PP1N2/PP1BQPPP/R3K2R w KQkq -";
    let mut pos = Position::from_fen(fen).unwrap();
    let legal = generate_legal(&mut pos, GenMode::All);

    let kingside = legal
        .iter()
        .find(|m| m.is_castling() && m.to() == Square::G1)
        .copied()
        .expect("e1g1 must be legal");
    let queenside = legal
        .iter()
        .find(|m| m.is_castling() && m.to() == Square::C1)
        .copied()
        .expect("e1c1 must be legal");

    for castle in [kingside, queenside] {
        let before = pos.to_fen();
        pos.do_move(castle);
        // Rook landed next to the king and white's rights are gone
        let rook_square = if castle.to() == Square::G1 {
            Square::F1
        } else {
            Square::D1
        };
        assert_eq!(
            pos.piece_on(rook_square).map(|(_, pt)| pt),
            Some(crate::board::PieceType::Rook)
        );
        assert!(!pos.castling_rights().has_kingside(Color::White));
        assert!(!pos.castling_rights().has_queenside(Color::White));
        pos.undo_move();
        assert_eq!(pos.to_fen(), before);
    }
}

#[test]
fn test_en_passant_capture_sequence() {
    let mut pos = Position::new();
    for uci in ["e2e4", "a7a6", "e4e5", "d7d5"] {
        let m = pos.from_uci(uci).unwrap();
        pos.do_move(m);
    }
    assert_eq!(pos.en_passant_square(), Some(Square::new(5, 3)));

    let legal = generate_legal(&mut pos, GenMode::All);
    let ep = legal
        .iter()
        .find(|m| m.from() == Square::new(4, 4) && m.to() == Square::new(5, 3))
        .copied()
        .expect("e5d6 en passant must be legal");
    assert_eq!(ep.move_type(), MoveType::EnPassant);

    pos.do_move(ep);
    assert_eq!(pos.piece_on(Square::new(4, 3)), None, "captured pawn removed");
    assert_eq!(pos.en_passant_square(), None);
}

#[test]
fn test_attacks_to_counts_all_attackers() {
    // Kiwipete: d5 is attacked by the e6 pawn and both knights
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let pos = Position::from_fen(fen).unwrap();
    let d5 = Square::new(4, 3);
    let attackers = pos.attacks_to(d5, Color::Black);
    assert!(attackers.contains(Square::new(5, 4))); // e6 pawn
    assert!(attackers.contains(Square::new(5, 5))); // f6 knight
    assert!(attackers.contains(Square::new(5, 1))); // b6 knight
    assert_eq!(attackers.popcount(), 3);
}
