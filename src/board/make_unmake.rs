//! Move execution and retraction.
//!
//! `do_move` accepts pseudo-legal moves and records whether the mover's
//! king survived; the search undoes and skips the illegal ones. Every
//! field, the Zobrist keys included, is updated incrementally and
//! restored bit-for-bit by the matching undo.

use super::position::Position;
use super::types::{Color, Move, MoveType, PieceType, Square};
use crate::zobrist::ZOBRIST;

/// Rook relocation for a castling move, derived from the king's target
/// file: g-file means the h-rook comes to f, c-file means the a-rook
/// comes to d.
#[inline]
fn rook_squares(king_to: Square) -> (Square, Square) {
    let rank = king_to.rank();
    if king_to.file() == 6 {
        (Square::new(rank, 7), Square::new(rank, 5))
    } else {
        (Square::new(rank, 0), Square::new(rank, 3))
    }
}

impl Position {
    /// Execute a pseudo-legal move.
    ///
    /// Afterwards [`Position::was_legal_move`] tells whether the move left
    /// the mover's king unattacked, and [`Position::has_check`] whether
    /// the new side to move is in check.
    ///
    /// # Panics
    /// Panics if the from-square is empty; only generator output and
    /// parsed legal moves may be passed in.
    pub fn do_move(&mut self, m: Move) {
        debug_assert!(m.is_valid());
        let us = self.side_to_move;
        let them = us.flip();
        let from = m.from();
        let to = m.to();
        let (_, moving) = self
            .piece_on(from)
            .expect("do_move from an empty square");

        let captured: Option<PieceType> = match m.move_type() {
            MoveType::EnPassant => Some(PieceType::Pawn),
            MoveType::Castling => None,
            _ => self.piece_on(to).map(|(_, pt)| pt),
        };

        self.history.push(self.snapshot(m, captured));

        let mut hash = self.zobrist;

        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant[ep.file()];
            self.en_passant = None;
        }

        if let Some(victim) = captured {
            let capture_sq = if m.is_en_passant() {
                Square::new((to.rank() as i8 - us.forward()) as usize, to.file())
            } else {
                to
            };
            self.remove_piece(capture_sq, them, victim);
            hash ^= ZOBRIST.piece(them, victim, capture_sq);
            if victim == PieceType::Pawn {
                self.pawn_zobrist ^= ZOBRIST.piece(them, PieceType::Pawn, capture_sq);
            }
        }

        self.remove_piece(from, us, moving);
        hash ^= ZOBRIST.piece(us, moving, from);
        if moving == PieceType::Pawn {
            self.pawn_zobrist ^= ZOBRIST.piece(us, PieceType::Pawn, from);
        }

        let placed = m.promotion_piece().unwrap_or(moving);
        self.set_piece(to, us, placed);
        hash ^= ZOBRIST.piece(us, placed, to);
        if placed == PieceType::Pawn {
            self.pawn_zobrist ^= ZOBRIST.piece(us, PieceType::Pawn, to);
        }

        if m.is_castling() {
            let (rook_from, rook_to) = rook_squares(to);
            self.remove_piece(rook_from, us, PieceType::Rook);
            self.set_piece(rook_to, us, PieceType::Rook);
            hash ^= ZOBRIST.piece(us, PieceType::Rook, rook_from)
                ^ ZOBRIST.piece(us, PieceType::Rook, rook_to);
        }

        let old_castling = self.castling;
        self.castling.clear_for_move(from, to);
        if self.castling != old_castling {
            hash ^= ZOBRIST.castling[old_castling.bits() as usize]
                ^ ZOBRIST.castling[self.castling.bits() as usize];
        }

        if moving == PieceType::Pawn && from.rank().abs_diff(to.rank()) == 2 {
            let ep = Square::new((from.rank() + to.rank()) / 2, from.file());
            self.en_passant = Some(ep);
            hash ^= ZOBRIST.en_passant[ep.file()];
        }

        if moving == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = them;
        hash ^= ZOBRIST.black_to_move;
        self.zobrist = hash;

        self.last_was_legal = !self.is_attacked(self.king_square(us), them);
        self.in_check = self.is_attacked(self.king_square(them), us);
    }

    /// Retract the most recent `do_move`.
    ///
    /// # Panics
    /// Panics when the history stack is empty or the top entry came from
    /// `do_null_move`; an unmatched undo is a programming error.
    pub fn undo_move(&mut self) {
        let snap = self
            .history
            .pop()
            .expect("undo_move without a prior do_move");
        assert!(snap.mv.is_valid(), "undo_move after do_null_move");

        let mv = snap.mv;
        let us = self.side_to_move.flip();
        let them = self.side_to_move;
        let from = mv.from();
        let to = mv.to();

        let (_, placed) = self.piece_on(to).expect("undo_move with empty target");
        self.remove_piece(to, us, placed);
        let original = if mv.is_promotion() {
            PieceType::Pawn
        } else {
            placed
        };
        self.set_piece(from, us, original);

        if mv.is_castling() {
            let (rook_from, rook_to) = rook_squares(to);
            self.remove_piece(rook_to, us, PieceType::Rook);
            self.set_piece(rook_from, us, PieceType::Rook);
        }

        if let Some(victim) = snap.captured {
            let capture_sq = if mv.is_en_passant() {
                Square::new((to.rank() as i8 - us.forward()) as usize, to.file())
            } else {
                to
            };
            self.set_piece(capture_sq, them, victim);
        }

        self.side_to_move = us;
        self.restore(&snap);
    }

    /// Pass the move: flip the side to move and clear the en passant
    /// square, leaving the board untouched. Used by null-move pruning.
    pub fn do_null_move(&mut self) {
        self.history.push(self.snapshot(Move::NONE, None));

        let mut hash = self.zobrist;
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant[ep.file()];
            self.en_passant = None;
        }
        self.side_to_move = self.side_to_move.flip();
        hash ^= ZOBRIST.black_to_move;
        self.zobrist = hash;

        self.last_was_legal = true;
        self.in_check = self.compute_check();
    }

    /// Retract a `do_null_move`.
    ///
    /// # Panics
    /// Panics when the stack is empty or the top entry is a real move.
    pub fn undo_null_move(&mut self) {
        let snap = self
            .history
            .pop()
            .expect("undo_null_move without a prior do_null_move");
        assert!(!snap.mv.is_valid(), "undo_null_move after do_move");
        self.side_to_move = self.side_to_move.flip();
        self.restore(&snap);
    }

    /// Whether executing the pseudo-legal move `m` leaves the mover's
    /// king unattacked. Castling additionally requires the start,
    /// pass-through and destination squares to be safe.
    #[must_use]
    pub fn is_legal_move(&mut self, m: Move) -> bool {
        if m.is_castling() {
            let them = self.side_to_move.flip();
            let mid = Square::new(m.from().rank(), (m.from().file() + m.to().file()) / 2);
            return !self.is_attacked(m.from(), them)
                && !self.is_attacked(mid, them)
                && !self.is_attacked(m.to(), them);
        }
        self.do_move(m);
        let legal = self.was_legal_move();
        self.undo_move();
        legal
    }
}
