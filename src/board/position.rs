//! Mutable board state with make/unmake history.

use super::attack_tables::{get_attacks, pawn_attacks};
use super::types::{
    Bitboard, CastlingRights, Color, Move, PieceType, Square, Value, PIECE_TYPES,
};
use crate::zobrist::ZOBRIST;

/// Upper bound of the game-phase accumulator: 4 minors + 2 rook weights +
/// 1 queen weight per side.
pub const GAME_PHASE_MAX: i32 = 24;

/// Saved state for one ply, enough to restore the position bit-for-bit.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub(crate) zobrist: u64,
    pawn_zobrist: u64,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    pub(crate) captured: Option<PieceType>,
    pub(crate) mv: Move,
    in_check: bool,
    was_legal: bool,
    material: [Value; 2],
    psq_mg: [Value; 2],
    psq_eg: [Value; 2],
    phase: [i32; 2],
}

/// A chess position.
///
/// Mutated only through `do_move` / `do_null_move` and their undo
/// counterparts; every mutation pushes a [`Snapshot`] so undo restores
/// all fields exactly, Zobrist key included.
#[derive(Clone, Debug)]
pub struct Position {
    pub(crate) squares: [Option<(Color, PieceType)>; 64],
    pub(crate) piece_bb: [[Bitboard; 6]; 2],
    pub(crate) occupied_bb: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) zobrist: u64,
    pub(crate) pawn_zobrist: u64,
    pub(crate) material: [Value; 2],
    pub(crate) psq_mg: [Value; 2],
    pub(crate) psq_eg: [Value; 2],
    pub(crate) phase: [i32; 2],
    pub(crate) in_check: bool,
    pub(crate) last_was_legal: bool,
    pub(crate) history: Vec<Snapshot>,
}

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_fen(super::fen::START_FEN).expect("start position FEN is valid")
    }

    pub(crate) fn empty() -> Self {
        Position {
            squares: [None; 64],
            piece_bb: [[Bitboard::EMPTY; 6]; 2],
            occupied_bb: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            zobrist: 0,
            pawn_zobrist: 0,
            material: [0; 2],
            psq_mg: [0; 2],
            psq_eg: [0; 2],
            phase: [0; 2],
            in_check: false,
            last_was_legal: true,
            history: Vec::with_capacity(64),
        }
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    #[must_use]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Position fingerprint.
    #[inline]
    #[must_use]
    pub fn zobrist(&self) -> u64 {
        self.zobrist
    }

    /// Fingerprint over pawns only.
    #[inline]
    #[must_use]
    pub fn pawn_zobrist(&self) -> u64 {
        self.pawn_zobrist
    }

    #[inline]
    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Option<(Color, PieceType)> {
        self.squares[sq.index()]
    }

    /// Bitboard of one piece type of one color.
    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, pt: PieceType) -> Bitboard {
        self.piece_bb[color.index()][pt.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self, color: Color) -> Bitboard {
        self.occupied_bb[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn all_occupied(&self) -> Bitboard {
        self.all_occupied
    }

    /// The king square. Each side has exactly one king.
    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        debug_assert!(!self.pieces(color, PieceType::King).is_empty());
        self.pieces(color, PieceType::King).lsb()
    }

    /// Whether the side to move is in check. Cached by do/undo.
    #[inline]
    #[must_use]
    pub fn has_check(&self) -> bool {
        self.in_check
    }

    /// Whether the last `do_move` left the mover's own king safe. A
    /// pseudo-legal move that fails this must be undone and skipped.
    #[inline]
    #[must_use]
    pub fn was_legal_move(&self) -> bool {
        self.last_was_legal
    }

    /// The move that produced this position, if any.
    #[inline]
    #[must_use]
    pub fn last_move(&self) -> Move {
        self.history.last().map_or(Move::NONE, |s| s.mv)
    }

    /// Plies recorded on the history stack.
    #[inline]
    #[must_use]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    #[inline]
    #[must_use]
    pub fn material(&self, color: Color) -> Value {
        self.material[color.index()]
    }

    /// Material excluding pawns and the king; the null-move guard.
    #[must_use]
    pub fn non_pawn_material(&self, color: Color) -> Value {
        let c = color.index();
        self.material[c]
            - PieceType::King.value()
            - self.piece_bb[c][PieceType::Pawn.index()].popcount() as Value * PieceType::Pawn.value()
    }

    #[inline]
    #[must_use]
    pub fn psq_mg(&self, color: Color) -> Value {
        self.psq_mg[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn psq_eg(&self, color: Color) -> Value {
        self.psq_eg[color.index()]
    }

    /// Game phase in `[0, GAME_PHASE_MAX]`: 24 at the start, 0 once only
    /// kings and pawns remain.
    #[inline]
    #[must_use]
    pub fn game_phase(&self) -> i32 {
        (self.phase[0] + self.phase[1]).clamp(0, GAME_PHASE_MAX)
    }

    // =====================================================================
    // Attack queries
    // =====================================================================

    /// All pieces of `by` attacking `sq` under the current occupancy.
    #[must_use]
    pub fn attacks_to(&self, sq: Square, by: Color) -> Bitboard {
        self.attacks_to_occ(sq, by, self.all_occupied)
    }

    /// Attack query with an explicit occupancy, for exchange evaluation.
    #[must_use]
    pub(crate) fn attacks_to_occ(&self, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
        let c = by.index();
        let mut attackers = Bitboard::EMPTY;

        // A pawn of `by` attacks sq iff a pawn of the other color on sq
        // would attack the pawn's square.
        attackers = attackers.or(
            pawn_attacks(by.flip(), sq).and(self.piece_bb[c][PieceType::Pawn.index()]),
        );
        attackers = attackers.or(
            get_attacks(PieceType::Knight, sq, occupied)
                .and(self.piece_bb[c][PieceType::Knight.index()]),
        );
        attackers = attackers.or(
            get_attacks(PieceType::King, sq, occupied)
                .and(self.piece_bb[c][PieceType::King.index()]),
        );

        let bishops_queens = self.piece_bb[c][PieceType::Bishop.index()]
            .or(self.piece_bb[c][PieceType::Queen.index()]);
        attackers =
            attackers.or(get_attacks(PieceType::Bishop, sq, occupied).and(bishops_queens));

        let rooks_queens = self.piece_bb[c][PieceType::Rook.index()]
            .or(self.piece_bb[c][PieceType::Queen.index()]);
        attackers = attackers.or(get_attacks(PieceType::Rook, sq, occupied).and(rooks_queens));

        attackers
    }

    #[inline]
    #[must_use]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        !self.attacks_to(sq, by).is_empty()
    }

    pub(crate) fn compute_check(&self) -> bool {
        let us = self.side_to_move;
        self.is_attacked(self.king_square(us), us.flip())
    }

    // =====================================================================
    // Draw detection
    // =====================================================================

    /// Whether the current position occurred at least `n` times earlier,
    /// scanning the history stack at two-ply steps and never past a
    /// halfmove-clock reset.
    #[must_use]
    pub fn check_repetition(&self, n: u32) -> bool {
        let mut found = 0;
        let len = self.history.len();
        let reach = (self.halfmove_clock as usize).min(len);
        let mut back = 2;
        while back <= reach {
            if self.history[len - back].zobrist == self.zobrist {
                found += 1;
                if found >= n {
                    return true;
                }
            }
            back += 2;
        }
        false
    }

    /// Fifty-move rule: 100 halfmoves without a capture or pawn move.
    #[inline]
    #[must_use]
    pub fn fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can possibly deliver mate: bare kings, a single minor,
    /// or same-colored bishops only.
    #[must_use]
    pub fn insufficient_material(&self) -> bool {
        let pawns = self
            .pieces(Color::White, PieceType::Pawn)
            .or(self.pieces(Color::Black, PieceType::Pawn));
        let majors = self
            .pieces(Color::White, PieceType::Rook)
            .or(self.pieces(Color::Black, PieceType::Rook))
            .or(self.pieces(Color::White, PieceType::Queen))
            .or(self.pieces(Color::Black, PieceType::Queen));
        if !pawns.is_empty() || !majors.is_empty() {
            return false;
        }

        let knights = self
            .pieces(Color::White, PieceType::Knight)
            .or(self.pieces(Color::Black, PieceType::Knight));
        let bishops = self
            .pieces(Color::White, PieceType::Bishop)
            .or(self.pieces(Color::Black, PieceType::Bishop));
        let minors = knights.popcount() + bishops.popcount();
        if minors <= 1 {
            return true;
        }

        // Any number of bishops all on one square color cannot mate
        knights.is_empty()
            && (bishops.and(Bitboard::LIGHT_SQUARES).is_empty()
                || bishops.and(Bitboard::DARK_SQUARES).is_empty())
    }

    // =====================================================================
    // Board editing (FEN construction and make/unmake internals)
    // =====================================================================

    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, pt: PieceType) {
        let bit = Bitboard::from_square(sq);
        let c = color.index();
        self.squares[sq.index()] = Some((color, pt));
        self.piece_bb[c][pt.index()] = self.piece_bb[c][pt.index()].or(bit);
        self.occupied_bb[c] = self.occupied_bb[c].or(bit);
        self.all_occupied = self.all_occupied.or(bit);
        self.material[c] += pt.value();
        self.psq_mg[c] += super::pst::psq_mg(pt, color, sq);
        self.psq_eg[c] += super::pst::psq_eg(pt, color, sq);
        self.phase[c] += pt.phase_weight();
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, pt: PieceType) {
        let bit = Bitboard::from_square(sq);
        let c = color.index();
        self.squares[sq.index()] = None;
        self.piece_bb[c][pt.index()] = self.piece_bb[c][pt.index()].and(bit.not());
        self.occupied_bb[c] = self.occupied_bb[c].and(bit.not());
        self.all_occupied = self.all_occupied.and(bit.not());
        self.material[c] -= pt.value();
        self.psq_mg[c] -= super::pst::psq_mg(pt, color, sq);
        self.psq_eg[c] -= super::pst::psq_eg(pt, color, sq);
        self.phase[c] -= pt.phase_weight();
    }

    /// Full recomputation of the main key; the incremental updates must
    /// always agree with this.
    #[must_use]
    pub(crate) fn compute_zobrist(&self) -> u64 {
        let mut hash = 0u64;
        for color in Color::BOTH {
            for pt in PIECE_TYPES {
                for sq in self.pieces(color, pt).iter() {
                    hash ^= ZOBRIST.piece(color, pt, sq);
                }
            }
        }
        hash ^= ZOBRIST.castling[self.castling.bits() as usize];
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant[ep.file()];
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move;
        }
        hash
    }

    #[must_use]
    pub(crate) fn compute_pawn_zobrist(&self) -> u64 {
        let mut hash = 0u64;
        for color in Color::BOTH {
            for sq in self.pieces(color, PieceType::Pawn).iter() {
                hash ^= ZOBRIST.piece(color, PieceType::Pawn, sq);
            }
        }
        hash
    }

    pub(crate) fn snapshot(&self, mv: Move, captured: Option<PieceType>) -> Snapshot {
        Snapshot {
            zobrist: self.zobrist,
            pawn_zobrist: self.pawn_zobrist,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            captured,
            mv,
            in_check: self.in_check,
            was_legal: self.last_was_legal,
            material: self.material,
            psq_mg: self.psq_mg,
            psq_eg: self.psq_eg,
            phase: self.phase,
        }
    }

    pub(crate) fn restore(&mut self, snap: &Snapshot) {
        self.zobrist = snap.zobrist;
        self.pawn_zobrist = snap.pawn_zobrist;
        self.castling = snap.castling;
        self.en_passant = snap.en_passant;
        self.halfmove_clock = snap.halfmove_clock;
        self.fullmove_number = snap.fullmove_number;
        self.in_check = snap.in_check;
        self.last_was_legal = snap.was_legal;
        self.material = snap.material;
        self.psq_mg = snap.psq_mg;
        self.psq_eg = snap.psq_eg;
        self.phase = snap.phase;
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

impl PartialEq for Position {
    /// Structural equality over the fields that define the position;
    /// the history stack is excluded.
    fn eq(&self, other: &Self) -> bool {
        self.squares == other.squares
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.zobrist == other.zobrist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_basics() {
        let pos = Position::new();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.en_passant_square(), None);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
        assert!(!pos.has_check());
        assert_eq!(pos.all_occupied().popcount(), 32);
        assert_eq!(pos.game_phase(), GAME_PHASE_MAX);
    }

    #[test]
    fn test_start_position_kings() {
        let pos = Position::new();
        assert_eq!(pos.king_square(Color::White), Square::E1);
        assert_eq!(pos.king_square(Color::Black), Square::E8);
    }

    #[test]
    fn test_zobrist_matches_recompute() {
        let pos = Position::new();
        assert_eq!(pos.zobrist(), pos.compute_zobrist());
        assert_eq!(pos.pawn_zobrist(), pos.compute_pawn_zobrist());
    }

    #[test]
    fn test_material_accounting() {
        let pos = Position::new();
        // K + Q + 2R + 2B + 2N + 8P
        let expected = 2000 + 900 + 2 * 500 + 2 * 330 + 2 * 320 + 8 * 100;
        assert_eq!(pos.material(Color::White), expected);
        assert_eq!(pos.material(Color::Black), expected);
        assert_eq!(pos.non_pawn_material(Color::White), expected - 2000 - 800);
    }

    #[test]
    fn test_attacks_to_start_position() {
        let pos = Position::new();
        // e3 is guarded by the d2 and f2 pawns plus nothing else... plus
        // the knight on g1? No: g1 knight attacks e2, f3, h3.
        let e3 = Square::new(2, 4);
        let attackers = pos.attacks_to(e3, Color::White);
        assert_eq!(attackers.popcount(), 2);
        // f3 is covered by pawns e2 and g2 plus the knight on g1
        let f3 = Square::new(2, 5);
        assert_eq!(pos.attacks_to(f3, Color::White).popcount(), 3);
        assert!(!pos.is_attacked(Square::new(4, 4), Color::White));
    }

    #[test]
    fn test_insufficient_material() {
        let kk = Position::from_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1").unwrap();
        assert!(kk.insufficient_material());

        let kbk = Position::from_fen("8/8/4k3/8/8/3KB3/8/8 w - - 0 1").unwrap();
        assert!(kbk.insufficient_material());

        let knk = Position::from_fen("8/8/4k3/8/8/3KN3/8/8 w - - 0 1").unwrap();
        assert!(knk.insufficient_material());

        // Bishops all on dark squares cannot mate
        let same_bishops = Position::from_fen("8/8/4k3/4b3/8/2B1K3/8/8 w - - 0 1").unwrap();
        assert!(same_bishops.insufficient_material());

        // Opposite-colored bishops retain mating material
        let opposite = Position::from_fen("8/8/4k3/5b2/8/2B1K3/8/8 w - - 0 1").unwrap();
        assert!(!opposite.insufficient_material());

        let krk = Position::from_fen("8/8/4k3/8/8/3KR3/8/8 w - - 0 1").unwrap();
        assert!(!krk.insufficient_material());

        let kpk = Position::from_fen("8/8/4k3/8/8/3KP3/8/8 w - - 0 1").unwrap();
        assert!(!kpk.insufficient_material());
    }
}
