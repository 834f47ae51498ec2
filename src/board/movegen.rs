//! Batch move generation.
//!
//! Pseudo-legal moves are produced by mode (non-quiet, quiet, or all),
//! optionally restricted to check evasions, scored for ordering, sorted,
//! and handed out with the sort values stripped. Legality is a separate
//! filter so the search can defer it to make/unmake time.

use super::attack_tables::{between, get_attacks, pawn_attacks};
use super::position::{Position, GAME_PHASE_MAX};
use super::pst::{psq_eg, psq_mg};
use super::types::{
    pop_lsb, Bitboard, Color, Move, MoveList, PieceType, Square, PROMOTION_PIECES,
};

/// Which classes of moves to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenMode {
    /// Captures, en passant, queen and knight promotions, promotion captures
    NonQuiet,
    /// Everything else, castling and rook/bishop promotions included
    Quiet,
    /// Both
    All,
}

impl GenMode {
    #[inline]
    #[must_use]
    pub fn wants_non_quiet(self) -> bool {
        matches!(self, GenMode::NonQuiet | GenMode::All)
    }

    #[inline]
    #[must_use]
    pub fn wants_quiet(self) -> bool {
        matches!(self, GenMode::Quiet | GenMode::All)
    }
}

// Sort-value bands. Captures sit above every quiet move, queen and
// knight promotions above captures, and underpromotions between the
// capture band and the killer slots.
const SORT_CAPTURE_BASE: i16 = 6000;
const SORT_PROMOTION_QUEEN: i16 = 9500;
const SORT_PROMOTION_KNIGHT: i16 = 9000;
const SORT_PROMOTION_ROOK: i16 = 3000;
const SORT_PROMOTION_BISHOP: i16 = 2900;
pub(crate) const SORT_KILLER_FIRST: i16 = 1001;
pub(crate) const SORT_KILLER_SECOND: i16 = 1000;
pub(crate) const SORT_COUNTER_MOVE: i16 = 999;

/// Generate pseudo-legal moves.
///
/// With `evasion` set and the side to move in check, targets are
/// restricted to capturing the checker or blocking its line; with more
/// than one checker only king moves are produced. The list comes back
/// ordered best-first with sort values stripped.
#[must_use]
pub fn generate_pseudo_legal(pos: &Position, mode: GenMode, evasion: bool) -> MoveList {
    let mut list = MoveList::new();
    generate_into(pos, mode, evasion, &mut list);
    list.sort();
    list.strip_sort_values();
    list
}

/// Legal moves: the pseudo-legal set filtered through
/// [`Position::is_legal_move`].
#[must_use]
pub fn generate_legal(pos: &mut Position, mode: GenMode) -> MoveList {
    let list = generate_pseudo_legal(pos, mode, pos.has_check());
    let mut filtered = MoveList::new();
    for idx in 0..list.len() {
        let m = list[idx];
        if pos.is_legal_move(m) {
            filtered.push(m);
        }
    }
    filtered
}

/// Whether the side to move has any legal move at all. Stops at the
/// first one found.
#[must_use]
pub fn has_legal_move(pos: &mut Position) -> bool {
    let list = generate_pseudo_legal(pos, GenMode::All, pos.has_check());
    for m in &list {
        if pos.is_legal_move(*m) {
            return true;
        }
    }
    false
}

fn generate_into(pos: &Position, mode: GenMode, evasion: bool, list: &mut MoveList) {
    let in_evasion = evasion && pos.has_check();
    let targets = if in_evasion {
        evasion_targets(pos)
    } else {
        Bitboard::ALL
    };

    // With two checkers only the king can do anything.
    if !(in_evasion && targets.is_empty()) {
        gen_pawn_moves(pos, mode, targets, list);
        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
        ] {
            gen_officer_moves(pos, mode, pt, targets, list);
        }
        if mode.wants_quiet() && !in_evasion {
            gen_castling(pos, list);
        }
    }
    gen_king_moves(pos, mode, list);
}

/// Squares that resolve a single check: the checker itself plus, for a
/// slider, the line between it and the king. Empty under double check.
pub(crate) fn evasion_targets(pos: &Position) -> Bitboard {
    let us = pos.side_to_move();
    let king = pos.king_square(us);
    let checkers = pos.attacks_to(king, us.flip());
    debug_assert!(!checkers.is_empty());
    if !checkers.is_single() {
        return Bitboard::EMPTY;
    }
    let checker = checkers.lsb();
    let (_, pt) = pos.piece_on(checker).expect("checker occupies its square");
    let mut mask = checkers;
    if pt.is_slider() {
        mask = mask.or(between(checker, king));
    }
    mask
}

#[inline]
fn capture_value(victim: PieceType, attacker: PieceType) -> i16 {
    SORT_CAPTURE_BASE + (victim.value() - attacker.value()) as i16
}

/// Positional gain of a quiet move, tapered by game phase. Small by
/// construction, so it stays under the killer band.
fn quiet_value(pos: &Position, pt: PieceType, color: Color, from: Square, to: Square) -> i16 {
    let phase = pos.game_phase();
    let mg = psq_mg(pt, color, to) - psq_mg(pt, color, from);
    let eg = psq_eg(pt, color, to) - psq_eg(pt, color, from);
    ((mg * phase + eg * (GAME_PHASE_MAX - phase)) / GAME_PHASE_MAX) as i16
}

fn promotion_value(promo: PieceType, victim: Option<PieceType>) -> i16 {
    let base = match promo {
        PieceType::Queen => SORT_PROMOTION_QUEEN,
        PieceType::Knight => SORT_PROMOTION_KNIGHT,
        PieceType::Rook => SORT_PROMOTION_ROOK,
        _ => SORT_PROMOTION_BISHOP,
    };
    base + victim.map_or(0, |v| v.value() as i16)
}

fn push_scored(list: &mut MoveList, mut m: Move, value: i16) {
    m.set_sort_value(value);
    list.push(m);
}

pub(crate) fn gen_pawn_moves(pos: &Position, mode: GenMode, targets: Bitboard, list: &mut MoveList) {
    let us = pos.side_to_move();
    let them = us.flip();
    let forward = us.forward();
    let occupied = pos.all_occupied();
    let enemies = pos.occupied(them);

    let mut pawns = pos.pieces(us, PieceType::Pawn);
    while !pawns.is_empty() {
        let from = pop_lsb(&mut pawns);
        let promoting = from.rank() as i8 + forward == us.promotion_rank() as i8;

        // Pushes
        if let Some(to) = from.step(forward, 0) {
            if !occupied.contains(to) {
                if promoting {
                    for promo in PROMOTION_PIECES {
                        let non_quiet =
                            matches!(promo, PieceType::Queen | PieceType::Knight);
                        let wanted = if non_quiet {
                            mode.wants_non_quiet()
                        } else {
                            mode.wants_quiet()
                        };
                        if wanted && targets.contains(to) {
                            push_scored(
                                list,
                                Move::promotion(from, to, promo),
                                promotion_value(promo, None),
                            );
                        }
                    }
                } else if mode.wants_quiet() {
                    if targets.contains(to) {
                        push_scored(
                            list,
                            Move::normal(from, to),
                            quiet_value(pos, PieceType::Pawn, us, from, to),
                        );
                    }
                    if from.rank() == us.double_push_rank() {
                        if let Some(double_to) = to.step(forward, 0) {
                            if !occupied.contains(double_to) && targets.contains(double_to) {
                                push_scored(
                                    list,
                                    Move::normal(from, double_to),
                                    quiet_value(pos, PieceType::Pawn, us, from, double_to),
                                );
                            }
                        }
                    }
                }
            }
        }

        // Captures, including capture promotions and en passant
        if mode.wants_non_quiet() {
            let mut attacks = pawn_attacks(us, from).and(enemies).and(targets);
            while !attacks.is_empty() {
                let to = pop_lsb(&mut attacks);
                let (_, victim) = pos.piece_on(to).expect("capture target occupied");
                if promoting {
                    for promo in PROMOTION_PIECES {
                        push_scored(
                            list,
                            Move::promotion(from, to, promo),
                            promotion_value(promo, Some(victim)),
                        );
                    }
                } else {
                    push_scored(
                        list,
                        Move::normal(from, to),
                        capture_value(victim, PieceType::Pawn),
                    );
                }
            }

            if let Some(ep) = pos.en_passant_square() {
                if pawn_attacks(us, from).contains(ep) {
                    let captured_sq =
                        Square::new((ep.rank() as i8 - forward) as usize, ep.file());
                    // Under evasion the capture must remove the checker or
                    // interpose on its line.
                    if targets == Bitboard::ALL
                        || targets.contains(captured_sq)
                        || targets.contains(ep)
                    {
                        push_scored(
                            list,
                            Move::en_passant(from, ep),
                            capture_value(PieceType::Pawn, PieceType::Pawn),
                        );
                    }
                }
            }
        }
    }
}

pub(crate) fn gen_officer_moves(
    pos: &Position,
    mode: GenMode,
    pt: PieceType,
    targets: Bitboard,
    list: &mut MoveList,
) {
    let us = pos.side_to_move();
    let occupied = pos.all_occupied();
    let enemies = pos.occupied(us.flip());

    let mut pieces = pos.pieces(us, pt);
    while !pieces.is_empty() {
        let from = pop_lsb(&mut pieces);
        let attacks = get_attacks(pt, from, occupied);

        if mode.wants_non_quiet() {
            let mut captures = attacks.and(enemies).and(targets);
            while !captures.is_empty() {
                let to = pop_lsb(&mut captures);
                let (_, victim) = pos.piece_on(to).expect("capture target occupied");
                push_scored(list, Move::normal(from, to), capture_value(victim, pt));
            }
        }

        if mode.wants_quiet() {
            let mut quiets = attacks.and(occupied.not()).and(targets);
            while !quiets.is_empty() {
                let to = pop_lsb(&mut quiets);
                push_scored(
                    list,
                    Move::normal(from, to),
                    quiet_value(pos, pt, us, from, to),
                );
            }
        }
    }
}

pub(crate) fn gen_king_moves(pos: &Position, mode: GenMode, list: &mut MoveList) {
    let us = pos.side_to_move();
    let from = pos.king_square(us);
    let attacks = get_attacks(PieceType::King, from, pos.all_occupied());
    let enemies = pos.occupied(us.flip());

    if mode.wants_non_quiet() {
        let mut captures = attacks.and(enemies);
        while !captures.is_empty() {
            let to = pop_lsb(&mut captures);
            let (_, victim) = pos.piece_on(to).expect("capture target occupied");
            push_scored(
                list,
                Move::normal(from, to),
                capture_value(victim, PieceType::King),
            );
        }
    }

    if mode.wants_quiet() {
        let mut quiets = attacks.and(pos.all_occupied().not());
        while !quiets.is_empty() {
            let to = pop_lsb(&mut quiets);
            push_scored(
                list,
                Move::normal(from, to),
                quiet_value(pos, PieceType::King, us, from, to),
            );
        }
    }
}

/// Castling is pseudo-legal when the right is present and the squares
/// between king and rook are empty; attacked-square checks belong to
/// [`Position::is_legal_move`].
pub(crate) fn gen_castling(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let rank = us.back_rank();
    let rights = pos.castling_rights();
    let occupied = pos.all_occupied();
    let king_from = Square::new(rank, 4);

    // Guard against hand-written FENs whose rights outlive the pieces.
    if pos.piece_on(king_from) != Some((us, PieceType::King)) {
        return;
    }

    if rights.has_kingside(us)
        && pos.piece_on(Square::new(rank, 7)) == Some((us, PieceType::Rook))
        && !occupied.contains(Square::new(rank, 5))
        && !occupied.contains(Square::new(rank, 6))
    {
        push_scored(list, Move::castling(king_from, Square::new(rank, 6)), 0);
    }
    if rights.has_queenside(us)
        && pos.piece_on(Square::new(rank, 0)) == Some((us, PieceType::Rook))
        && !occupied.contains(Square::new(rank, 1))
        && !occupied.contains(Square::new(rank, 2))
        && !occupied.contains(Square::new(rank, 3))
    {
        push_scored(list, Move::castling(king_from, Square::new(rank, 2)), 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen::START_FEN;

    #[test]
    fn test_start_position_has_twenty_moves() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        let legal = generate_legal(&mut pos, GenMode::All);
        assert_eq!(legal.len(), 20);
        // None of them are captures at the start
        let non_quiet = generate_pseudo_legal(&pos, GenMode::NonQuiet, false);
        assert!(non_quiet.is_empty());
    }

    #[test]
    fn test_mode_split_partitions_all() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let all = generate_pseudo_legal(&pos, GenMode::All, false);
        let non_quiet = generate_pseudo_legal(&pos, GenMode::NonQuiet, false);
        let quiet = generate_pseudo_legal(&pos, GenMode::Quiet, false);
        assert_eq!(all.len(), non_quiet.len() + quiet.len());
        for m in &non_quiet {
            assert!(all.contains(*m));
            assert!(!quiet.contains(*m));
        }
        assert!(generate_legal(&mut pos, GenMode::All).len() <= all.len());
    }

    #[test]
    fn test_non_quiet_promotions() {
        // Pawn on a7 about to promote, no captures available
        let pos = Position::from_fen("8/P7/8/8/8/8/7k/K7 w - - 0 1").unwrap();
        let non_quiet = generate_pseudo_legal(&pos, GenMode::NonQuiet, false);
        let promos: Vec<PieceType> = non_quiet
            .iter()
            .filter_map(|m| m.promotion_piece())
            .collect();
        assert!(promos.contains(&PieceType::Queen));
        assert!(promos.contains(&PieceType::Knight));
        assert!(!promos.contains(&PieceType::Rook));
        assert!(!promos.contains(&PieceType::Bishop));

        let quiet = generate_pseudo_legal(&pos, GenMode::Quiet, false);
        let underpromos: Vec<PieceType> =
            quiet.iter().filter_map(|m| m.promotion_piece()).collect();
        assert!(underpromos.contains(&PieceType::Rook));
        assert!(underpromos.contains(&PieceType::Bishop));
    }

    #[test]
    fn test_en_passant_generated() {
        let pos = Position::from_fen(
            "rnbqkbnr/pppp1ppp/8/8/4pP2/8/PPPPP1PP/RNBQKBNR b KQkq f3 0 3",
        )
        .unwrap();
        let moves = generate_pseudo_legal(&pos, GenMode::NonQuiet, false);
        assert!(moves
            .iter()
            .any(|m| m.is_en_passant() && m.to() == Square::new(2, 5)));
    }

    #[test]
    fn test_evasion_superset_of_legal_in_check() {
        // White king checked by a rook on e8
        let mut pos = Position::from_fen("4r3/8/8/8/8/8/3P1P2/2B1K2k w - - 0 1").unwrap();
        assert!(pos.has_check());
        let evasions = generate_pseudo_legal(&pos, GenMode::All, true);
        let legal = generate_legal(&mut pos, GenMode::All);
        for m in &legal {
            assert!(evasions.contains(*m), "evasions miss legal move {m}");
        }
    }

    #[test]
    fn test_double_check_only_king_evasions() {
        // Knight on f3 and rook on e8 both give check
        let pos = Position::from_fen("4r2k/8/8/8/8/5n2/8/4K3 w - - 0 1").unwrap();
        assert!(pos.has_check());
        let evasions = generate_pseudo_legal(&pos, GenMode::All, true);
        assert!(evasions
            .iter()
            .all(|m| m.from() == pos.king_square(Color::White)));
    }

    #[test]
    fn test_evasion_includes_blocks_and_checker_capture() {
        // Rook e8 checks the e1 king; the d3 knight can interpose on e5
        let pos = Position::from_fen("4r3/8/8/8/8/3N4/8/4K2k w - - 0 1").unwrap();
        assert!(pos.has_check());
        let evasions = generate_pseudo_legal(&pos, GenMode::All, true);
        assert!(evasions
            .iter()
            .any(|m| m.from() == Square::new(2, 3) && m.to() == Square::new(4, 4)));
        // Non-king moves that neither block nor capture are excluded
        assert!(!evasions
            .iter()
            .any(|m| m.from() == Square::new(2, 3) && m.to() == Square::new(1, 1)));
    }

    #[test]
    fn test_castling_requires_empty_path() {
        let pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/RN2K2R w KQkq - 0 1").unwrap();
        let quiet = generate_pseudo_legal(&pos, GenMode::Quiet, false);
        // Kingside path is clear, queenside is blocked by the b1 knight
        assert!(quiet.iter().any(|m| m.is_castling() && m.to() == Square::G1));
        assert!(!quiet.iter().any(|m| m.is_castling() && m.to() == Square::C1));
    }

    #[test]
    fn test_sort_values_stripped() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let moves = generate_pseudo_legal(&pos, GenMode::All, false);
        assert!(moves.iter().all(|m| m.sort_value() == 0));
    }

    #[test]
    fn test_captures_ordered_by_victim_value() {
        // Pawn can take a queen or a knight; the queen capture must sort first
        let pos = Position::from_fen("7k/8/2q1n3/3P4/8/8/8/7K w - - 0 1").unwrap();
        let moves = generate_pseudo_legal(&pos, GenMode::NonQuiet, false);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].to(), Square::new(5, 2));
    }
}
