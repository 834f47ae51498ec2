//! On-demand phased move generation.
//!
//! The search asks for one move at a time; each stage is generated,
//! scored and sorted only when the previous stage runs dry, so a beta
//! cutoff on an early capture never pays for the quiet moves. Stage
//! order: PV move, pawn captures, officer captures, king captures, pawn
//! quiets, castling, officer quiets, king quiets.

use super::attack_tables::pawn_attacks;
use super::movegen::{
    evasion_targets, gen_castling, gen_king_moves, gen_officer_moves, gen_pawn_moves, GenMode,
    SORT_COUNTER_MOVE, SORT_KILLER_FIRST, SORT_KILLER_SECOND,
};
use super::position::Position;
use super::types::{Bitboard, Move, MoveList, MoveType, PieceType};
use crate::history::History;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    PvMove,
    PawnCaptures,
    OfficerCaptures,
    KingCaptures,
    PawnQuiets,
    Castling,
    OfficerQuiets,
    KingQuiets,
    End,
}

/// Quiet sort values are clamped below the killer slots so the ordering
/// contract (killers right after the non-quiets of their stage) holds.
const QUIET_SORT_CAP: i16 = SORT_COUNTER_MOVE - 1;

/// Phased move generator with PV and killer injection.
///
/// One instance serves one ply; make/unmake happens between `next`
/// calls, so the generator watches the position's Zobrist key and
/// silently re-initialises when it changes.
pub struct MoveGenerator {
    stage: Stage,
    buffer: MoveList,
    idx: usize,
    pv: Move,
    killers: [Move; 2],
    key: u64,
    mode: GenMode,
    evasion: bool,
    primed: bool,
}

impl MoveGenerator {
    #[must_use]
    pub fn new() -> Self {
        MoveGenerator {
            stage: Stage::PvMove,
            buffer: MoveList::new(),
            idx: 0,
            pv: Move::NONE,
            killers: [Move::NONE; 2],
            key: 0,
            mode: GenMode::All,
            evasion: false,
            primed: false,
        }
    }

    /// Restart iteration. PV and killer slots survive a reset.
    pub fn reset(&mut self) {
        self.stage = Stage::PvMove;
        self.buffer.clear();
        self.idx = 0;
        self.primed = false;
    }

    /// The next `reset` (or position change) will emit this move first
    /// when it fits the requested mode.
    pub fn set_pv(&mut self, m: Move) {
        self.pv = m.stripped();
    }

    /// Two-slot LRU of quiet beta-cutoff moves; duplicates coalesce.
    pub fn store_killer(&mut self, m: Move) {
        let m = m.stripped();
        if self.killers[0].same_move(m) {
            return;
        }
        self.killers[1] = self.killers[0];
        self.killers[0] = m;
    }

    #[cfg(test)]
    pub(crate) fn killers(&self) -> [Move; 2] {
        self.killers
    }

    /// Produce the next move, or `Move::NONE` when exhausted. Emits
    /// pseudo-legal moves; the caller filters through make/unmake.
    pub fn next(
        &mut self,
        pos: &Position,
        mode: GenMode,
        evasion: bool,
        history: Option<&History>,
    ) -> Move {
        if !self.primed || self.key != pos.zobrist() || self.mode != mode || self.evasion != evasion
        {
            self.stage = Stage::PvMove;
            self.buffer.clear();
            self.idx = 0;
            self.key = pos.zobrist();
            self.mode = mode;
            self.evasion = evasion;
            self.primed = true;
        }

        loop {
            while self.idx < self.buffer.len() {
                let m = self.buffer[self.idx];
                self.idx += 1;
                if m.same_move(self.pv) {
                    continue;
                }
                return m.stripped();
            }

            if self.stage == Stage::PvMove {
                self.stage = Stage::PawnCaptures;
                if self.pv.is_valid()
                    && mode_accepts(pos, self.pv, self.mode)
                    && is_pseudo_legal(pos, self.pv)
                {
                    return self.pv;
                }
                continue;
            }
            if self.stage == Stage::End {
                return Move::NONE;
            }
            self.fill_next_stage(pos, history);
        }
    }

    fn fill_next_stage(&mut self, pos: &Position, history: Option<&History>) {
        self.buffer.clear();
        self.idx = 0;

        let in_evasion = self.evasion && pos.has_check();
        let targets = if in_evasion {
            evasion_targets(pos)
        } else {
            Bitboard::ALL
        };
        // Double check: every non-king stage stays empty.
        let king_only = in_evasion && targets.is_empty();
        let non_quiet = self.mode.wants_non_quiet();
        let quiet = self.mode.wants_quiet();

        let mut is_quiet_stage = false;
        match self.stage {
            Stage::PawnCaptures => {
                if non_quiet && !king_only {
                    gen_pawn_moves(pos, GenMode::NonQuiet, targets, &mut self.buffer);
                }
                self.stage = Stage::OfficerCaptures;
            }
            Stage::OfficerCaptures => {
                if non_quiet && !king_only {
                    for pt in [
                        PieceType::Knight,
                        PieceType::Bishop,
                        PieceType::Rook,
                        PieceType::Queen,
                    ] {
                        gen_officer_moves(pos, GenMode::NonQuiet, pt, targets, &mut self.buffer);
                    }
                }
                self.stage = Stage::KingCaptures;
            }
            Stage::KingCaptures => {
                if non_quiet {
                    gen_king_moves(pos, GenMode::NonQuiet, &mut self.buffer);
                }
                self.stage = Stage::PawnQuiets;
            }
            Stage::PawnQuiets => {
                if quiet && !king_only {
                    gen_pawn_moves(pos, GenMode::Quiet, targets, &mut self.buffer);
                    is_quiet_stage = true;
                }
                self.stage = Stage::Castling;
            }
            Stage::Castling => {
                if quiet && !in_evasion {
                    gen_castling(pos, &mut self.buffer);
                }
                self.stage = Stage::OfficerQuiets;
            }
            Stage::OfficerQuiets => {
                if quiet && !king_only {
                    for pt in [
                        PieceType::Knight,
                        PieceType::Bishop,
                        PieceType::Rook,
                        PieceType::Queen,
                    ] {
                        gen_officer_moves(pos, GenMode::Quiet, pt, targets, &mut self.buffer);
                    }
                    is_quiet_stage = true;
                }
                self.stage = Stage::KingQuiets;
            }
            Stage::KingQuiets => {
                if quiet {
                    gen_king_moves(pos, GenMode::Quiet, &mut self.buffer);
                    is_quiet_stage = true;
                }
                self.stage = Stage::End;
            }
            Stage::PvMove | Stage::End => unreachable!("handled by next()"),
        }

        if is_quiet_stage {
            self.score_quiets(pos, history);
        }
        self.buffer.sort();
    }

    /// Promote killers and the counter move, perturb the rest by their
    /// history counts.
    fn score_quiets(&mut self, pos: &Position, history: Option<&History>) {
        let counter =
            history.map_or(Move::NONE, |h| h.counter_move(pos.last_move()));
        let us = pos.side_to_move();
        for m in self.buffer.as_mut_slice() {
            if m.same_move(self.killers[0]) {
                m.set_sort_value(SORT_KILLER_FIRST);
            } else if m.same_move(self.killers[1]) {
                m.set_sort_value(SORT_KILLER_SECOND);
            } else if counter.is_valid() && m.same_move(counter) {
                m.set_sort_value(SORT_COUNTER_MOVE);
            } else if let Some(h) = history {
                let bonus = (h.count(us, *m) / 16).min(800) as i16;
                let value = (m.sort_value() + bonus).min(QUIET_SORT_CAP);
                m.set_sort_value(value);
            }
        }
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        MoveGenerator::new()
    }
}

/// Whether `m` belongs to the non-quiet class in `pos`: a capture, en
/// passant, or a queen/knight promotion.
fn is_non_quiet(pos: &Position, m: Move) -> bool {
    if m.is_en_passant() {
        return true;
    }
    if pos.piece_on(m.to()).is_some() {
        return true;
    }
    matches!(
        m.promotion_piece(),
        Some(PieceType::Queen | PieceType::Knight)
    )
}

fn mode_accepts(pos: &Position, m: Move, mode: GenMode) -> bool {
    if is_non_quiet(pos, m) {
        mode.wants_non_quiet()
    } else {
        mode.wants_quiet()
    }
}

/// Cheap validation that an injected move (PV or hash move) could have
/// been generated in this position.
fn is_pseudo_legal(pos: &Position, m: Move) -> bool {
    let us = pos.side_to_move();
    let Some((color, pt)) = pos.piece_on(m.from()) else {
        return false;
    };
    if color != us {
        return false;
    }
    if let Some((target_color, target_pt)) = pos.piece_on(m.to()) {
        if target_color == us || target_pt == PieceType::King {
            return false;
        }
    }

    match m.move_type() {
        MoveType::Castling => {
            if pt != PieceType::King {
                return false;
            }
            let mut castles = MoveList::new();
            gen_castling(pos, &mut castles);
            castles.contains(m)
        }
        MoveType::EnPassant => {
            pt == PieceType::Pawn
                && pos.en_passant_square() == Some(m.to())
                && pawn_attacks(us, m.from()).contains(m.to())
        }
        MoveType::Promotion | MoveType::Normal => {
            if m.is_promotion() && pt != PieceType::Pawn {
                return false;
            }
            if pt == PieceType::Pawn {
                pawn_move_shape_ok(pos, m)
            } else {
                super::attack_tables::get_attacks(pt, m.from(), pos.all_occupied())
                    .contains(m.to())
            }
        }
    }
}

fn pawn_move_shape_ok(pos: &Position, m: Move) -> bool {
    let us = pos.side_to_move();
    let from = m.from();
    let to = m.to();
    let forward = us.forward();

    let on_promo_rank = to.rank() == us.promotion_rank();
    if m.is_promotion() != on_promo_rank {
        return false;
    }

    if pawn_attacks(us, from).contains(to) {
        // Diagonal: must capture
        return pos.piece_on(to).is_some();
    }
    if from.step(forward, 0) == Some(to) {
        return pos.piece_on(to).is_none();
    }
    if from.rank() == us.double_push_rank()
        && from.step(forward, 0).and_then(|s| s.step(forward, 0)) == Some(to)
    {
        let mid = from.step(forward, 0).expect("double push midpoint on board");
        return pos.piece_on(mid).is_none() && pos.piece_on(to).is_none();
    }
    false
}
