//! The recursive principal-variation search.

use once_cell::sync::Lazy;

use crate::board::{
    is_mate_value, mate_in, mated_in, GenMode, Move, Value, MAX_PLY, VALUE_DRAW, VALUE_INFINITE,
    VALUE_NA,
};
use crate::tt::Bound;

use super::driver::Context;

/// Late-move reduction table indexed by depth and move number.
static LMR: Lazy<[[i32; 64]; 64]> = Lazy::new(|| {
    let mut table = [[1i32; 64]; 64];
    for (depth, row) in table.iter_mut().enumerate() {
        for (index, cell) in row.iter_mut().enumerate() {
            if depth >= 4 && index >= 4 {
                *cell = ((depth as f64) * 0.7 * (index as f64) * 0.005 + 1.0).round() as i32;
            }
        }
    }
    table
});

#[inline]
fn lmr_reduction(depth: i32, move_number: usize) -> i32 {
    LMR[(depth.max(0) as usize).min(63)][move_number.min(63)]
}

impl Context<'_> {
    /// Alpha-beta with PVS, dropping into quiescence at the horizon.
    /// Returns `VALUE_NA` when the search was cancelled; every enclosing
    /// frame propagates it without interpreting the score.
    pub(crate) fn search(
        &mut self,
        depth: i32,
        ply: usize,
        mut alpha: Value,
        mut beta: Value,
        allow_null: bool,
    ) -> Value {
        if self.should_abort() {
            return VALUE_NA;
        }
        if depth <= 0 || ply >= MAX_PLY {
            return self.quiescence(ply, alpha, beta);
        }

        self.state.stats.nodes += 1;
        if ply as i32 > self.state.stats.seldepth {
            self.state.stats.seldepth = ply as i32;
        }
        self.state.pv_len[ply] = 0;

        let is_pv = beta - alpha > 1;

        // Repetition, fifty-move and dead-position draws end the line
        // here.
        if self.pos.check_repetition(2)
            || self.pos.fifty_move_draw()
            || self.pos.insufficient_material()
        {
            return VALUE_DRAW;
        }

        // Mate-distance pruning: even a mate now cannot improve on what
        // an enclosing frame already has.
        if self.settings.use_mate_distance_pruning {
            alpha = alpha.max(mated_in(ply));
            beta = beta.min(mate_in(ply + 1));
            if alpha >= beta {
                return alpha;
            }
        }

        let us = self.pos.side_to_move();
        let in_check = self.pos.has_check();

        // Transposition table: cutoff where the bound allows, best move
        // for ordering otherwise.
        let mut tt_move = Move::NONE;
        let mut tt_eval = VALUE_NA;
        let mut mate_threat = false;
        if self.settings.use_tt {
            if let Some(hit) = self.state.tt.probe(self.pos.zobrist(), ply) {
                self.state.stats.tt_hits += 1;
                tt_move = hit.mv;
                tt_eval = hit.eval;
                if hit.depth >= depth && !is_pv && !self.pos.check_repetition(1) {
                    let usable = match hit.bound {
                        Bound::Exact => true,
                        Bound::Alpha => hit.value <= alpha,
                        Bound::Beta => hit.value >= beta,
                    };
                    if usable {
                        self.state.stats.tt_cutoffs += 1;
                        return hit.value;
                    }
                }
            }
        }

        let static_eval = if in_check {
            VALUE_NA
        } else if tt_eval != VALUE_NA {
            tt_eval
        } else {
            self.evaluate()
        };

        if !is_pv && !in_check {
            // Razoring: hopeless nodes drop straight into quiescence.
            if self.settings.use_razoring
                && depth <= self.settings.razor_depth
                && static_eval + self.settings.razor_margin < alpha
            {
                return self.quiescence(ply, alpha, beta);
            }

            // Reverse futility: a comfortable static margin over beta
            // fails high without searching.
            if self.settings.use_reverse_futility
                && depth <= self.settings.rfp_depth
                && !is_mate_value(beta)
                && static_eval - self.settings.rfp_margin * depth >= beta
            {
                return beta;
            }

            // Null move: hand the opponent a free shot; surviving it at
            // reduced depth fails high. A mate against us from the null
            // search flags a threat for the table.
            if self.settings.use_null_move
                && allow_null
                && depth >= self.settings.null_move_depth
                && static_eval >= beta
                && self.pos.non_pawn_material(us) > 0
            {
                self.pos.do_null_move();
                let reduction = self.settings.null_move_reduction + depth / 6;
                let value = -self.search(depth - 1 - reduction, ply + 1, -beta, -beta + 1, false);
                self.pos.undo_null_move();
                if self.stopped() {
                    return VALUE_NA;
                }
                if value >= beta {
                    return beta;
                }
                if value < 0 && is_mate_value(value) {
                    mate_threat = true;
                }
            }
        }

        // Internal iterative deepening: buy a hash move for ordering.
        if self.settings.use_iid
            && is_pv
            && !tt_move.is_valid()
            && depth >= self.settings.iid_depth
        {
            let _ = self.search(depth - self.settings.iid_reduction, ply, alpha, beta, false);
            if self.stopped() {
                return VALUE_NA;
            }
            if let Some(hit) = self.state.tt.probe(self.pos.zobrist(), ply) {
                tt_move = hit.mv;
            }
        }

        {
            let generator = &mut self.state.generators[ply];
            generator.reset();
            generator.set_pv(tt_move);
        }

        let prev_move = self.pos.last_move();
        let mut best_value = -VALUE_INFINITE;
        let mut best_move = Move::NONE;
        let mut raised_alpha = false;
        let mut legal_count = 0usize;
        let mut quiet_count = 0usize;

        loop {
            let m = {
                let state = &mut *self.state;
                state.generators[ply].next(&self.pos, GenMode::All, in_check, Some(&state.history))
            };
            if !m.is_valid() {
                break;
            }

            let is_quiet =
                self.pos.piece_on(m.to()).is_none() && !m.is_en_passant() && !m.is_promotion();

            self.pos.do_move(m);
            if !self.pos.was_legal_move() {
                self.pos.undo_move();
                continue;
            }
            legal_count += 1;
            if is_quiet {
                quiet_count += 1;
            }
            let gives_check = self.pos.has_check();

            // Futility: at shallow depth a quiet move cannot lift a bad
            // static eval over alpha.
            if self.settings.use_futility
                && !is_pv
                && !in_check
                && !gives_check
                && is_quiet
                && legal_count > 1
                && depth <= self.settings.futility_depth
                && static_eval != VALUE_NA
                && static_eval + self.settings.futility_margin * depth <= alpha
            {
                self.pos.undo_move();
                continue;
            }

            // Late-move pruning: quiet tail moves at low depth.
            if self.settings.use_lmp
                && !is_pv
                && !in_check
                && !gives_check
                && is_quiet
                && depth <= self.settings.lmp_depth
                && quiet_count > self.settings.lmp_move_limit + depth as usize * 4
            {
                self.pos.undo_move();
                continue;
            }

            let extension = i32::from(self.settings.use_check_extension && gives_check);
            let new_depth = depth - 1 + extension;

            let mut value;
            if legal_count == 1 {
                value = -self.search(new_depth, ply + 1, -beta, -alpha, true);
            } else {
                let mut reduction = 0;
                if self.settings.use_lmr
                    && is_quiet
                    && !in_check
                    && !gives_check
                    && depth >= self.settings.lmr_min_depth
                    && legal_count > self.settings.lmr_min_moves
                {
                    reduction = lmr_reduction(depth, legal_count).min(new_depth - 1).max(0);
                }
                value = -self.search(new_depth - reduction, ply + 1, -alpha - 1, -alpha, true);
                if !self.stopped() && reduction > 0 && value > alpha {
                    value = -self.search(new_depth, ply + 1, -alpha - 1, -alpha, true);
                }
                if !self.stopped() && value > alpha && value < beta {
                    value = -self.search(new_depth, ply + 1, -beta, -alpha, true);
                }
            }
            self.pos.undo_move();
            if self.stopped() {
                return VALUE_NA;
            }

            if value > best_value {
                best_value = value;
                best_move = m;
                if value > alpha {
                    if value >= beta {
                        if is_quiet {
                            let state = &mut *self.state;
                            state.generators[ply].store_killer(m);
                            state.history.record_cutoff(us, m, depth);
                            state.history.store_counter(prev_move, m);
                        }
                        break;
                    }
                    alpha = value;
                    raised_alpha = true;
                    self.state.save_pv(ply, m);
                }
            }
        }

        if legal_count == 0 {
            return if in_check { mated_in(ply) } else { VALUE_DRAW };
        }

        if self.settings.use_tt && !self.stopped() {
            let bound = if best_value >= beta {
                Bound::Beta
            } else if raised_alpha {
                Bound::Exact
            } else {
                Bound::Alpha
            };
            self.state.tt.put(
                self.pos.zobrist(),
                depth,
                best_value,
                bound,
                best_move,
                mate_threat,
                static_eval,
                ply,
            );
        }
        best_value
    }
}
