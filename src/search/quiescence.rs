//! Quiescence search: play out captures (and every move while in check)
//! until the position is quiet enough to trust the static eval.

use crate::board::{
    mated_in, movegen, GenMode, Move, Value, MAX_PLY, VALUE_DRAW, VALUE_INFINITE, VALUE_NA,
};
use crate::see::see;
use crate::tt::Bound;

use super::driver::Context;

impl Context<'_> {
    pub(crate) fn quiescence(&mut self, ply: usize, mut alpha: Value, beta: Value) -> Value {
        if self.should_abort() {
            return VALUE_NA;
        }
        self.state.stats.nodes += 1;
        if ply as i32 > self.state.stats.seldepth {
            self.state.stats.seldepth = ply as i32;
        }
        if ply >= MAX_PLY {
            return self.evaluate();
        }
        self.state.pv_len[ply] = 0;

        if self.pos.check_repetition(2)
            || self.pos.fifty_move_draw()
            || self.pos.insufficient_material()
        {
            return VALUE_DRAW;
        }

        let is_pv = beta - alpha > 1;
        let in_check = self.pos.has_check();

        let mut tt_move = Move::NONE;
        let mut tt_eval = VALUE_NA;
        if self.settings.use_tt {
            if let Some(hit) = self.state.tt.probe(self.pos.zobrist(), ply) {
                self.state.stats.tt_hits += 1;
                tt_move = hit.mv;
                tt_eval = hit.eval;
                if !is_pv {
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

        let mut best_value;
        let static_eval;
        if in_check {
            // No stand-pat while in check; every evasion is searched.
            static_eval = VALUE_NA;
            best_value = -VALUE_INFINITE;
        } else {
            static_eval = if tt_eval != VALUE_NA {
                tt_eval
            } else {
                self.evaluate()
            };
            if static_eval >= beta {
                return beta;
            }
            if static_eval > alpha {
                alpha = static_eval;
            }
            best_value = static_eval;
        }

        // In check the generation switches to all evasions, which is the
        // quiescence form of a check extension.
        let mode = if in_check { GenMode::All } else { GenMode::NonQuiet };
        let moves = movegen::generate_pseudo_legal(&self.pos, mode, in_check);

        let mut best_move = Move::NONE;
        let mut raised_alpha = false;
        let mut legal_count = 0usize;

        let mut order: Vec<usize> = (0..moves.len()).collect();
        if tt_move.is_valid() {
            if let Some(idx) = order.iter().position(|&i| moves[i].same_move(tt_move)) {
                order[..=idx].rotate_right(1);
            }
        }

        for idx in order {
            let m = moves[idx];

            // Skip captures that lose material outright.
            if !in_check && self.settings.use_see_filter && see(&self.pos, m) < 0 {
                continue;
            }

            self.pos.do_move(m);
            if !self.pos.was_legal_move() {
                self.pos.undo_move();
                continue;
            }
            legal_count += 1;

            let value = -self.quiescence(ply + 1, -beta, -alpha);
            self.pos.undo_move();
            if self.stopped() {
                return VALUE_NA;
            }

            if value > best_value {
                best_value = value;
                best_move = m;
                if value > alpha {
                    if value >= beta {
                        break;
                    }
                    alpha = value;
                    raised_alpha = true;
                    if is_pv {
                        self.state.save_pv(ply, m);
                    }
                }
            }
        }

        if in_check && legal_count == 0 {
            return mated_in(ply);
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
                0,
                best_value,
                bound,
                best_move,
                false,
                static_eval,
                ply,
            );
        }
        best_value
    }
}
