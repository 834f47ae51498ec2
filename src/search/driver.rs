//! Search worker: iterative deepening, aspiration windows, root moves,
//! time watching.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::board::{
    is_mate_value, mated_in, movegen, GenMode, Move, MoveList, Position, Value, MAX_PLY,
    VALUE_DRAW, VALUE_INFINITE, VALUE_MATE,
};
use crate::config::Settings;
use crate::eval::Evaluator;

use super::{
    mate_report, DoneCallback, InfoCallback, SearchLimits, SearchReport, SearchResult,
    SearchState, Shared,
};

/// A root move with the score of its most recent search.
struct RootMove {
    mv: Move,
    value: Value,
}

/// Worker-side view of one running search.
pub(crate) struct Context<'a> {
    pub(crate) pos: Position,
    pub(crate) state: &'a mut SearchState,
    pub(crate) evaluator: &'a dyn Evaluator,
    pub(crate) settings: &'a Settings,
    pub(crate) shared: &'a Shared,
    pub(crate) node_limit: u64,
    pub(crate) hard_deadline: Option<Instant>,
}

impl Context<'_> {
    #[inline]
    pub(crate) fn stopped(&self) -> bool {
        self.shared.stopped()
    }

    /// Polled at every node entry. Flips the stop flag itself on node or
    /// hard-time overrun so enclosing frames unwind too.
    pub(crate) fn should_abort(&mut self) -> bool {
        if self.shared.stopped() {
            return true;
        }
        let nodes = self.state.stats.nodes;
        if self.node_limit > 0 && nodes >= self.node_limit {
            self.shared.stop.store(true, Ordering::Relaxed);
            return true;
        }
        if nodes & 0x3FF == 0 {
            if let Some(deadline) = self.hard_deadline {
                let extra =
                    Duration::from_millis(self.shared.extra_time_ms.load(Ordering::Relaxed));
                if Instant::now() >= deadline + extra {
                    self.shared.stop.store(true, Ordering::Relaxed);
                    return true;
                }
            }
        }
        false
    }

    #[inline]
    pub(crate) fn evaluate(&self) -> Value {
        self.evaluator.evaluate(&self.pos)
    }
}

/// Entry point of the worker thread.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run(
    pos: Position,
    mut state: SearchState,
    limits: SearchLimits,
    settings: Settings,
    evaluator: Arc<dyn Evaluator>,
    shared: Arc<Shared>,
    on_info: Option<InfoCallback>,
    on_done: Option<DoneCallback>,
) -> (SearchResult, SearchState) {
    let start = Instant::now();
    shared.signal_init_done();

    let budget = limits.time_budget(&pos);
    log::debug!(
        "search started: budget={budget:?} depth={:?} nodes={:?} infinite={} ponder={}",
        limits.depth,
        limits.nodes,
        limits.infinite,
        limits.ponder
    );

    let timer = budget.map(|b| spawn_timer(Arc::clone(&shared), limits.ponder, b));

    let result = deepen(
        pos, &mut state, &limits, &settings, &*evaluator, &shared, &on_info, start, budget,
    );

    // Infinite and unresolved-ponder searches hold their result until
    // the host releases them.
    while !shared.stopped()
        && (limits.infinite || (limits.ponder && !shared.ponder_hit.load(Ordering::Relaxed)))
    {
        thread::sleep(Duration::from_millis(2));
    }

    log::debug!(
        "search finished: best={} value={} depth={} nodes={}",
        result.best_move,
        result.best_value,
        result.search_depth,
        state.stats.nodes
    );

    if let Some(callback) = &on_done {
        callback(&result);
    }
    shared.searching.store(false, Ordering::SeqCst);
    shared.stop.store(true, Ordering::SeqCst);
    if let Some(handle) = timer {
        let _ = handle.join();
    }
    (result, state)
}

/// Watches the wall clock and flips the stop flag when the budget (plus
/// any extra time granted mid-search) runs out. A pondering search arms
/// the deadline only at the ponder hit.
fn spawn_timer(shared: Arc<Shared>, ponder: bool, budget: Duration) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("rampart-timer".to_string())
        .spawn(move || {
            let mut deadline = if ponder {
                None
            } else {
                Some(Instant::now() + budget)
            };
            loop {
                if shared.stopped() || !shared.searching.load(Ordering::Relaxed) {
                    break;
                }
                if deadline.is_none() && shared.ponder_hit.load(Ordering::Relaxed) {
                    deadline = Some(Instant::now() + budget);
                }
                if let Some(d) = deadline {
                    let extra =
                        Duration::from_millis(shared.extra_time_ms.load(Ordering::Relaxed));
                    if Instant::now() >= d + extra {
                        shared.stop.store(true, Ordering::Relaxed);
                        break;
                    }
                }
                thread::sleep(Duration::from_millis(1));
            }
        })
        .expect("spawning the search timer")
}

#[allow(clippy::too_many_arguments)]
fn deepen(
    pos: Position,
    state: &mut SearchState,
    limits: &SearchLimits,
    settings: &Settings,
    evaluator: &dyn Evaluator,
    shared: &Shared,
    on_info: &Option<InfoCallback>,
    start: Instant,
    budget: Option<Duration>,
) -> SearchResult {
    let mut ctx = Context {
        pos,
        state,
        evaluator,
        settings,
        shared,
        node_limit: limits.nodes.unwrap_or(0),
        hard_deadline: if limits.ponder {
            None
        } else {
            budget.map(|b| start + b)
        },
    };

    let mut result = SearchResult::empty();

    let mut root_moves = collect_root_moves(&mut ctx.pos, limits);
    if root_moves.is_empty() {
        result.best_value = if ctx.pos.has_check() {
            mated_in(0)
        } else {
            VALUE_DRAW
        };
        result.search_time = start.elapsed();
        return result;
    }

    let max_depth = limits
        .depth
        .unwrap_or(MAX_PLY as i32 - 1)
        .clamp(1, MAX_PLY as i32 - 1);
    let mut previous_value = 0;

    for depth in 1..=max_depth {
        if ctx.stopped() {
            break;
        }

        let (value, best) = if settings.use_aspiration && depth >= 4 && !is_mate_value(previous_value)
        {
            aspiration_search(&mut ctx, &mut root_moves, depth, previous_value, budget)
        } else {
            root_search(&mut ctx, &mut root_moves, depth, -VALUE_INFINITE, VALUE_INFINITE)
        };

        if !best.is_valid() {
            // Cancelled before the first root move finished; the
            // previous iteration stands.
            break;
        }

        adopt_iteration(&mut result, &ctx, &mut root_moves, depth, value, best, start);
        previous_value = value;

        if ctx.stopped() {
            break;
        }

        if let Some(callback) = on_info {
            callback(&report(&ctx, &result, start));
        }

        if let Some(mate) = limits.mate {
            if value > 0 && is_mate_value(value) && (VALUE_MATE - value + 1) / 2 <= mate {
                break;
            }
        }
        if root_moves.len() == 1 && limits.is_time_controlled() {
            break;
        }
        if let Some(b) = budget {
            if !limits.ponder {
                let extra =
                    Duration::from_millis(shared.extra_time_ms.load(Ordering::Relaxed));
                // Don't start an iteration unlikely to finish.
                if start.elapsed() >= (b + extra).mul_f64(0.55) {
                    break;
                }
            }
        }
    }

    result.search_time = start.elapsed();
    result
}

fn collect_root_moves(pos: &mut Position, limits: &SearchLimits) -> Vec<RootMove> {
    let legal = movegen::generate_legal(pos, GenMode::All);
    legal
        .iter()
        .filter(|m| limits.search_moves.is_empty() || limits.search_moves.contains(**m))
        .map(|m| RootMove {
            mv: *m,
            value: -VALUE_INFINITE,
        })
        .collect()
}

fn adopt_iteration(
    result: &mut SearchResult,
    ctx: &Context<'_>,
    root_moves: &mut Vec<RootMove>,
    depth: i32,
    value: Value,
    best: Move,
    start: Instant,
) {
    result.best_move = best;
    result.best_value = value;
    result.search_depth = depth;
    result.extra_depth = (ctx.state.stats.seldepth - depth).max(0);
    result.search_time = start.elapsed();

    let pv = ctx.state.pv_line(0);
    if pv.first().is_some_and(|m| m.same_move(best)) {
        result.pv = pv;
    } else {
        let mut line = MoveList::new();
        line.push(best);
        result.pv = line;
    }
    result.ponder_move = result.pv.get(1).unwrap_or(Move::NONE);

    // Feed the next iteration: best first, the rest by their scores.
    root_moves.sort_by(|a, b| b.value.cmp(&a.value));
    if let Some(idx) = root_moves.iter().position(|rm| rm.mv.same_move(best)) {
        root_moves[..=idx].rotate_right(1);
    }
}

fn report(ctx: &Context<'_>, result: &SearchResult, start: Instant) -> SearchReport {
    let elapsed = start.elapsed();
    let nodes = ctx.state.stats.nodes;
    let nps = if elapsed.as_millis() > 0 {
        nodes * 1000 / elapsed.as_millis() as u64
    } else {
        0
    };
    SearchReport {
        depth: result.search_depth,
        seldepth: ctx.state.stats.seldepth,
        value: result.best_value,
        mate_in: mate_report(result.best_value),
        nodes,
        nps,
        time: elapsed,
        hashfull: ctx.state.tt.hashfull(),
        pv: result.pv.clone(),
    }
}

/// Search with a window around the previous score, widening on fail
/// high/low. A fail low also buys extra time.
fn aspiration_search(
    ctx: &mut Context<'_>,
    root_moves: &mut [RootMove],
    depth: i32,
    previous: Value,
    budget: Option<Duration>,
) -> (Value, Move) {
    let mut delta = ctx.settings.aspiration_width.max(10);
    let mut alpha = (previous - delta).max(-VALUE_INFINITE);
    let mut beta = (previous + delta).min(VALUE_INFINITE);

    loop {
        let (value, best) = root_search(ctx, root_moves, depth, alpha, beta);
        if ctx.stopped() || is_mate_value(value) {
            return (value, best);
        }
        if value <= alpha {
            if let Some(b) = budget {
                ctx.shared
                    .extra_time_ms
                    .fetch_add(b.as_millis() as u64 / 4, Ordering::Relaxed);
            }
            alpha = (value - delta).max(-VALUE_INFINITE);
            delta = delta.saturating_mul(2);
        } else if value >= beta {
            beta = (value + delta).min(VALUE_INFINITE);
            delta = delta.saturating_mul(2);
        } else {
            return (value, best);
        }
        if delta > 1000 {
            alpha = -VALUE_INFINITE;
            beta = VALUE_INFINITE;
        }
    }
}

/// One iteration over the root moves with the PVS pattern. Returns the
/// best value and move completed this call; `Move::NONE` when cancelled
/// before any root move finished.
fn root_search(
    ctx: &mut Context<'_>,
    root_moves: &mut [RootMove],
    depth: i32,
    mut alpha: Value,
    beta: Value,
) -> (Value, Move) {
    ctx.state.pv_len[0] = 0;
    let mut best_value = -VALUE_INFINITE;
    let mut best_move = Move::NONE;

    for i in 0..root_moves.len() {
        let m = root_moves[i].mv;
        ctx.pos.do_move(m);
        let value = if i == 0 {
            -ctx.search(depth - 1, 1, -beta, -alpha, true)
        } else {
            let probe = -ctx.search(depth - 1, 1, -alpha - 1, -alpha, true);
            if !ctx.stopped() && probe > alpha && probe < beta {
                -ctx.search(depth - 1, 1, -beta, -alpha, true)
            } else {
                probe
            }
        };
        ctx.pos.undo_move();
        if ctx.stopped() {
            break;
        }

        root_moves[i].value = value;
        if value > best_value {
            best_value = value;
            best_move = m;
            if value > alpha {
                alpha = value;
                ctx.state.save_pv(0, m);
                if alpha >= beta {
                    // Fail high against an aspiration window; the caller
                    // re-searches with a wider one.
                    break;
                }
            }
        }
    }
    (best_value, best_move)
}
