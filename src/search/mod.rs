//! Search engine: lifecycle, limits, results.
//!
//! One [`Search`] owns the transposition table and ordering tables
//! across searches. `start` hands them to a dedicated worker thread
//! together with a copy of the position; `stop`/`wait_until_done` join
//! the worker and take them back along with the result. The caller and
//! the worker only ever share a handful of atomic flags.

mod alpha_beta;
mod driver;
mod limits;
mod quiescence;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::board::{
    mate_distance, is_mate_value, Move, MoveGenerator, MoveList, Position, Value, MAX_PLY,
};
use crate::config::Settings;
use crate::eval::{ClassicEvaluator, Evaluator};
use crate::history::History;
use crate::tt::TranspositionTable;

pub use limits::SearchLimits;

/// Starting a search while one is running is a caller bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    AlreadySearching,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::AlreadySearching => write!(f, "a search is already running"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Final answer of one `start` call.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    /// Expected reply, for pondering.
    pub ponder_move: Move,
    pub best_value: Value,
    pub search_time: Duration,
    /// Last fully completed iteration depth.
    pub search_depth: i32,
    /// Selective depth beyond `search_depth` reached in quiescence.
    pub extra_depth: i32,
    /// True when the move came from an opening book, never from the
    /// search itself.
    pub book_move: bool,
    pub pv: MoveList,
}

impl SearchResult {
    fn empty() -> Self {
        SearchResult {
            best_move: Move::NONE,
            ponder_move: Move::NONE,
            best_value: 0,
            search_time: Duration::ZERO,
            search_depth: 0,
            extra_depth: 0,
            book_move: false,
            pv: MoveList::new(),
        }
    }
}

/// Progress snapshot emitted after each completed iteration.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub depth: i32,
    pub seldepth: i32,
    pub value: Value,
    /// Signed full moves to mate when the score is a mate score.
    pub mate_in: Option<i32>,
    pub nodes: u64,
    pub nps: u64,
    pub time: Duration,
    pub hashfull: u32,
    pub pv: MoveList,
}

pub type InfoCallback = Arc<dyn Fn(&SearchReport) + Send + Sync>;
pub type DoneCallback = Arc<dyn Fn(&SearchResult) + Send + Sync>;

/// Counters accumulated by the worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub seldepth: i32,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
}

/// Tables and scratch space that survive between searches.
pub struct SearchState {
    pub tt: TranspositionTable,
    pub history: History,
    pub(crate) generators: Vec<MoveGenerator>,
    pub(crate) pv: Box<[[Move; MAX_PLY]; MAX_PLY]>,
    pub(crate) pv_len: [usize; MAX_PLY],
    pub stats: SearchStats,
}

impl SearchState {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        SearchState {
            tt: TranspositionTable::new(hash_mb),
            history: History::new(),
            generators: (0..MAX_PLY).map(|_| MoveGenerator::new()).collect(),
            pv: Box::new([[Move::NONE; MAX_PLY]; MAX_PLY]),
            pv_len: [0; MAX_PLY],
            stats: SearchStats::default(),
        }
    }

    pub(crate) fn save_pv(&mut self, ply: usize, m: Move) {
        let child_len = if ply + 1 < MAX_PLY {
            self.pv_len[ply + 1]
        } else {
            0
        };
        let (head, tail) = self.pv.split_at_mut(ply + 1);
        head[ply][0] = m;
        for i in 0..child_len.min(MAX_PLY - ply - 1) {
            head[ply][i + 1] = tail[0][i];
        }
        self.pv_len[ply] = (child_len + 1).min(MAX_PLY - ply);
    }

    pub(crate) fn pv_line(&self, ply: usize) -> MoveList {
        let mut line = MoveList::new();
        for i in 0..self.pv_len[ply] {
            line.push(self.pv[ply][i]);
        }
        line
    }
}

/// Flags shared between the caller, the worker and the timer.
pub(crate) struct Shared {
    pub(crate) stop: AtomicBool,
    pub(crate) searching: AtomicBool,
    pub(crate) ponder_hit: AtomicBool,
    /// Budget added mid-search (fail lows), milliseconds.
    pub(crate) extra_time_ms: AtomicU64,
    init_done: Mutex<bool>,
    init_cv: Condvar,
}

impl Shared {
    fn new() -> Self {
        Shared {
            stop: AtomicBool::new(false),
            searching: AtomicBool::new(false),
            ponder_hit: AtomicBool::new(false),
            extra_time_ms: AtomicU64::new(0),
            init_done: Mutex::new(false),
            init_cv: Condvar::new(),
        }
    }

    pub(crate) fn signal_init_done(&self) {
        let mut done = self.init_done.lock();
        *done = true;
        self.init_cv.notify_all();
    }

    fn wait_init_done(&self) {
        let mut done = self.init_done.lock();
        while !*done {
            self.init_cv.wait(&mut done);
        }
    }

    pub(crate) fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// The search engine.
pub struct Search {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<(SearchResult, SearchState)>>,
    state: Option<SearchState>,
    settings: Settings,
    evaluator: Arc<dyn Evaluator>,
    on_info: Option<InfoCallback>,
    on_done: Option<DoneCallback>,
    last_result: Option<SearchResult>,
}

impl Search {
    /// Engine with the default evaluator and settings.
    #[must_use]
    pub fn new() -> Self {
        Search::with_settings(Settings::default())
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        let evaluator: Arc<dyn Evaluator> =
            Arc::new(ClassicEvaluator::from_settings(&settings));
        Search::with_evaluator(settings, evaluator)
    }

    /// Inject a different evaluator.
    #[must_use]
    pub fn with_evaluator(settings: Settings, evaluator: Arc<dyn Evaluator>) -> Self {
        Search {
            shared: Arc::new(Shared::new()),
            worker: None,
            state: Some(SearchState::new(settings.hash_mb)),
            settings,
            evaluator,
            on_info: None,
            on_done: None,
            last_result: None,
        }
    }

    /// Install the per-iteration progress callback.
    pub fn set_info_callback(&mut self, callback: InfoCallback) {
        self.on_info = Some(callback);
    }

    /// Install the completion callback, invoked by the worker right
    /// before it finishes.
    pub fn set_done_callback(&mut self, callback: DoneCallback) {
        self.on_done = Some(callback);
    }

    /// Replace the settings; takes effect on the next `start`. Resizes
    /// the transposition table when the hash budget changed.
    pub fn set_settings(&mut self, settings: Settings) {
        let resize = settings.hash_mb != self.settings.hash_mb;
        self.settings = settings;
        self.evaluator = Arc::new(ClassicEvaluator::from_settings(&self.settings));
        if resize {
            if let Some(state) = self.state.as_mut() {
                state.tt.resize(self.settings.hash_mb);
            }
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Begin a search on a worker thread. Returns once the worker has
    /// taken over the position and limits, at which point
    /// [`Search::is_searching`] is true and [`Search::stop`] is
    /// effective.
    ///
    /// The position is copied; the caller keeps mutating its own.
    pub fn start(&mut self, pos: &Position, limits: SearchLimits) -> Result<(), SearchError> {
        if self.is_searching() {
            return Err(SearchError::AlreadySearching);
        }
        self.collect_finished_worker();

        let mut state = self
            .state
            .take()
            .unwrap_or_else(|| SearchState::new(self.settings.hash_mb));
        state.tt.age_entries();
        state.stats = SearchStats::default();

        self.shared.stop.store(false, Ordering::SeqCst);
        self.shared.ponder_hit.store(false, Ordering::SeqCst);
        self.shared.extra_time_ms.store(0, Ordering::SeqCst);
        self.shared.searching.store(true, Ordering::SeqCst);
        *self.shared.init_done.lock() = false;

        let position = pos.clone();
        let shared = Arc::clone(&self.shared);
        let evaluator = Arc::clone(&self.evaluator);
        let settings = self.settings.clone();
        let on_info = self.on_info.clone();
        let on_done = self.on_done.clone();

        let handle = std::thread::Builder::new()
            .name("rampart-search".to_string())
            .spawn(move || {
                driver::run(
                    position, state, limits, settings, evaluator, shared, on_info, on_done,
                )
            })
            .expect("spawning the search worker");
        self.worker = Some(handle);

        self.shared.wait_init_done();
        Ok(())
    }

    /// Request cancellation and block until the result is in.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.wait_until_done();
    }

    /// Tell a pondering search that the predicted move was played; time
    /// control starts now.
    pub fn ponder_hit(&self) {
        self.shared.ponder_hit.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.shared.searching.load(Ordering::SeqCst)
    }

    /// Block until the worker has delivered its result.
    pub fn wait_until_done(&mut self) {
        self.collect_finished_worker();
    }

    /// The result of the most recently completed search.
    #[must_use]
    pub fn last_result(&self) -> Option<&SearchResult> {
        self.last_result.as_ref()
    }

    /// Forget everything learned: clear the transposition table, the
    /// history tables and the ageing counter.
    pub fn new_game(&mut self) {
        self.collect_finished_worker();
        if let Some(state) = self.state.as_mut() {
            state.tt.clear();
            state.history.clear();
        }
        self.last_result = None;
    }

    fn collect_finished_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            let (result, state) = handle.join().expect("search worker never panics");
            self.last_result = Some(result);
            self.state = Some(state);
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Search::new()
    }
}

/// Report helper: translate a score into the UCI mate distance field.
#[must_use]
pub fn mate_report(value: Value) -> Option<i32> {
    if is_mate_value(value) {
        Some(mate_distance(value))
    } else {
        None
    }
}
