//! Process-wide engine settings.
//!
//! Every recognised option is a field here; the UCI `setoption` handler
//! mutates an instance and the next search picks it up. Defaults play
//! correctly with no configuration at all.

use crate::board::Value;

#[derive(Clone, Debug)]
pub struct Settings {
    /// Transposition table budget in megabytes.
    pub hash_mb: usize,
    /// Whether the GUI may ponder with this engine.
    pub ponder: bool,

    // Opening book fields are recognised for the book collaborator; the
    // core never reads them.
    pub book_enabled: bool,
    pub book_path: String,
    pub book_format: String,

    // Search feature toggles and their numeric parameters.
    pub use_tt: bool,
    pub use_aspiration: bool,
    pub aspiration_width: Value,
    pub use_mate_distance_pruning: bool,
    pub use_razoring: bool,
    pub razor_depth: i32,
    pub razor_margin: Value,
    pub use_reverse_futility: bool,
    pub rfp_depth: i32,
    pub rfp_margin: Value,
    pub use_null_move: bool,
    pub null_move_depth: i32,
    pub null_move_reduction: i32,
    pub use_iid: bool,
    pub iid_depth: i32,
    pub iid_reduction: i32,
    pub use_futility: bool,
    pub futility_depth: i32,
    pub futility_margin: Value,
    pub use_lmp: bool,
    pub lmp_depth: i32,
    pub lmp_move_limit: usize,
    pub use_lmr: bool,
    pub lmr_min_depth: i32,
    pub lmr_min_moves: usize,
    pub use_see_filter: bool,
    pub use_check_extension: bool,

    // Evaluator toggles.
    pub eval_material: bool,
    pub eval_positional: bool,
    pub eval_mobility: bool,
    pub eval_tempo: Value,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hash_mb: 64,
            ponder: false,
            book_enabled: false,
            book_path: String::new(),
            book_format: String::new(),
            use_tt: true,
            use_aspiration: true,
            aspiration_width: 50,
            use_mate_distance_pruning: true,
            use_razoring: true,
            razor_depth: 2,
            razor_margin: 250,
            use_reverse_futility: true,
            rfp_depth: 6,
            rfp_margin: 100,
            use_null_move: true,
            null_move_depth: 3,
            null_move_reduction: 3,
            use_iid: true,
            iid_depth: 6,
            iid_reduction: 2,
            use_futility: true,
            futility_depth: 4,
            futility_margin: 150,
            use_lmp: true,
            lmp_depth: 3,
            lmp_move_limit: 12,
            use_lmr: true,
            lmr_min_depth: 3,
            lmr_min_moves: 3,
            use_see_filter: true,
            use_check_extension: true,
            eval_material: true,
            eval_positional: true,
            eval_mobility: false,
            eval_tempo: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_playable() {
        let settings = Settings::default();
        assert!(settings.hash_mb >= 1);
        assert!(settings.use_tt);
        assert!(settings.null_move_depth > 0);
        assert!(settings.aspiration_width > 0);
        assert!(!settings.book_enabled);
    }
}
