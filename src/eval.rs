//! Static evaluation.
//!
//! The search only knows the [`Evaluator`] trait; the engine ships the
//! classic tapered material + piece-square evaluator working off the
//! position's incremental accumulators, with tempo and a light mobility
//! term as options.

use crate::board::attack_tables::get_attacks;
use crate::board::{Color, PieceType, Position, Value, GAME_PHASE_MAX};
use crate::config::Settings;

/// A static position evaluator. Scores are centipawns from the side to
/// move's point of view.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, pos: &Position) -> Value;
}

/// Material + tapered piece-square evaluation.
pub struct ClassicEvaluator {
    pub use_material: bool,
    pub use_positional: bool,
    pub use_mobility: bool,
    pub tempo: Value,
}

const MOBILITY_WEIGHT: Value = 2;

impl ClassicEvaluator {
    #[must_use]
    pub fn new() -> Self {
        ClassicEvaluator {
            use_material: true,
            use_positional: true,
            use_mobility: false,
            tempo: 10,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        ClassicEvaluator {
            use_material: settings.eval_material,
            use_positional: settings.eval_positional,
            use_mobility: settings.eval_mobility,
            tempo: settings.eval_tempo,
        }
    }

    /// Pseudo-mobility: attacked squares not blocked by own pieces.
    fn mobility(pos: &Position, color: Color) -> Value {
        let mut count = 0;
        let occupied = pos.all_occupied();
        let own = pos.occupied(color);
        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
        ] {
            for sq in pos.pieces(color, pt).iter() {
                count += get_attacks(pt, sq, occupied).and(own.not()).popcount() as Value;
            }
        }
        count
    }
}

impl Default for ClassicEvaluator {
    fn default() -> Self {
        ClassicEvaluator::new()
    }
}

impl Evaluator for ClassicEvaluator {
    fn evaluate(&self, pos: &Position) -> Value {
        let mut white = 0;

        if self.use_material {
            white += pos.material(Color::White) - pos.material(Color::Black);
        }

        if self.use_positional {
            let phase = pos.game_phase();
            let mg = pos.psq_mg(Color::White) - pos.psq_mg(Color::Black);
            let eg = pos.psq_eg(Color::White) - pos.psq_eg(Color::Black);
            white += (mg * phase + eg * (GAME_PHASE_MAX - phase)) / GAME_PHASE_MAX;
        }

        if self.use_mobility {
            white += MOBILITY_WEIGHT
                * (Self::mobility(pos, Color::White) - Self::mobility(pos, Color::Black));
        }

        let side_relative = match pos.side_to_move() {
            Color::White => white,
            Color::Black => -white,
        };
        side_relative + self.tempo
    }
}
