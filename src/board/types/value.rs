//! Centipawn score type and the mate-score encoding.

/// Centipawn score. Positive is good for the side to move.
pub type Value = i32;

/// Draw score.
pub const VALUE_DRAW: Value = 0;

/// Checkmate score before ply adjustment. A mate found at ply `p` scores
/// `VALUE_MATE - p`, so shallower mates outrank deeper ones.
pub const VALUE_MATE: Value = 10_000;

/// Upper bound for any score; used as the open alpha-beta window.
pub const VALUE_INFINITE: Value = 15_000;

/// Not-available sentinel. Returned by cancelled search frames; never a
/// legitimate evaluation.
pub const VALUE_NA: Value = -VALUE_INFINITE - 1;

/// Hard ceiling on search depth in plies.
pub const MAX_PLY: usize = 128;

/// Scores beyond this threshold encode a forced mate.
pub const VALUE_MATE_THRESHOLD: Value = VALUE_MATE - MAX_PLY as Value;

/// Score for delivering mate at the given ply.
#[inline]
#[must_use]
pub const fn mate_in(ply: usize) -> Value {
    VALUE_MATE - ply as Value
}

/// Score for being mated at the given ply.
#[inline]
#[must_use]
pub const fn mated_in(ply: usize) -> Value {
    -VALUE_MATE + ply as Value
}

/// Whether a score encodes a forced mate for either side.
#[inline]
#[must_use]
pub const fn is_mate_value(v: Value) -> bool {
    v.abs() > VALUE_MATE_THRESHOLD && v.abs() <= VALUE_MATE
}

/// Full moves until mate, signed from the point of view of the side to
/// move. Used for UCI `score mate N` reporting.
#[inline]
#[must_use]
pub const fn mate_distance(v: Value) -> i32 {
    if v > 0 {
        (VALUE_MATE - v + 1) / 2
    } else {
        -(VALUE_MATE + v + 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_encoding_prefers_shallow_mates() {
        assert!(mate_in(3) > mate_in(5));
        assert!(mated_in(3) < mated_in(5));
        assert_eq!(mate_in(0), VALUE_MATE);
        assert_eq!(mated_in(0), -VALUE_MATE);
    }

    #[test]
    fn test_is_mate_value() {
        assert!(is_mate_value(mate_in(5)));
        assert!(is_mate_value(mated_in(5)));
        assert!(!is_mate_value(VALUE_DRAW));
        assert!(!is_mate_value(500));
        assert!(!is_mate_value(VALUE_NA));
    }

    #[test]
    fn test_mate_distance() {
        // Mate in 3 plies is mate in 2 full moves for the mover
        assert_eq!(mate_distance(mate_in(3)), 2);
        assert_eq!(mate_distance(mate_in(1)), 1);
        assert_eq!(mate_distance(mated_in(2)), -1);
    }

    #[test]
    fn test_sentinel_outside_window() {
        assert!(VALUE_NA < -VALUE_INFINITE);
        assert!(VALUE_MATE < VALUE_INFINITE);
    }
}
