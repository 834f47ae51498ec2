//! Piece-square tables for the positional accumulators.
//!
//! Tables are written visually, rank 8 at the top, from White's point of
//! view; lookups mirror the square for White and use it directly for
//! Black so both colors read the same geometry.

use super::types::{Color, PieceType, Square, Value};

#[rustfmt::skip]
static KING_MG: [Value; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

#[rustfmt::skip]
static KING_EG: [Value; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];

#[rustfmt::skip]
static PAWN_MG: [Value; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     50,  50,  50,  50,  50,  50,  50,  50,
     10,  10,  20,  30,  30,  20,  10,  10,
      5,   5,  10,  25,  25,  10,   5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      5,  10,  10, -20, -20,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
static PAWN_EG: [Value; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     80,  80,  80,  80,  80,  80,  80,  80,
     50,  50,  50,  50,  50,  50,  50,  50,
     30,  30,  30,  30,  30,  30,  30,  30,
     20,  20,  20,  20,  20,  20,  20,  20,
     10,  10,  10,  10,  10,  10,  10,  10,
     10,  10,  10,  10,  10,  10,  10,  10,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
static KNIGHT_MG: [Value; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
static KNIGHT_EG: [Value; 64] = [
    -40, -30, -20, -20, -20, -20, -30, -40,
    -30, -10,   0,   0,   0,   0, -10, -30,
    -20,   0,  10,  10,  10,  10,   0, -20,
    -20,   0,  10,  15,  15,  10,   0, -20,
    -20,   0,  10,  15,  15,  10,   0, -20,
    -20,   0,  10,  10,  10,  10,   0, -20,
    -30, -10,   0,   0,   0,   0, -10, -30,
    -40, -30, -20, -20, -20, -20, -30, -40,
];

#[rustfmt::skip]
static BISHOP_MG: [Value; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
static BISHOP_EG: [Value; 64] = [
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,  10,  10,   5,   0,  -5,
     -5,   0,   5,  10,  10,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
];

#[rustfmt::skip]
static ROOK_MG: [Value; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10,  10,  10,  10,  10,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
];

#[rustfmt::skip]
static ROOK_EG: [Value; 64] = [
      5,   5,   5,   5,   5,   5,   5,   5,
     10,  10,  10,  10,  10,  10,  10,  10,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
static QUEEN_MG: [Value; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
static QUEEN_EG: [Value; 64] = [
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,  10,  10,   5,   0,  -5,
     -5,   0,   5,  10,  10,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
    -10,  -5,  -5,  -5,  -5,  -5,  -5, -10,
];

fn table_mg(pt: PieceType) -> &'static [Value; 64] {
    match pt {
        PieceType::King => &KING_MG,
        PieceType::Pawn => &PAWN_MG,
        PieceType::Knight => &KNIGHT_MG,
        PieceType::Bishop => &BISHOP_MG,
        PieceType::Rook => &ROOK_MG,
        PieceType::Queen => &QUEEN_MG,
    }
}

fn table_eg(pt: PieceType) -> &'static [Value; 64] {
    match pt {
        PieceType::King => &KING_EG,
        PieceType::Pawn => &PAWN_EG,
        PieceType::Knight => &KNIGHT_EG,
        PieceType::Bishop => &BISHOP_EG,
        PieceType::Rook => &ROOK_EG,
        PieceType::Queen => &QUEEN_EG,
    }
}

/// The visual tables put rank 8 first, so White squares are mirrored.
#[inline]
fn table_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.index() ^ 56,
        Color::Black => sq.index(),
    }
}

/// Middlegame positional score for a piece of `color` on `sq`.
#[inline]
#[must_use]
pub(crate) fn psq_mg(pt: PieceType, color: Color, sq: Square) -> Value {
    table_mg(pt)[table_index(color, sq)]
}

/// Endgame positional score for a piece of `color` on `sq`.
#[inline]
#[must_use]
pub(crate) fn psq_eg(pt: PieceType, color: Color, sq: Square) -> Value {
    table_eg(pt)[table_index(color, sq)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_color_symmetric() {
        for pt in crate::board::PIECE_TYPES {
            for idx in 0..64 {
                let sq = Square::from_index(idx);
                let mirror = sq.flip_vertical();
                assert_eq!(
                    psq_mg(pt, Color::White, sq),
                    psq_mg(pt, Color::Black, mirror)
                );
                assert_eq!(
                    psq_eg(pt, Color::White, sq),
                    psq_eg(pt, Color::Black, mirror)
                );
            }
        }
    }

    #[test]
    fn test_center_pawn_push_gains() {
        // e4 is worth more than e2 for a white pawn in the middlegame
        let e2 = Square::new(1, 4);
        let e4 = Square::new(3, 4);
        assert!(psq_mg(PieceType::Pawn, Color::White, e4) > psq_mg(PieceType::Pawn, Color::White, e2));
    }

    #[test]
    fn test_king_prefers_corner_in_middlegame_center_in_endgame() {
        let g1 = Square::new(0, 6);
        let e4 = Square::new(3, 4);
        assert!(psq_mg(PieceType::King, Color::White, g1) > psq_mg(PieceType::King, Color::White, e4));
        assert!(psq_eg(PieceType::King, Color::White, e4) > psq_eg(PieceType::King, Color::White, g1));
    }
}
