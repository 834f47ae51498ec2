//! Pre-computed attack tables and board geometry masks.
//!
//! Everything here is process-wide and immutable after first touch. Call
//! [`init`] once at program start so no lookup pays the build cost later.

mod magics;

use once_cell::sync::Lazy;

use self::magics::SliderAttacks;
use super::types::{Bitboard, Color, PieceType, Square};

/// The eight compass directions as (rank delta, file delta), clockwise
/// from north. Index order matters for the ray tables.
pub const DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),   // N
    (1, 1),   // NE
    (0, 1),   // E
    (-1, 1),  // SE
    (-1, 0),  // S
    (-1, -1), // SW
    (0, -1),  // W
    (1, -1),  // NW
];

pub(crate) const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
pub(crate) const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

static KNIGHT_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    leaper_attacks(&[
        (2, 1),
        (1, 2),
        (-1, 2),
        (-2, 1),
        (-2, -1),
        (-1, -2),
        (1, -2),
        (2, -1),
    ])
});

static KING_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| leaper_attacks(&DIRECTIONS));

/// pawn_attacks[color][square]: squares a pawn of `color` on `square` attacks.
static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    let mut tables = [[Bitboard::EMPTY; 64]; 2];
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        for color in Color::BOTH {
            let mut bb = Bitboard::EMPTY;
            for df in [-1, 1] {
                if let Some(target) = sq.step(color.forward(), df) {
                    bb.set(target);
                }
            }
            tables[color.index()][idx] = bb;
        }
    }
    tables
});

/// rays[direction][square]: all squares from `square` to the edge.
static RAYS: Lazy<[[Bitboard; 64]; 8]> = Lazy::new(|| {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    for (dir, &(dr, df)) in DIRECTIONS.iter().enumerate() {
        for idx in 0..64 {
            let mut bb = Bitboard::EMPTY;
            let mut current = Square::from_index(idx);
            while let Some(next) = current.step(dr, df) {
                bb.set(next);
                current = next;
            }
            rays[dir][idx] = bb;
        }
    }
    rays
});

/// between[a][b]: squares strictly between two squares sharing a rank,
/// file or diagonal; empty otherwise.
static BETWEEN: Lazy<Box<[[Bitboard; 64]; 64]>> = Lazy::new(|| {
    let mut between = Box::new([[Bitboard::EMPTY; 64]; 64]);
    for from in 0..64 {
        for (dir, _) in DIRECTIONS.iter().enumerate() {
            let ray = RAYS[dir][from];
            for to_sq in ray.iter() {
                let opposite = (dir + 4) % 8;
                between[from][to_sq.index()] = ray.and(RAYS[opposite][to_sq.index()]);
            }
        }
    }
    between
});

/// passed_pawn_masks[color][square]: own file plus neighbours, every rank
/// in front of the pawn.
static PASSED_PAWN_MASKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    let mut masks = [[Bitboard::EMPTY; 64]; 2];
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        let files = neighbour_files(sq.file()).or(Bitboard::file_mask(sq.file()));
        for color in Color::BOTH {
            let mut front = Bitboard::EMPTY;
            let mut rank = sq.rank() as i8 + color.forward();
            while (0..8).contains(&rank) {
                front = front.or(Bitboard::rank_mask(rank as usize));
                rank += color.forward();
            }
            masks[color.index()][idx] = files.and(front);
        }
    }
    masks
});

/// Chebyshev distance from each square to the nearest center square.
static CENTER_DISTANCE: Lazy<[u32; 64]> = Lazy::new(|| {
    let center = [
        Square::new(3, 3),
        Square::new(3, 4),
        Square::new(4, 3),
        Square::new(4, 4),
    ];
    let mut dist = [0u32; 64];
    for (idx, slot) in dist.iter_mut().enumerate() {
        let sq = Square::from_index(idx);
        *slot = center.iter().map(|c| sq.distance(*c)).min().unwrap_or(0);
    }
    dist
});

static ROOK_TABLES: Lazy<SliderAttacks> = Lazy::new(|| SliderAttacks::new(ROOK_DIRECTIONS, 0x0041));
static BISHOP_TABLES: Lazy<SliderAttacks> =
    Lazy::new(|| SliderAttacks::new(BISHOP_DIRECTIONS, 0x0042));

fn leaper_attacks(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut tables = [Bitboard::EMPTY; 64];
    for (idx, slot) in tables.iter_mut().enumerate() {
        let sq = Square::from_index(idx);
        let mut bb = Bitboard::EMPTY;
        for &(dr, df) in offsets {
            if let Some(target) = sq.step(dr, df) {
                bb.set(target);
            }
        }
        *slot = bb;
    }
    tables
}

/// Build every table. Idempotent; meant to run once at program start so
/// the first search does not pay for the magic-number hunt.
pub fn init() {
    Lazy::force(&KNIGHT_ATTACKS);
    Lazy::force(&KING_ATTACKS);
    Lazy::force(&PAWN_ATTACKS);
    Lazy::force(&RAYS);
    Lazy::force(&BETWEEN);
    Lazy::force(&PASSED_PAWN_MASKS);
    Lazy::force(&CENTER_DISTANCE);
    Lazy::force(&ROOK_TABLES);
    Lazy::force(&BISHOP_TABLES);
}

/// Attack bitboard for any non-pawn piece. Knight and king ignore
/// `occupied`; the sliders resolve blockers through the magic tables.
///
/// # Panics
/// Debug-asserts that `pt` is not a pawn; use [`pawn_attacks`] for pawns.
#[inline]
#[must_use]
pub fn get_attacks(pt: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
    debug_assert!(pt != PieceType::Pawn, "pawn attacks are color-dependent");
    match pt {
        PieceType::Knight => KNIGHT_ATTACKS[sq.index()],
        PieceType::King => KING_ATTACKS[sq.index()],
        PieceType::Bishop => BISHOP_TABLES.attacks(sq, occupied),
        PieceType::Rook => ROOK_TABLES.attacks(sq, occupied),
        PieceType::Queen => BISHOP_TABLES
            .attacks(sq, occupied)
            .or(ROOK_TABLES.attacks(sq, occupied)),
        PieceType::Pawn => Bitboard::EMPTY,
    }
}

/// Squares a pawn of `color` on `sq` attacks.
#[inline]
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index()]
}

/// Squares strictly between `a` and `b` when they share a line; empty
/// otherwise.
#[inline]
#[must_use]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.index()][b.index()]
}

/// Ray from `sq` to the board edge in the given [`DIRECTIONS`] index.
#[inline]
#[must_use]
pub fn ray(direction: usize, sq: Square) -> Bitboard {
    RAYS[direction][sq.index()]
}

/// Mask a pawn must clear of enemy pawns to be passed.
#[inline]
#[must_use]
pub fn passed_pawn_mask(color: Color, sq: Square) -> Bitboard {
    PASSED_PAWN_MASKS[color.index()][sq.index()]
}

/// The files adjacent to `file`.
#[inline]
#[must_use]
pub fn neighbour_files(file: usize) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    if file > 0 {
        bb = bb.or(Bitboard::file_mask(file - 1));
    }
    if file < 7 {
        bb = bb.or(Bitboard::file_mask(file + 1));
    }
    bb
}

/// Chebyshev distance to the nearest of d4, e4, d5, e5.
#[inline]
#[must_use]
pub fn center_distance(sq: Square) -> u32 {
    CENTER_DISTANCE[sq.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knight_attacks() {
        // Knight on a1 reaches b3 and c2 only
        let attacks = get_attacks(PieceType::Knight, Square::new(0, 0), Bitboard::ALL);
        assert_eq!(attacks.popcount(), 2);
        assert!(attacks.contains(Square::new(2, 1)));
        assert!(attacks.contains(Square::new(1, 2)));

        // Knight in the middle reaches all eight targets
        let attacks = get_attacks(PieceType::Knight, Square::new(3, 4), Bitboard::EMPTY);
        assert_eq!(attacks.popcount(), 8);
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(
            get_attacks(PieceType::King, Square::new(0, 0), Bitboard::EMPTY).popcount(),
            3
        );
        assert_eq!(
            get_attacks(PieceType::King, Square::new(3, 4), Bitboard::EMPTY).popcount(),
            8
        );
    }

    #[test]
    fn test_pawn_attacks() {
        let white = pawn_attacks(Color::White, Square::new(1, 4));
        assert!(white.contains(Square::new(2, 3)));
        assert!(white.contains(Square::new(2, 5)));
        assert_eq!(white.popcount(), 2);

        // Edge pawn attacks one square; no wrap to the other side
        let edge = pawn_attacks(Color::White, Square::new(1, 0));
        assert_eq!(edge.popcount(), 1);
        assert!(edge.contains(Square::new(2, 1)));

        let black = pawn_attacks(Color::Black, Square::new(6, 4));
        assert!(black.contains(Square::new(5, 3)));
        assert!(black.contains(Square::new(5, 5)));
    }

    #[test]
    fn test_rook_attacks_empty_board() {
        let attacks = get_attacks(PieceType::Rook, Square::new(3, 4), Bitboard::EMPTY);
        assert_eq!(attacks.popcount(), 14);
    }

    #[test]
    fn test_queen_is_rook_plus_bishop() {
        let occ = Bitboard(0x0000_00FF_0000_0000);
        let sq = Square::new(2, 2);
        let queen = get_attacks(PieceType::Queen, sq, occ);
        let split = get_attacks(PieceType::Rook, sq, occ).or(get_attacks(PieceType::Bishop, sq, occ));
        assert_eq!(queen, split);
    }

    #[test]
    fn test_between() {
        let a1 = Square::new(0, 0);
        let h8 = Square::new(7, 7);
        let diag = between(a1, h8);
        assert_eq!(diag.popcount(), 6);
        assert!(diag.contains(Square::new(3, 3)));

        let e1 = Square::new(0, 4);
        let e4 = Square::new(3, 4);
        let file = between(e1, e4);
        assert_eq!(file.popcount(), 2);

        // Not on a shared line
        assert!(between(Square::new(0, 0), Square::new(2, 1)).is_empty());
        // Adjacent squares have nothing between them
        assert!(between(Square::new(0, 0), Square::new(0, 1)).is_empty());
    }

    #[test]
    fn test_passed_pawn_mask() {
        let mask = passed_pawn_mask(Color::White, Square::new(1, 4));
        // Files d, e, f on ranks 3-8: 3 files x 6 ranks
        assert_eq!(mask.popcount(), 18);
        assert!(mask.contains(Square::new(6, 3)));
        assert!(!mask.contains(Square::new(1, 4)));
        assert!(!mask.contains(Square::new(0, 4)));

        let mask = passed_pawn_mask(Color::Black, Square::new(6, 0));
        // Files a, b on ranks 1-6
        assert_eq!(mask.popcount(), 12);
    }

    #[test]
    fn test_center_distance() {
        assert_eq!(center_distance(Square::new(3, 3)), 0);
        assert_eq!(center_distance(Square::new(0, 0)), 3);
        assert_eq!(center_distance(Square::new(7, 7)), 3);
        assert_eq!(center_distance(Square::new(3, 1)), 2);
    }

    #[test]
    fn test_neighbour_files() {
        assert_eq!(neighbour_files(0), Bitboard::file_mask(1));
        assert_eq!(
            neighbour_files(4),
            Bitboard::file_mask(3).or(Bitboard::file_mask(5))
        );
    }
}
