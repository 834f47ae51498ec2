//! Magic bitboard tables for slider attacks.
//!
//! Rook and bishop tables share one initialisation routine parameterised
//! by a direction set. Magic factors are found at startup by trying
//! sparse random candidates against all blocker subsets of each square's
//! relevant-occupancy mask; a fixed seed keeps the search deterministic.

use rand::prelude::*;

use crate::board::types::{Bitboard, Square};

pub(crate) struct SliderAttacks {
    masks: [Bitboard; 64],
    magics: [u64; 64],
    shifts: [u32; 64],
    offsets: [usize; 64],
    table: Vec<Bitboard>,
}

impl SliderAttacks {
    pub(crate) fn new(directions: [(i8, i8); 4], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut masks = [Bitboard::EMPTY; 64];
        let mut magics = [0u64; 64];
        let mut shifts = [0u32; 64];
        let mut offsets = [0usize; 64];
        let mut table: Vec<Bitboard> = Vec::new();

        for idx in 0..64 {
            let sq = Square::from_index(idx);
            let mask = relevant_mask(sq, &directions);
            let bits = mask.popcount();
            let size = 1usize << bits;
            let shift = 64 - bits;

            // Enumerate all blocker subsets with their reference attacks.
            let mut subsets: Vec<(u64, Bitboard)> = Vec::with_capacity(size);
            let mut occ = 0u64;
            loop {
                subsets.push((occ, attacks_on_the_fly(sq, Bitboard(occ), &directions)));
                occ = occ.wrapping_sub(mask.0) & mask.0;
                if occ == 0 {
                    break;
                }
            }

            let magic = find_magic(&subsets, mask, shift, &mut rng);

            let offset = table.len();
            table.resize(offset + size, Bitboard::EMPTY);
            for &(blockers, attacks) in &subsets {
                let slot = (blockers.wrapping_mul(magic) >> shift) as usize;
                table[offset + slot] = attacks;
            }

            masks[idx] = mask;
            magics[idx] = magic;
            shifts[idx] = shift;
            offsets[idx] = offset;
        }

        SliderAttacks {
            masks,
            magics,
            shifts,
            offsets,
            table,
        }
    }

    /// Attack set for a slider on `sq` given the full board occupancy.
    #[inline]
    #[must_use]
    pub(crate) fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let idx = sq.index();
        let blockers = occupied.0 & self.masks[idx].0;
        let slot = (blockers.wrapping_mul(self.magics[idx]) >> self.shifts[idx]) as usize;
        self.table[self.offsets[idx] + slot]
    }
}

/// Relevant occupancy: ray squares excluding the board edge in each
/// direction, since an edge blocker changes nothing.
fn relevant_mask(sq: Square, directions: &[(i8, i8); 4]) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for &(dr, df) in directions {
        let mut current = sq;
        while let Some(next) = current.step(dr, df) {
            if next.step(dr, df).is_none() {
                break;
            }
            mask.set(next);
            current = next;
        }
    }
    mask
}

/// Slow ray-walking attack computation used to seed the tables.
fn attacks_on_the_fly(sq: Square, occupied: Bitboard, directions: &[(i8, i8); 4]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(dr, df) in directions {
        let mut current = sq;
        while let Some(next) = current.step(dr, df) {
            attacks.set(next);
            if occupied.contains(next) {
                break;
            }
            current = next;
        }
    }
    attacks
}

fn find_magic(subsets: &[(u64, Bitboard)], mask: Bitboard, shift: u32, rng: &mut StdRng) -> u64 {
    let size = subsets.len();
    let mut used: Vec<Bitboard> = vec![Bitboard::EMPTY; size];
    let mut filled: Vec<u32> = vec![0; size];
    let mut trial: u32 = 0;

    loop {
        // Sparse candidates collide far less often.
        let magic = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (mask.0.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }
        trial += 1;

        let mut ok = true;
        for &(blockers, attacks) in subsets {
            let slot = (blockers.wrapping_mul(magic) >> shift) as usize;
            if filled[slot] != trial {
                filled[slot] = trial;
                used[slot] = attacks;
            } else if used[slot] != attacks {
                ok = false;
                break;
            }
        }
        if ok {
            return magic;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::attack_tables::{BISHOP_DIRECTIONS, ROOK_DIRECTIONS};

    #[test]
    fn test_rook_relevant_mask_excludes_edges() {
        // Rook on a1: mask covers b1..g1 and a2..a7, 12 squares
        let mask = relevant_mask(Square::new(0, 0), &ROOK_DIRECTIONS);
        assert_eq!(mask.popcount(), 12);
        assert!(!mask.contains(Square::new(0, 7)));
        assert!(!mask.contains(Square::new(7, 0)));
        assert!(mask.contains(Square::new(0, 1)));
    }

    #[test]
    fn test_magic_lookup_matches_ray_walk() {
        let rook = SliderAttacks::new(ROOK_DIRECTIONS, 1);
        let bishop = SliderAttacks::new(BISHOP_DIRECTIONS, 2);
        let occupancies = [
            Bitboard::EMPTY,
            Bitboard(0x00FF_0000_00FF_0000),
            Bitboard(0x55AA_55AA_55AA_55AA),
        ];
        for idx in [0usize, 7, 27, 36, 56, 63] {
            let sq = Square::from_index(idx);
            for occ in occupancies {
                assert_eq!(
                    rook.attacks(sq, occ),
                    attacks_on_the_fly(sq, occ, &ROOK_DIRECTIONS),
                    "rook attacks mismatch on {sq}"
                );
                assert_eq!(
                    bishop.attacks(sq, occ),
                    attacks_on_the_fly(sq, occ, &BISHOP_DIRECTIONS),
                    "bishop attacks mismatch on {sq}"
                );
            }
        }
    }

    #[test]
    fn test_blockers_stop_rays() {
        let rook = SliderAttacks::new(ROOK_DIRECTIONS, 1);
        // Rook on e4 with blockers on e6 and c4
        let sq = Square::new(3, 4);
        let blockers = Bitboard::from_square(Square::new(5, 4)).or(Bitboard::from_square(Square::new(3, 2)));
        let attacks = rook.attacks(sq, blockers);
        assert!(attacks.contains(Square::new(5, 4))); // e6 capturable
        assert!(!attacks.contains(Square::new(6, 4))); // e7 blocked
        assert!(attacks.contains(Square::new(3, 2))); // c4 capturable
        assert!(!attacks.contains(Square::new(3, 1))); // b4 blocked
    }
}
