// src/encode/dct/zigzag.rs

//! Zig-zag scan order for one block.
//!
//! `ZIGZAG[i]` is the natural (row-major) index of the `i`-th coefficient in
//! scan order: diagonals of constant `row + col` are walked in turn,
//! alternating direction, so low frequencies come first.

use crate::core::options::{BLOCK_AREA, BLOCK_SIZE};

/// Scan position → natural index.
pub const ZIGZAG: [usize; BLOCK_AREA] = build_zigzag();

/// Natural index → scan position.
pub const UNZIGZAG: [usize; BLOCK_AREA] = invert(&ZIGZAG);

const fn build_zigzag() -> [usize; BLOCK_AREA] {
    let mut order = [0usize; BLOCK_AREA];
    let mut idx = 0;
    let mut diag = 0;
    while diag < 2 * BLOCK_SIZE - 1 {
        let lo = if diag + 1 > BLOCK_SIZE { diag + 1 - BLOCK_SIZE } else { 0 };
        let hi = if diag < BLOCK_SIZE { diag } else { BLOCK_SIZE - 1 };
        if diag % 2 == 0 {
            // up and to the right
            let mut row = hi;
            loop {
                order[idx] = row * BLOCK_SIZE + (diag - row);
                idx += 1;
                if row == lo {
                    break;
                }
                row -= 1;
            }
        } else {
            // down and to the left
            let mut row = lo;
            while row <= hi {
                order[idx] = row * BLOCK_SIZE + (diag - row);
                idx += 1;
                row += 1;
            }
        }
        diag += 1;
    }
    order
}

const fn invert(order: &[usize; BLOCK_AREA]) -> [usize; BLOCK_AREA] {
    let mut inverse = [0usize; BLOCK_AREA];
    let mut i = 0;
    while i < BLOCK_AREA {
        inverse[order[i]] = i;
        i += 1;
    }
    inverse
}

/// Serializes a block into scan order.
#[inline]
pub fn flatten<T: Copy>(block: &[T; BLOCK_AREA]) -> [T; BLOCK_AREA] {
    std::array::from_fn(|i| block[ZIGZAG[i]])
}

/// Restores a block from scan order.
#[inline]
pub fn unflatten<T: Copy>(seq: &[T; BLOCK_AREA]) -> [T; BLOCK_AREA] {
    std::array::from_fn(|n| seq[UNZIGZAG[n]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// The classic 8x8 JPEG scan, written out by hand.
    const REFERENCE_8X8: [usize; 64] = [
        0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
        20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51,
        58, 59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
    ];

    #[test]
    fn test_matches_reference_table() {
        assert_eq!(ZIGZAG, REFERENCE_8X8);
    }

    #[test]
    fn test_zigzag_complete() {
        let mut seen = [false; BLOCK_AREA];
        for &pos in &ZIGZAG {
            assert!(!seen[pos], "Duplicate position {pos} in zigzag");
            seen[pos] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_inverse_table() {
        for i in 0..BLOCK_AREA {
            assert_eq!(UNZIGZAG[ZIGZAG[i]], i);
        }
    }

    #[test]
    fn test_flatten_low_frequencies_first() {
        let mut block = [0i8; BLOCK_AREA];
        block[0] = 100; // DC
        block[1] = 50; // (0,1)
        block[BLOCK_SIZE] = 30; // (1,0)

        let scanned = flatten(&block);
        assert_eq!(&scanned[..3], &[100, 50, 30]);
        assert!(scanned[3..].iter().all(|&v| v == 0));
    }

    proptest! {
        #[test]
        fn prop_unflatten_inverts_flatten(values in proptest::collection::vec(any::<i8>(), BLOCK_AREA)) {
            let mut block = [0i8; BLOCK_AREA];
            block.copy_from_slice(&values);
            prop_assert_eq!(unflatten(&flatten(&block)), block);
            prop_assert_eq!(flatten(&unflatten(&block)), block);
        }

        #[test]
        fn prop_distinct_markers_survive(
            order in Just((0..BLOCK_AREA as u16).collect::<Vec<_>>()).prop_shuffle()
        ) {
            let mut markers = [0u16; BLOCK_AREA];
            markers.copy_from_slice(&order);
            let scanned = flatten(&markers);
            for i in 0..BLOCK_AREA {
                prop_assert_eq!(scanned[i], markers[ZIGZAG[i]]);
            }
            prop_assert_eq!(unflatten(&scanned), markers);
        }
    }
}
