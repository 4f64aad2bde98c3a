// src/encode/dct/transform.rs

//! Forward and inverse 2D discrete cosine transform over one block.
//!
//! Blocks are row-major `[f64; BLOCK_AREA]` arrays: sample `(row, col)` lives
//! at `row * BLOCK_SIZE + col`. Frequency `(u, v)` follows the same layout,
//! `u` being the vertical frequency and `v` the horizontal one.
//!
//! Both directions use the direct O(N⁴) summation
//!
//! ```text
//! F(u,v) = β·α(u)·α(v)·Σr Σc f(r,c)·cos((2r+1)uπ/2N)·cos((2c+1)vπ/2N)
//! f(r,c) = β·Σu Σv α(u)·α(v)·F(u,v)·cos((2r+1)uπ/2N)·cos((2c+1)vπ/2N)
//! ```
//!
//! with `α(0) = 1/√2`, `α(k) = 1` otherwise and `β = 2/N`, which makes the
//! pair orthonormal and therefore exact inverses up to rounding.

use crate::core::options::{BLOCK_AREA, BLOCK_SIZE};
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::OnceLock;

/// One block of samples or real-valued coefficients.
pub type Block = [f64; BLOCK_AREA];

/// Offset applied before the forward transform to center samples on zero.
pub const LEVEL_SHIFT: f64 = 128.0;

/// `β = 1/N + 1/N`.
const BETA: f64 = 2.0 / BLOCK_SIZE as f64;

static COS_TABLE: OnceLock<[[f64; BLOCK_SIZE]; BLOCK_SIZE]> = OnceLock::new();

/// `cos_table()[x][u] = cos((2x+1)·u·π / 2N)`.
fn cos_table() -> &'static [[f64; BLOCK_SIZE]; BLOCK_SIZE] {
    COS_TABLE.get_or_init(|| {
        let mut table = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        for (x, row) in table.iter_mut().enumerate() {
            for (u, cell) in row.iter_mut().enumerate() {
                *cell = (((2 * x + 1) * u) as f64 * PI / (2 * BLOCK_SIZE) as f64).cos();
            }
        }
        table
    })
}

#[inline]
fn alpha(k: usize) -> f64 {
    if k == 0 { FRAC_1_SQRT_2 } else { 1.0 }
}

/// Forward 2D DCT of one block.
pub fn forward(block: &Block) -> Block {
    let cos = cos_table();
    let mut coeffs = [0.0; BLOCK_AREA];

    for u in 0..BLOCK_SIZE {
        for v in 0..BLOCK_SIZE {
            let mut sum = 0.0;
            for r in 0..BLOCK_SIZE {
                let row = &block[r * BLOCK_SIZE..(r + 1) * BLOCK_SIZE];
                let cu = cos[r][u];
                for (c, &sample) in row.iter().enumerate() {
                    sum += sample * cu * cos[c][v];
                }
            }
            coeffs[u * BLOCK_SIZE + v] = sum * BETA * alpha(u) * alpha(v);
        }
    }

    coeffs
}

/// Inverse 2D DCT of one coefficient block.
pub fn inverse(coeffs: &Block) -> Block {
    let cos = cos_table();
    let mut block = [0.0; BLOCK_AREA];

    for r in 0..BLOCK_SIZE {
        for c in 0..BLOCK_SIZE {
            let mut sum = 0.0;
            for u in 0..BLOCK_SIZE {
                let weight_u = alpha(u) * cos[r][u];
                for v in 0..BLOCK_SIZE {
                    sum += coeffs[u * BLOCK_SIZE + v] * weight_u * alpha(v) * cos[c][v];
                }
            }
            block[r * BLOCK_SIZE + c] = sum * BETA;
        }
    }

    block
}

/// Adds `delta` to every sample in place.
#[inline]
pub fn shift(block: &mut Block, delta: f64) {
    for sample in block.iter_mut() {
        *sample += delta;
    }
}
