// src/encode/dct/quantize.rs

//! Quality-driven quantization of DCT coefficient blocks.

use super::transform::Block;
use crate::core::options::{validate_quality, BLOCK_AREA};
use crate::utils::error::Result;

/// Standard luminance quantization table, natural (row-major) order.
pub const BASE_TABLE: [u16; BLOCK_AREA] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Quantized coefficients of one block, natural order.
pub type QuantizedBlock = [i16; BLOCK_AREA];

/// Per-cell divisors derived from a quality value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationMatrix {
    quality: u8,
    cells: [u16; BLOCK_AREA],
}

impl QuantizationMatrix {
    /// Scales [`BASE_TABLE`] for `quality` in `[1, 99]`.
    ///
    /// Cells that round down to zero at high qualities are raised to 1.
    pub fn for_quality(quality: u8) -> Result<Self> {
        validate_quality(quality)?;

        let quality = quality as u32;
        let multiplier = if quality < 50 {
            5000 / quality
        } else {
            200 - 2 * quality
        };

        let cells = BASE_TABLE.map(|base| ((multiplier * base as u32 + 50) / 100).max(1) as u16);

        Ok(Self {
            quality: quality as u8,
            cells,
        })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    #[inline]
    pub fn cells(&self) -> &[u16; BLOCK_AREA] {
        &self.cells
    }
}

/// Divides each coefficient by its divisor, rounding toward zero.
///
/// Results outside the `i16` range saturate. Returns the number of cells
/// that saturated.
pub fn quantize_into(coeffs: &Block, matrix: &QuantizationMatrix, out: &mut QuantizedBlock) -> usize {
    let mut saturated = 0;
    for ((dst, &coeff), &q) in out.iter_mut().zip(coeffs.iter()).zip(matrix.cells.iter()) {
        let value = (coeff / q as f64).trunc();
        if value < i16::MIN as f64 || value > i16::MAX as f64 {
            saturated += 1;
        }
        *dst = value.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
    }
    saturated
}

pub fn quantize(coeffs: &Block, matrix: &QuantizationMatrix) -> QuantizedBlock {
    let mut out = [0i16; BLOCK_AREA];
    quantize_into(coeffs, matrix, &mut out);
    out
}

/// Multiplies each quantized cell by its divisor.
pub fn dequantize(quantized: &QuantizedBlock, matrix: &QuantizationMatrix) -> Block {
    let mut out = [0.0; BLOCK_AREA];
    for ((dst, &value), &q) in out.iter_mut().zip(quantized.iter()).zip(matrix.cells.iter()) {
        *dst = value as f64 * q as f64;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CodecError;

    #[test]
    fn test_quality_50_is_base_table() {
        let matrix = QuantizationMatrix::for_quality(50).unwrap();
        assert_eq!(matrix.cells(), &BASE_TABLE);
    }

    #[test]
    fn test_matrix_is_deterministic() {
        for q in [1, 10, 49, 50, 51, 75, 99] {
            assert_eq!(
                QuantizationMatrix::for_quality(q).unwrap(),
                QuantizationMatrix::for_quality(q).unwrap()
            );
        }
    }

    #[test]
    fn test_quality_scaling() {
        let q10 = QuantizationMatrix::for_quality(10).unwrap();
        let q50 = QuantizationMatrix::for_quality(50).unwrap();
        let q90 = QuantizationMatrix::for_quality(90).unwrap();

        // multiplier 500 at q10, 20 at q90
        assert_eq!(q10.cells()[0], 80);
        assert_eq!(q90.cells()[0], 3);
        assert!(q90.cells()[0] < q50.cells()[0]);
        assert!(q50.cells()[0] < q10.cells()[0]);
    }

    #[test]
    fn test_extreme_qualities_positive() {
        let q1 = QuantizationMatrix::for_quality(1).unwrap();
        assert_eq!(q1.cells()[0], 800);

        let q99 = QuantizationMatrix::for_quality(99).unwrap();
        assert!(q99.cells().iter().all(|&c| c >= 1));
        // (2·10 + 50) / 100 == 0 before the floor of 1
        assert_eq!(q99.cells()[2], 1);
    }

    #[test]
    fn test_out_of_range_quality() {
        for q in [0, 100, 255] {
            assert!(matches!(
                QuantizationMatrix::for_quality(q),
                Err(CodecError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_quantize_truncates_toward_zero() {
        let matrix = QuantizationMatrix::for_quality(50).unwrap();
        let mut coeffs = [0.0; BLOCK_AREA];
        coeffs[0] = 16.0 * 3.9; // → 3
        coeffs[1] = -11.0 * 2.5; // → -2
        coeffs[2] = 9.99; // below 10 → 0

        let quantized = quantize(&coeffs, &matrix);
        assert_eq!(quantized[0], 3);
        assert_eq!(quantized[1], -2);
        assert_eq!(quantized[2], 0);
    }

    #[test]
    fn test_quantize_saturates() {
        let matrix = QuantizationMatrix::for_quality(99).unwrap();
        let mut coeffs = [0.0; BLOCK_AREA];
        coeffs[0] = 1e9;
        coeffs[1] = -1e9;
        coeffs[2] = 300.0; // wider than a byte but not saturated

        let mut out = [0i16; BLOCK_AREA];
        let saturated = quantize_into(&coeffs, &matrix, &mut out);
        assert_eq!(saturated, 2);
        assert_eq!(out[0], i16::MAX);
        assert_eq!(out[1], i16::MIN);
        assert_eq!(out[2], 300);
    }

    #[test]
    fn test_uniform_black_block_dc() {
        // level-shifted 0 gives DC -1024; at q90 the divisor is 3
        let matrix = QuantizationMatrix::for_quality(90).unwrap();
        let mut coeffs = [0.0; BLOCK_AREA];
        coeffs[0] = -1024.0;
        let quantized = quantize(&coeffs, &matrix);
        assert_eq!(quantized[0], -341);
        assert_eq!(dequantize(&quantized, &matrix)[0], -1023.0);
    }

    #[test]
    fn test_dequantize_negative() {
        let matrix = QuantizationMatrix::for_quality(50).unwrap();
        let mut quantized = [0i16; BLOCK_AREA];
        quantized[0] = -10;
        let restored = dequantize(&quantized, &matrix);
        assert_eq!(restored[0], -160.0);
    }
}
