// src/image/matrix.rs

//! Grayscale sample matrices and their block partitioning.

use crate::core::options::{BLOCK_AREA, BLOCK_SIZE};
use crate::encode::dct::Block;
use crate::utils::error::{CodecError, Result};

/// A row-major matrix of real intensities, nominally in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl SampleMatrix {
    /// A zero-filled matrix.
    pub fn new(width: usize, height: usize) -> Self {
        SampleMatrix {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        check_len(width, height, 1, data.len())?;
        Ok(SampleMatrix {
            width,
            height,
            data,
        })
    }

    /// One byte per sample.
    pub fn from_gray_bytes(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        check_len(width, height, 1, pixels.len())?;
        Ok(SampleMatrix {
            width,
            height,
            data: pixels.iter().map(|&p| p as f64).collect(),
        })
    }

    /// Interleaved RGB, three bytes per sample, reduced to the channel mean.
    pub fn from_rgb_bytes(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        check_len(width, height, 3, pixels.len())?;
        Ok(SampleMatrix {
            width,
            height,
            data: pixels
                .chunks_exact(3)
                .map(|px| (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0)
                .collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.width + col] = value;
    }

    /// Displayable pixels: each sample truncated and clamped to `[0, 255]`.
    pub fn to_gray_bytes(&self) -> Vec<u8> {
        self.data.iter().map(|&v| v.clamp(0.0, 255.0) as u8).collect()
    }

    pub fn is_block_aligned(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.width % BLOCK_SIZE == 0
            && self.height % BLOCK_SIZE == 0
    }

    /// Copy extended with zero samples up to the next multiple of the block
    /// size in each direction.
    pub fn padded_to_blocks(&self) -> SampleMatrix {
        let width = self.width.next_multiple_of(BLOCK_SIZE);
        let height = self.height.next_multiple_of(BLOCK_SIZE);
        if width == self.width && height == self.height {
            return self.clone();
        }

        let mut padded = SampleMatrix::new(width, height);
        for (dst, src) in padded
            .data
            .chunks_exact_mut(width)
            .zip(self.data.chunks_exact(self.width.max(1)))
        {
            dst[..self.width].copy_from_slice(src);
        }
        padded
    }

    /// The top-left `width × height` region.
    pub fn cropped(&self, width: usize, height: usize) -> Result<SampleMatrix> {
        if width > self.width || height > self.height {
            return Err(CodecError::invalid_arg(format!(
                "cannot crop {}x{} matrix to {}x{}",
                self.width, self.height, width, height
            )));
        }

        let mut data = Vec::with_capacity(width * height);
        for row in self.data.chunks_exact(self.width.max(1)).take(height) {
            data.extend_from_slice(&row[..width]);
        }
        Ok(SampleMatrix {
            width,
            height,
            data,
        })
    }
}

fn check_len(width: usize, height: usize, channels: usize, actual: usize) -> Result<()> {
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| CodecError::invalid_arg(format!("{}x{} is too large", width, height)))?;
    if expected != actual {
        return Err(CodecError::invalid_arg(format!(
            "{}x{} image with {} channel(s) needs {} samples, got {}",
            width, height, channels, expected, actual
        )));
    }
    Ok(())
}

/// Block addressing over a block-aligned matrix.
///
/// Blocks are numbered in row-major order. A *band* is one row of blocks:
/// `BLOCK_SIZE` consecutive matrix rows, i.e. a contiguous slice of
/// [`band_len`](Self::band_len) samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    width: usize,
    height: usize,
}

impl BlockGrid {
    /// Fails with `InvalidArgument` unless both dimensions are positive
    /// multiples of `BLOCK_SIZE`.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width % BLOCK_SIZE != 0 || height % BLOCK_SIZE != 0 {
            return Err(CodecError::invalid_arg(format!(
                "dimensions {}x{} must be positive multiples of {}",
                width, height, BLOCK_SIZE
            )));
        }
        Ok(BlockGrid { width, height })
    }

    pub fn for_matrix(matrix: &SampleMatrix) -> Result<Self> {
        Self::new(matrix.width(), matrix.height())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn blocks_per_row(&self) -> usize {
        self.width / BLOCK_SIZE
    }

    #[inline]
    pub fn blocks_per_col(&self) -> usize {
        self.height / BLOCK_SIZE
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks_per_row() * self.blocks_per_col()
    }

    #[inline]
    pub fn band_len(&self) -> usize {
        BLOCK_SIZE * self.width
    }

    /// `(row, col)` of the top-left sample of block `index`.
    #[inline]
    pub fn origin(&self, index: usize) -> (usize, usize) {
        let per_row = self.blocks_per_row();
        ((index / per_row) * BLOCK_SIZE, (index % per_row) * BLOCK_SIZE)
    }

    /// Block index containing sample `(row, col)`.
    #[inline]
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        (row / BLOCK_SIZE) * self.blocks_per_row() + col / BLOCK_SIZE
    }

    pub fn read_block(&self, data: &[f64], index: usize) -> Block {
        let (row, _) = self.origin(index);
        let band = &data[row * self.width..(row + BLOCK_SIZE) * self.width];
        self.read_from_band(band, index % self.blocks_per_row())
    }

    pub fn write_block(&self, data: &mut [f64], index: usize, block: &Block) {
        let (row, _) = self.origin(index);
        let band = &mut data[row * self.width..(row + BLOCK_SIZE) * self.width];
        self.write_into_band(band, index % self.blocks_per_row(), block);
    }

    /// Reads the `block_col`-th block out of one band.
    pub fn read_from_band(&self, band: &[f64], block_col: usize) -> Block {
        let mut block = [0.0; BLOCK_AREA];
        let col = block_col * BLOCK_SIZE;
        for (dst, src) in block
            .chunks_exact_mut(BLOCK_SIZE)
            .zip(band.chunks_exact(self.width))
        {
            dst.copy_from_slice(&src[col..col + BLOCK_SIZE]);
        }
        block
    }

    /// Writes `block` as the `block_col`-th block of one band.
    pub fn write_into_band(&self, band: &mut [f64], block_col: usize, block: &Block) {
        let col = block_col * BLOCK_SIZE;
        for (src, dst) in block
            .chunks_exact(BLOCK_SIZE)
            .zip(band.chunks_exact_mut(self.width))
        {
            dst[col..col + BLOCK_SIZE].copy_from_slice(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> SampleMatrix {
        let data = (0..width * height).map(|i| i as f64).collect();
        SampleMatrix::from_vec(width, height, data).unwrap()
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            SampleMatrix::from_vec(4, 4, vec![0.0; 15]),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(matches!(
            SampleMatrix::from_rgb_bytes(2, 2, &[0; 11]),
            Err(CodecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_is_row_major() {
        let mut m = SampleMatrix::new(3, 2);
        m.set(1, 2, 7.5);
        m.set(0, 1, -1.0);
        assert_eq!(m.get(1, 2), 7.5);
        assert_eq!(m.into_vec(), vec![0.0, -1.0, 0.0, 0.0, 0.0, 7.5]);
    }

    #[test]
    fn test_rgb_average() {
        let m = SampleMatrix::from_rgb_bytes(2, 1, &[30, 60, 90, 255, 255, 254]).unwrap();
        assert_eq!(m.get(0, 0), 60.0);
        assert!((m.get(0, 1) - 764.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_gray_bytes_clamps_and_truncates() {
        let m = SampleMatrix::from_vec(4, 1, vec![-3.0, 12.9, 255.5, 300.0]).unwrap();
        assert_eq!(m.to_gray_bytes(), vec![0, 12, 255, 255]);
    }

    #[test]
    fn test_padding_and_crop() {
        let m = ramp(10, 3);
        let padded = m.padded_to_blocks();
        assert_eq!((padded.width(), padded.height()), (16, 8));
        assert!(padded.is_block_aligned());
        assert_eq!(padded.get(2, 9), m.get(2, 9));
        assert_eq!(padded.get(2, 10), 0.0);
        assert_eq!(padded.get(5, 0), 0.0);

        let back = padded.cropped(10, 3).unwrap();
        assert_eq!(back, m);
        assert!(padded.cropped(17, 1).is_err());
    }

    #[test]
    fn test_aligned_padding_is_identity() {
        let m = ramp(16, 8);
        assert_eq!(m.padded_to_blocks(), m);
    }

    #[test]
    fn test_grid_rejects_unaligned() {
        for (w, h) in [(0, 8), (8, 0), (12, 8), (8, 9)] {
            assert!(matches!(
                BlockGrid::new(w, h),
                Err(CodecError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_grid_addressing() {
        let grid = BlockGrid::new(24, 16).unwrap();
        assert_eq!(grid.blocks_per_row(), 3);
        assert_eq!(grid.blocks_per_col(), 2);
        assert_eq!(grid.block_count(), 6);
        assert_eq!(grid.band_len(), 8 * 24);
        assert_eq!(grid.origin(0), (0, 0));
        assert_eq!(grid.origin(2), (0, 16));
        assert_eq!(grid.origin(4), (8, 8));
        for index in 0..grid.block_count() {
            let (r, c) = grid.origin(index);
            assert_eq!(grid.index_of(r + 7, c + 3), index);
        }
    }

    #[test]
    fn test_read_write_block() {
        let m = ramp(16, 16);
        let grid = BlockGrid::for_matrix(&m).unwrap();

        let block = grid.read_block(m.as_slice(), 3);
        assert_eq!(block[0], m.get(8, 8));
        assert_eq!(block[9], m.get(9, 9));
        assert_eq!(block[63], m.get(15, 15));

        let mut copy = SampleMatrix::new(16, 16);
        for index in 0..grid.block_count() {
            let b = grid.read_block(m.as_slice(), index);
            grid.write_block(copy.as_mut_slice(), index, &b);
        }
        assert_eq!(copy, m);
    }
}
