// src/encode/pipeline.rs

//! Compression and decompression of whole images.
//!
//! Compression walks the blocks in row-major order. Each block is level
//! shifted, transformed, quantized and zig-zag scanned into its own slot of
//! a coefficient buffer; the buffer is then serialized to bytes and Huffman
//! coded. Decompression runs the same steps backwards and writes every
//! block back at its origin.

use crate::core::options::{BLOCK_AREA, CodecOptions};
use crate::encode::dct::quantize::{QuantizationMatrix, dequantize, quantize_into};
use crate::encode::dct::transform::{self, Block, LEVEL_SHIFT};
use crate::encode::dct::{stream, zigzag};
use crate::encode::huffman;
use crate::image::compressed::CompressedImage;
use crate::image::matrix::{BlockGrid, SampleMatrix};
use crate::utils::error::{CodecError, Result};
use crate::utils::threads::WorkerPool;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Compresses a block-aligned matrix.
///
/// Fails with `InvalidArgument` for an out-of-range quality, zero workers,
/// or dimensions that are not positive multiples of the block size.
pub fn compress(matrix: &SampleMatrix, options: &CodecOptions) -> Result<CompressedImage> {
    options.validate()?;
    let grid = BlockGrid::for_matrix(matrix)?;
    let quant = QuantizationMatrix::for_quality(options.quality)?;
    let pool = WorkerPool::new(options.workers)?;

    info!(
        "Compressing {}x{} image ({} blocks) at quality {} with {} workers",
        grid.width(),
        grid.height(),
        grid.block_count(),
        options.quality,
        pool.workers()
    );

    let mut scanned = vec![0i16; grid.block_count() * BLOCK_AREA];
    let saturated = AtomicUsize::new(0);
    pool.for_each_chunk_mut(&mut scanned, BLOCK_AREA, |index, slot| {
        let block = grid.read_block(matrix.as_slice(), index);
        let n = encode_block(&block, &quant, slot);
        if n > 0 {
            saturated.fetch_add(n, Ordering::Relaxed);
        }
    });
    let saturated = saturated.into_inner();
    if saturated > 0 {
        warn!(
            "{} coefficients exceeded the 16-bit range and were clamped",
            saturated
        );
    }

    let bytes = serialize(&scanned, &grid, &pool);
    let encoded = huffman::compress_bytes(&bytes, &pool)?;
    let image = CompressedImage::from_parts(
        options.quality,
        grid.width(),
        grid.height(),
        encoded.decode_table,
        encoded.packed,
    )?;

    info!(
        "Compressed to {} bytes ({} bits), ratio {:.2}",
        image.bytes().len(),
        image.bit_count(),
        image.compression_ratio()
    );
    Ok(image)
}

/// Reconstructs the sample matrix of `image` using `workers` threads.
///
/// Fails with `CorruptStream` when the bit stream does not decode to exactly
/// one coefficient per sample.
pub fn decompress(image: &CompressedImage, workers: usize) -> Result<SampleMatrix> {
    let pool = WorkerPool::new(workers)?;
    let grid = BlockGrid::new(image.width(), image.height())?;
    let quant = QuantizationMatrix::for_quality(image.quality())?;

    info!(
        "Decompressing {}x{} image at quality {} with {} workers",
        grid.width(),
        grid.height(),
        image.quality(),
        pool.workers()
    );

    let bytes = huffman::decode(image.bytes(), image.decode_table(), image.bit_count())?;
    let expected = grid.block_count() * BLOCK_AREA;
    let coeffs = stream::read_coefficients(&bytes, expected).map_err(|e| match e {
        CodecError::CorruptStream(msg) => CodecError::corrupt(format!(
            "{} ({} decoded bytes for {} samples)",
            msg,
            bytes.len(),
            expected
        )),
        other => other,
    })?;
    debug!("Decoded {} bytes into {} coefficients", bytes.len(), coeffs.len());

    let mut matrix = SampleMatrix::new(grid.width(), grid.height());
    let per_row = grid.blocks_per_row();
    pool.for_each_chunk_mut(matrix.as_mut_slice(), grid.band_len(), |band, samples| {
        for block_col in 0..per_row {
            let index = band * per_row + block_col;
            let block = decode_block(&coeffs[index * BLOCK_AREA..(index + 1) * BLOCK_AREA], &quant);
            grid.write_into_band(samples, block_col, &block);
        }
    });

    Ok(matrix)
}

/// Shift, transform, quantize and scan one block into `out`.
///
/// Returns the number of coefficients that saturated.
pub fn encode_block(block: &Block, quant: &QuantizationMatrix, out: &mut [i16]) -> usize {
    let mut shifted = *block;
    transform::shift(&mut shifted, -LEVEL_SHIFT);
    let coeffs = transform::forward(&shifted);

    let mut quantized = [0i16; BLOCK_AREA];
    let saturated = quantize_into(&coeffs, quant, &mut quantized);
    out.copy_from_slice(&zigzag::flatten(&quantized));
    saturated
}

/// Inverse of [`encode_block`] for one block of scanned coefficients.
pub fn decode_block(scanned: &[i16], quant: &QuantizationMatrix) -> Block {
    let mut seq = [0i16; BLOCK_AREA];
    seq.copy_from_slice(scanned);
    let quantized = zigzag::unflatten(&seq);

    let mut block = transform::inverse(&dequantize(&quantized, quant));
    transform::shift(&mut block, LEVEL_SHIFT);
    block
}

/// Serializes whole blocks per worker and joins the pieces in order.
fn serialize(scanned: &[i16], grid: &BlockGrid, pool: &WorkerPool) -> Vec<u8> {
    let chunk_len = pool.chunk_len_for(grid.block_count()) * BLOCK_AREA;
    let pieces = pool.map_chunks(scanned, chunk_len, |_, chunk| {
        let mut bytes = Vec::with_capacity(chunk.len());
        let escaped = stream::write_coefficients(chunk, &mut bytes);
        (bytes, escaped)
    });

    let escaped: usize = pieces.iter().map(|(_, e)| e).sum();
    let mut bytes = Vec::with_capacity(pieces.iter().map(|(b, _)| b.len()).sum());
    for (piece, _) in pieces {
        bytes.extend_from_slice(&piece);
    }
    debug!(
        "Serialized {} coefficients into {} bytes ({} escaped)",
        scanned.len(),
        bytes.len(),
        escaped
    );
    bytes
}
