// src/encode/huffman/codec.rs

//! Huffman encoding and decoding of byte streams.

use super::bits::{BitPacker, BitReader, Code, PackedBits};
use super::table::{CodeTable, DecodeTable};
use super::tree::{HuffmanTree, count_frequencies};
use crate::utils::error::{CodecError, Result};
use crate::utils::threads::WorkerPool;
use log::debug;

/// Output of [`compress_bytes`]: the packed stream and the table to read it.
#[derive(Debug, Clone)]
pub struct EncodedStream {
    pub packed: PackedBits,
    pub decode_table: DecodeTable,
}

/// Builds a code for `bytes` and encodes them with it.
pub fn compress_bytes(bytes: &[u8], pool: &WorkerPool) -> Result<EncodedStream> {
    let frequencies = count_frequencies(bytes, pool);
    let table = match HuffmanTree::build(&frequencies) {
        Some(tree) => tree.code_table()?,
        None => CodeTable::default(),
    };
    debug!(
        "Code table: {} symbols, longest code {} bits, {} bits expected",
        table.len(),
        table.max_code_len(),
        table.encoded_bits(&frequencies)
    );

    let packed = encode(bytes, &table, pool)?;
    let decode_table = DecodeTable::from_code_table(&table)?;
    Ok(EncodedStream {
        packed,
        decode_table,
    })
}

/// Packs `bytes` with `table`, MSB-first.
///
/// The input is split into one contiguous chunk per worker. Each chunk is
/// packed from a byte-aligned start, then the chunks are spliced together in
/// order, so the result is identical for any worker count.
pub fn encode(bytes: &[u8], table: &CodeTable, pool: &WorkerPool) -> Result<PackedBits> {
    let chunk_len = pool.chunk_len_for(bytes.len());
    let chunks = pool.try_map_chunks(bytes, chunk_len, |_, chunk| pack_chunk(chunk, table))?;

    if chunks.len() <= 1 {
        return Ok(chunks.into_iter().next().unwrap_or_default());
    }

    let total_bytes: usize = chunks.iter().map(|c| c.bytes().len()).sum();
    let mut packer = BitPacker::with_capacity(total_bytes);
    for chunk in &chunks {
        packer.append(chunk);
    }
    debug!("Merged {} packed chunks", chunks.len());
    Ok(packer.finish())
}

fn pack_chunk(chunk: &[u8], table: &CodeTable) -> Result<PackedBits> {
    let mut packer = BitPacker::with_capacity(chunk.len());
    for &symbol in chunk {
        let code = table.get(symbol).ok_or_else(|| {
            CodecError::malformed(format!("symbol {} has no code in the table", symbol))
        })?;
        packer.write_code(code);
    }
    Ok(packer.finish())
}

/// Decodes exactly `bit_count` bits of `bytes` with `table`.
///
/// Fails with `CorruptStream` when `bit_count` exceeds the buffer, when the
/// bits read since the last symbol grow past the longest code without a
/// match, or when the stream ends in the middle of a code.
pub fn decode(bytes: &[u8], table: &DecodeTable, bit_count: u64) -> Result<Vec<u8>> {
    let reader = BitReader::new(bytes, bit_count)?;
    if table.is_empty() && bit_count > 0 {
        return Err(CodecError::corrupt(format!(
            "{} bits to decode with an empty code table",
            bit_count
        )));
    }

    let max_len = table.max_code_len();
    let mut out = Vec::with_capacity(bit_count as usize / max_len.max(1) as usize);
    let mut acc = Code::EMPTY;

    for bit in reader {
        acc = acc.push(bit);
        if let Some(symbol) = table.get(&acc) {
            out.push(symbol);
            acc = Code::EMPTY;
        } else if acc.len() >= max_len {
            return Err(CodecError::corrupt(format!(
                "no code matches {} after {} symbols",
                acc,
                out.len()
            )));
        }
    }

    if !acc.is_empty() {
        return Err(CodecError::corrupt(format!(
            "stream ends inside a code ({} dangling bits)",
            acc.len()
        )));
    }

    Ok(out)
}
