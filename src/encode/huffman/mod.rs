// src/encode/huffman/mod.rs

//! Huffman entropy coding over a packed, MSB-first bit stream.

pub mod bits;
pub mod codec;
pub mod table;
pub mod tree;

pub use bits::{BitPacker, BitReader, Code, PackedBits};
pub use codec::{EncodedStream, compress_bytes, decode, encode};
pub use table::{CodeTable, DecodeTable};
pub use tree::{Frequencies, HuffmanNode, HuffmanTree, count_frequencies};
