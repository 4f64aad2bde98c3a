// src/encode/huffman/bits.rs

//! MSB-first bit packing for the entropy coder.
//!
//! [`BitPacker`] appends variable-length codes into a byte buffer, first bit
//! in the most significant position. The last byte is padded with zero bits
//! in its low positions; the exact number of meaningful bits travels next to
//! the bytes in [`PackedBits`]. [`BitReader`] walks such a buffer back.

use crate::utils::error::{CodecError, Result};
use bitvec::prelude::*;
use std::fmt;

/// A Huffman code: the low `len` bits of `pattern`, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code {
    pattern: u64,
    len: u8,
}

impl Code {
    /// Longest representable code.
    pub const MAX_LEN: u8 = 64;

    /// The accumulator state before any bit has been read.
    pub(crate) const EMPTY: Code = Code { pattern: 0, len: 0 };

    pub fn new(pattern: u64, len: u8) -> Result<Self> {
        if len == 0 || len > Self::MAX_LEN {
            return Err(CodecError::malformed(format!(
                "code length {} outside [1, {}]",
                len,
                Self::MAX_LEN
            )));
        }
        if len < Self::MAX_LEN && pattern >> len != 0 {
            return Err(CodecError::malformed(format!(
                "pattern {:#x} does not fit in {} bits",
                pattern, len
            )));
        }
        Ok(Code { pattern, len })
    }

    #[inline]
    pub fn pattern(&self) -> u64 {
        self.pattern
    }

    #[inline]
    pub fn len(&self) -> u8 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends one bit at the least significant end. Callers keep `len`
    /// below [`Code::MAX_LEN`].
    #[inline]
    pub(crate) fn push(self, bit: bool) -> Code {
        Code {
            pattern: (self.pattern << 1) | bit as u64,
            len: self.len + 1,
        }
    }

    /// True when `self` is a proper or equal prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len == 0 {
            return true;
        }
        self.len <= other.len && other.pattern >> (other.len - self.len) == self.pattern
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            let bit = (self.pattern >> i) & 1;
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

/// Packed bytes plus the number of meaningful bits in them.
///
/// `bytes.len() == ceil(bit_count / 8)` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBits {
    bytes: Vec<u8>,
    bit_count: u64,
}

impl PackedBits {
    pub fn new(bytes: Vec<u8>, bit_count: u64) -> Result<Self> {
        if bytes.len() as u64 != bit_count.div_ceil(8) {
            return Err(CodecError::corrupt(format!(
                "{} bytes cannot hold exactly {} bits",
                bytes.len(),
                bit_count
            )));
        }
        Ok(PackedBits { bytes, bit_count })
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    pub fn into_parts(self) -> (Vec<u8>, u64) {
        (self.bytes, self.bit_count)
    }
}

/// Writes codes MSB-first into a growing byte buffer.
#[derive(Debug, Default)]
pub struct BitPacker {
    buffer: Vec<u8>,
    current: u8,
    filled: u8, // bits already placed in `current`, 0..8
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            current: 0,
            filled: 0,
        }
    }

    #[inline]
    pub fn write_code(&mut self, code: Code) {
        self.write_bits(code.pattern, code.len);
    }

    /// Writes the low `num_bits` bits of `value`, most significant first.
    #[inline]
    pub fn write_bits(&mut self, value: u64, num_bits: u8) {
        debug_assert!(num_bits <= 64);

        let mut remaining = num_bits;
        while remaining > 0 {
            let space = 8 - self.filled;
            let take = remaining.min(space);
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u64 << take) - 1)) as u8;

            self.current |= bits << (space - take);
            self.filled += take;
            remaining -= take;

            if self.filled == 8 {
                self.buffer.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    /// Splices an independently packed chunk onto the end of this stream.
    ///
    /// The chunk's bits land immediately after the last bit written here, so
    /// its leading bits fill out the current partial byte.
    pub fn append(&mut self, chunk: &PackedBits) {
        let full = (chunk.bit_count / 8) as usize;
        let tail = (chunk.bit_count % 8) as u8;

        if self.filled == 0 {
            self.buffer.extend_from_slice(&chunk.bytes[..full]);
        } else {
            for &byte in &chunk.bytes[..full] {
                self.write_bits(byte as u64, 8);
            }
        }

        if tail > 0 {
            self.write_bits((chunk.bytes[full] >> (8 - tail)) as u64, tail);
        }
    }

    /// Number of bits written so far.
    #[inline]
    pub fn bit_count(&self) -> u64 {
        self.buffer.len() as u64 * 8 + self.filled as u64
    }

    /// Flushes the partial byte, zero-padded in its low bits.
    pub fn finish(mut self) -> PackedBits {
        let bit_count = self.bit_count();
        if self.filled > 0 {
            self.buffer.push(self.current);
        }
        PackedBits {
            bytes: self.buffer,
            bit_count,
        }
    }
}

/// Reads exactly `bit_count` bits from a packed buffer, MSB-first.
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Fails with `CorruptStream` when `bit_count` exceeds the bits available
    /// in `bytes`.
    pub fn new(bytes: &'a [u8], bit_count: u64) -> Result<Self> {
        let available = bytes.len() as u64 * 8;
        if bit_count > available {
            return Err(CodecError::corrupt(format!(
                "declared {} bits but only {} are present",
                bit_count, available
            )));
        }
        Ok(BitReader {
            bits: &bytes.view_bits::<Msb0>()[..bit_count as usize],
            pos: 0,
        })
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = *self.bits.get(self.pos)?;
        self.pos += 1;
        Some(bit)
    }
}

impl Iterator for BitReader<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        self.read_bit()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}
