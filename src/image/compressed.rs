// src/image/compressed.rs

//! The compressed image and its on-disk container.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! "DCTQ"            magic
//! u8                format version (1)
//! u8                quality
//! u32, u32          width, height
//! u64               bit count
//! u16               decode table entries, then per entry:
//!   u8 value, u8 code length, u64 code pattern
//! u64               payload length, ceil(bit count / 8)
//! [u8]              payload
//! ```

use crate::core::options::validate_quality;
use crate::encode::dct::stream::MAX_TOKEN_LEN;
use crate::encode::huffman::{Code, DecodeTable, PackedBits};
use crate::image::matrix::BlockGrid;
use crate::utils::error::{CodecError, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub const MAGIC: [u8; 4] = *b"DCTQ";
pub const FORMAT_VERSION: u8 = 1;

/// Everything needed to reconstruct an image: quality, dimensions, the
/// decode table and the packed coefficient stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    quality: u8,
    width: usize,
    height: usize,
    decode_table: DecodeTable,
    packed: PackedBits,
}

impl CompressedImage {
    /// Assembles an image from its parts, checking quality and block
    /// alignment.
    pub fn from_parts(
        quality: u8,
        width: usize,
        height: usize,
        decode_table: DecodeTable,
        packed: PackedBits,
    ) -> Result<Self> {
        validate_quality(quality)?;
        BlockGrid::new(width, height)?;
        Ok(CompressedImage {
            quality,
            width,
            height,
            decode_table,
            packed,
        })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bit_count(&self) -> u64 {
        self.packed.bit_count()
    }

    pub fn bytes(&self) -> &[u8] {
        self.packed.bytes()
    }

    pub fn decode_table(&self) -> &DecodeTable {
        &self.decode_table
    }

    /// Raw sample bytes (one per pixel) per payload byte.
    pub fn compression_ratio(&self) -> f64 {
        (self.width * self.height) as f64 / self.packed.bytes().len().max(1) as f64
    }

    /// Same image with a different declared bit count; the payload is cut or
    /// zero-padded to match.
    pub(crate) fn with_bit_count(&self, bit_count: u64) -> Result<Self> {
        let mut bytes = self.packed.bytes().to_vec();
        bytes.resize(bit_count.div_ceil(8) as usize, 0);
        Ok(CompressedImage {
            packed: PackedBits::new(bytes, bit_count)?,
            ..self.clone()
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let width = u32::try_from(self.width)
            .map_err(|_| CodecError::invalid_arg(format!("width {} exceeds u32", self.width)))?;
        let height = u32::try_from(self.height)
            .map_err(|_| CodecError::invalid_arg(format!("height {} exceeds u32", self.height)))?;
        let entries = self.decode_table.entries();

        writer.write_all(&MAGIC)?;
        writer.write_u8(FORMAT_VERSION)?;
        writer.write_u8(self.quality)?;
        writer.write_u32::<BigEndian>(width)?;
        writer.write_u32::<BigEndian>(height)?;
        writer.write_u64::<BigEndian>(self.packed.bit_count())?;

        writer.write_u16::<BigEndian>(entries.len() as u16)?;
        for (value, code) in &entries {
            writer.write_u8(*value)?;
            writer.write_u8(code.len())?;
            writer.write_u64::<BigEndian>(code.pattern())?;
        }

        writer.write_u64::<BigEndian>(self.packed.bytes().len() as u64)?;
        writer.write_all(self.packed.bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(CodecError::InvalidContainer(format!(
                "bad magic {:02x?}",
                magic
            )));
        }

        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(CodecError::InvalidContainer(format!(
                "unsupported version {}",
                version
            )));
        }

        let quality = reader.read_u8()?;
        let width = reader.read_u32::<BigEndian>()? as usize;
        let height = reader.read_u32::<BigEndian>()? as usize;
        validate_quality(quality).map_err(|e| CodecError::InvalidContainer(e.to_string()))?;
        BlockGrid::new(width, height).map_err(|e| CodecError::InvalidContainer(e.to_string()))?;

        let bit_count = reader.read_u64::<BigEndian>()?;

        let entry_count = reader.read_u16::<BigEndian>()?;
        if entry_count as usize > 256 {
            return Err(CodecError::InvalidContainer(format!(
                "{} decode table entries",
                entry_count
            )));
        }
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            let value = reader.read_u8()?;
            let len = reader.read_u8()?;
            let pattern = reader.read_u64::<BigEndian>()?;
            entries.push((value, Code::new(pattern, len)?));
        }
        let decode_table = DecodeTable::from_entries(entries)?;

        // Every sample costs at most three tokens (escape plus two bytes),
        // each at most one longest code.
        let max_bits = (width as u64)
            .saturating_mul(height as u64)
            .saturating_mul(MAX_TOKEN_LEN as u64)
            .saturating_mul(decode_table.max_code_len() as u64);
        if bit_count > max_bits {
            return Err(CodecError::InvalidContainer(format!(
                "bit count {} exceeds the {} bits a {}x{} image can use",
                bit_count, max_bits, width, height
            )));
        }

        let byte_len = reader.read_u64::<BigEndian>()?;
        if byte_len != bit_count.div_ceil(8) {
            return Err(CodecError::InvalidContainer(format!(
                "payload of {} bytes does not match {} bits",
                byte_len, bit_count
            )));
        }
        let mut bytes = Vec::new();
        reader.by_ref().take(byte_len).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != byte_len {
            return Err(CodecError::InvalidContainer(format!(
                "payload truncated at {} of {} bytes",
                bytes.len(),
                byte_len
            )));
        }

        Ok(CompressedImage {
            quality,
            width,
            height,
            decode_table,
            packed: PackedBits::new(bytes, bit_count)?,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!(
            "Saved {}x{} image ({} payload bytes) to {}",
            self.width,
            self.height,
            self.packed.bytes().len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        Self::read_from(&mut reader)
    }
}
