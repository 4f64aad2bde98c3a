// src/core/options.rs

//! Codec configuration.
//!
//! Options are plain values passed into [`compress`](crate::compress) and
//! down into each stage. Nothing here is process-global.

use crate::utils::error::{CodecError, Result};

/// Edge length of a transform block.
pub const BLOCK_SIZE: usize = 8;

/// Number of samples in one block.
pub const BLOCK_AREA: usize = BLOCK_SIZE * BLOCK_SIZE;

/// Lowest accepted quality.
pub const MIN_QUALITY: u8 = 1;

/// Highest accepted quality.
pub const MAX_QUALITY: u8 = 99;

/// Quality used when none is given.
pub const DEFAULT_QUALITY: u8 = 70;

/// Parameters for one compression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Perceptual quality in `[1, 99]`; higher keeps more detail.
    pub quality: u8,
    /// Number of worker threads; must be at least 1.
    pub workers: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            workers: default_workers(),
        }
    }
}

impl CodecOptions {
    pub fn new(quality: u8, workers: usize) -> Self {
        Self { quality, workers }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Checks both options before any work starts.
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)?;
        if self.workers == 0 {
            return Err(CodecError::invalid_arg(
                "worker count must be a positive integer",
            ));
        }
        Ok(())
    }
}

/// Rejects qualities outside `[MIN_QUALITY, MAX_QUALITY]`.
pub fn validate_quality(quality: u8) -> Result<()> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(CodecError::invalid_arg(format!(
            "quality must be in [{}, {}], got {}",
            MIN_QUALITY, MAX_QUALITY, quality
        )));
    }
    Ok(())
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
