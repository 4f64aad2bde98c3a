//! # DCT Codec Library
//!
//! A lossy codec for single-channel grayscale images, built from three
//! stages applied to 8×8 blocks:
//!
//! 1. a 2D discrete cosine transform,
//! 2. quality-driven quantization followed by a zig-zag scan,
//! 3. Huffman coding of the resulting byte stream.
//!
//! The library is organized into several modules:
//! - `utils`: error handling and the worker pool
//! - `core`: codec options and constants
//! - `image`: sample matrices, block addressing and the compressed container
//! - `encode`: the transform, quantizer, entropy coder and the pipeline that
//!   chains them
//!
//! ```no_run
//! use dct_codec::{CodecOptions, SampleMatrix, compress, decompress};
//!
//! # fn main() -> dct_codec::Result<()> {
//! let pixels = vec![128u8; 64 * 48];
//! let matrix = SampleMatrix::from_gray_bytes(64, 48, &pixels)?;
//! let options = CodecOptions::default().with_quality(80);
//!
//! let image = compress(&matrix, &options)?;
//! image.save("picture.dctq")?;
//!
//! let restored = decompress(&image, options.workers)?;
//! assert_eq!(restored.to_gray_bytes().len(), pixels.len());
//! # Ok(())
//! # }
//! ```

// Re-export commonly used types at the crate root
pub use crate::utils::error::{CodecError, Result};

pub mod utils {
    pub mod error;
    pub mod threads;
}

pub mod core {
    pub mod options;
}

pub mod image {
    pub mod compressed;
    pub mod matrix;
}

pub mod encode {
    pub mod dct;
    pub mod huffman;
    pub mod pipeline;
}

// Public API exports
pub use crate::core::options::{BLOCK_SIZE, CodecOptions, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
pub use crate::encode::pipeline::{compress, decompress};
pub use crate::image::compressed::CompressedImage;
pub use crate::image::matrix::{BlockGrid, SampleMatrix};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
