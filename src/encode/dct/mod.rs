// src/encode/dct/mod.rs

//! Per-block frequency transform, quantization and scan order.

pub mod quantize;
pub mod stream;
pub mod transform;
pub mod zigzag;

pub use quantize::{QuantizationMatrix, QuantizedBlock, dequantize, quantize};
pub use transform::{Block, LEVEL_SHIFT};
