use std::io;
use thiserror::Error;

/// Main error type for the codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A caller-supplied parameter is out of range (quality, workers, dimensions).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The encoded bit stream does not decode to a complete image.
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),
    /// A code or decode table that no well-formed Huffman tree could produce.
    #[error("Malformed Huffman tree: {0}")]
    MalformedTree(String),
    /// The persisted container is structurally invalid.
    #[error("Invalid container: {0}")]
    InvalidContainer(String),
    /// The worker pool could not be started.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    pub(crate) fn invalid_arg(msg: impl Into<String>) -> Self {
        CodecError::InvalidArgument(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        CodecError::CorruptStream(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CodecError::MalformedTree(msg.into())
    }
}

#[cfg(feature = "rayon")]
impl From<rayon::ThreadPoolBuildError> for CodecError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        CodecError::ThreadPool(err.to_string())
    }
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
