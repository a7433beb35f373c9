//! Error types for block compression.

use thiserror::Error;

/// Errors that can occur when compressing or decompressing DXT data.
#[derive(Debug, Error)]
pub enum Error {
    /// The output buffer could not be allocated.
    #[error("out of memory allocating {bytes} bytes of compressed data")]
    OutOfMemory { bytes: usize },

    /// Compression needs at least one pixel.
    #[error("cannot compress a {width}x{height} image")]
    InvalidDimensions { width: u32, height: u32 },

    /// Compressed input shorter than its dimensions require.
    #[error("compressed data too short: need {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
}

/// Result type for DXT operations.
pub type Result<T> = std::result::Result<T, Error>;
