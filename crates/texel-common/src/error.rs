//! Error types for texel-common.

use thiserror::Error;

/// Common error type for Texel operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// Channel count outside of 1..=4.
    #[error("unsupported channel count: {0} (expected 1 to 4)")]
    InvalidChannelCount(usize),

    /// Pixel buffer length does not match `width * height * channels`.
    #[error("pixel buffer size mismatch for {width}x{height}x{channels}: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    /// A rectangle that does not fit inside the image.
    #[error("region {width}x{height} at ({x}, {y}) is outside of a {image_width}x{image_height} image")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
