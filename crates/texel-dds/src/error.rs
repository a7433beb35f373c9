//! Error types for DDS handling.

use texel_common::TextureTarget;
use thiserror::Error;

use crate::TextureKind;

/// The first validation rule a DDS buffer broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MalformedReason {
    #[error("buffer is shorter than the 128-byte header")]
    TooSmall,
    #[error("magic is not 'DDS '")]
    BadMagic,
    #[error("header size is not 124")]
    BadHeaderSize,
    #[error("header lacks one of the CAPS, HEIGHT, WIDTH or PIXELFORMAT flags")]
    MissingRequiredFlags,
    #[error("pixel format size is not 32")]
    BadPixelFormatSize,
    #[error("pixel format is neither FOURCC nor RGB")]
    NoPixelFormat,
    #[error("caps do not declare a texture")]
    NotATexture,
    #[error("FourCC is not DXT1, DXT3 or DXT5")]
    UnsupportedFourCc,
    #[error("surface dimensions are too large to address")]
    SurfaceTooLarge,
}

/// Errors that can occur when working with DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] texel_common::Error),

    /// Block compression error.
    #[error("{0}")]
    Dxt(#[from] texel_dxt::Error),

    /// The buffer is not a DDS texture we can read.
    #[error("malformed DDS: {0}")]
    Malformed(MalformedReason),

    /// A cube map where a plain texture was requested, or the reverse.
    #[error("expected a {expected} DDS texture, found a {actual}")]
    KindMismatch {
        expected: TextureKind,
        actual: TextureKind,
    },

    /// Surface data ends before a face's mip chain is complete.
    #[error("DDS data truncated in {face}: need {needed} bytes, {available} available")]
    Truncated {
        face: TextureTarget,
        needed: usize,
        available: usize,
    },

    /// A level that is not the expected size for its position in the chain.
    #[error("mip level {level} is {actual_width}x{actual_height}, expected {width}x{height}")]
    LevelMismatch {
        level: usize,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Writing needs at least one level with at least one pixel.
    #[error("cannot write an empty image")]
    EmptyImage,

    /// Cube faces that are not square or differ in size or channel layout.
    #[error("cube map faces must be square and identical in size and layout")]
    FaceMismatch,
}

impl From<MalformedReason> for Error {
    fn from(reason: MalformedReason) -> Self {
        Error::Malformed(reason)
    }
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
