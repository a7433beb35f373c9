//! Error types for texture preparation.

use thiserror::Error;

use crate::decoder::DecodeError;
use crate::sink::{Capability, SinkError};

/// Broad classes of failure, for callers that branch on the cause rather
/// than on the exact error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// The container header failed validation or is not the expected kind.
    MalformedContainer,
    /// The device lacks a feature the request needs.
    UnsupportedCapability,
    /// Image dimensions break an operation's requirements.
    DimensionContract,
    /// Input ended before the data it declares.
    TruncatedInput,
    /// An allocation failed.
    ResourceExhausted,
    /// The pixel decoder rejected the input.
    Decode,
    /// A caller-supplied argument is invalid, such as a face order.
    InvalidArgument,
    /// The texture sink reported a failure.
    Sink,
}

/// Errors that can occur while preparing or uploading textures.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] texel_common::Error),

    /// Transform, resampling or cube map error.
    #[error("{0}")]
    Image(#[from] texel_image::Error),

    /// Block compression error.
    #[error("{0}")]
    Dxt(#[from] texel_dxt::Error),

    /// DDS container error.
    #[error("{0}")]
    Dds(#[from] texel_dds::Error),

    /// Pixel decoder error.
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// Texture sink error.
    #[error("{0}")]
    Sink(#[from] SinkError),

    /// The device does not support a required capability.
    #[error("device does not support {0}")]
    Unsupported(Capability),

    /// Textures need at least one pixel.
    #[error("cannot create a texture from a {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Common(err) => common_kind(err),
            Error::Image(err) => image_kind(err),
            Error::Dxt(err) => dxt_kind(err),
            Error::Dds(err) => dds_kind(err),
            Error::Decode(_) => ErrorKind::Decode,
            Error::Sink(_) => ErrorKind::Sink,
            Error::Unsupported(_) => ErrorKind::UnsupportedCapability,
            Error::EmptyImage { .. } => ErrorKind::DimensionContract,
        }
    }
}

fn common_kind(err: &texel_common::Error) -> ErrorKind {
    use texel_common::Error as E;
    match err {
        E::UnexpectedEof { .. } => ErrorKind::TruncatedInput,
        E::InvalidMagic { .. } => ErrorKind::MalformedContainer,
        E::RegionOutOfBounds { .. } => ErrorKind::DimensionContract,
        E::InvalidChannelCount(_) | E::BufferSizeMismatch { .. } => ErrorKind::InvalidArgument,
    }
}

fn image_kind(err: &texel_image::Error) -> ErrorKind {
    use texel_image::Error as E;
    match err {
        E::Common(err) => common_kind(err),
        E::UpscaleTooSmall { .. } | E::InvalidMipBlock { .. } | E::CubemapRatio { .. } => {
            ErrorKind::DimensionContract
        }
        E::InvalidFaceOrder(_) => ErrorKind::InvalidArgument,
    }
}

fn dxt_kind(err: &texel_dxt::Error) -> ErrorKind {
    use texel_dxt::Error as E;
    match err {
        E::OutOfMemory { .. } => ErrorKind::ResourceExhausted,
        E::InvalidDimensions { .. } => ErrorKind::DimensionContract,
        E::BufferTooSmall { .. } => ErrorKind::TruncatedInput,
    }
}

fn dds_kind(err: &texel_dds::Error) -> ErrorKind {
    use texel_dds::Error as E;
    match err {
        E::Common(err) => common_kind(err),
        E::Dxt(err) => dxt_kind(err),
        E::Malformed(_) | E::KindMismatch { .. } => ErrorKind::MalformedContainer,
        E::Truncated { .. } => ErrorKind::TruncatedInput,
        E::LevelMismatch { .. } | E::EmptyImage | E::FaceMismatch => ErrorKind::DimensionContract,
    }
}

/// Result type for texture preparation.
pub type Result<T> = std::result::Result<T, Error>;
