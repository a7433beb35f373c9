//! Error types for image transforms.

use thiserror::Error;

/// Errors that can occur while resampling or splitting images.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] texel_common::Error),

    /// Upscale destination smaller than 2x2, or a source too small to sample.
    #[error("cannot upscale {src_width}x{src_height} to {dst_width}x{dst_height}: both images must be at least 2x2")]
    UpscaleTooSmall {
        src_width: u32,
        src_height: u32,
        dst_width: u32,
        dst_height: u32,
    },

    /// Box filter called with an empty image or a zero block size.
    #[error("cannot box-filter a {width}x{height} image with {block_x}x{block_y} blocks")]
    InvalidMipBlock {
        width: u32,
        height: u32,
        block_x: u32,
        block_y: u32,
    },

    /// A single-image cube map that is not a 6:1 strip.
    #[error("single cubemap image must have a 6:1 ratio, got {width}x{height}")]
    CubemapRatio { width: u32, height: u32 },

    /// A face order that is not a permutation of `NSEWUD`.
    #[error("invalid cubemap face order {0:?}: expected each of N, S, E, W, U, D exactly once")]
    InvalidFaceOrder(String),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, Error>;
