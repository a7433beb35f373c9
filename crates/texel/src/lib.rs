//! Texel - texture preparation for graphics devices.
//!
//! This crate provides a unified interface to the Texel library ecosystem
//! and the pipeline that turns images and DDS files into device textures.
//!
//! # Crates
//!
//! - [`texel_common`] - Raster images, pixel layouts, cube faces, binary reading
//! - [`texel_image`] - Color transforms, resampling, cube map splitting
//! - [`texel_dxt`] - DXT1/DXT3/DXT5 block compression and decoding
//! - [`texel_dds`] - DDS validation, reading and writing
//!
//! # Pipeline
//!
//! [`TexturePipeline`] drives a [`TextureSink`], the device side, and uses a
//! [`PixelDecoder`] for encoded input. [`MemorySink`] and [`ImageDecoder`]
//! are ready-made implementations.
//!
//! # Example
//!
//! ```no_run
//! use texel::prelude::*;
//!
//! let bytes = std::fs::read("sky.png")?;
//! let mut sink = MemorySink::new(Capabilities::full(4096));
//! let mut pipeline = TexturePipeline::new(&mut sink);
//!
//! let options = TextureOptions::new()
//!     .with_mipmaps(true)
//!     .with_compress_dxt(true)
//!     .with_dds_direct(true);
//! let handle = pipeline.load_texture(&bytes, &ImageDecoder, None, &options, None)?;
//! println!("uploaded texture {handle}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod capabilities;
mod decoder;
mod error;
mod options;
mod pipeline;
mod sink;

// Re-export all sub-crates
pub use texel_common as common;
pub use texel_dds as dds;
pub use texel_dxt as dxt;
pub use texel_image as imaging;

pub use capabilities::Capabilities;
pub use decoder::{DecodeError, ImageDecoder, PixelDecoder};
pub use error::{Error, ErrorKind, Result};
pub use options::TextureOptions;
pub use pipeline::TexturePipeline;
pub use sink::{
    Capability, MemorySink, MemoryTexture, RecordedUpload, Sampling, SinkError, TextureHandle,
    TextureSink, TextureType, Upload, UploadFormat, Wrap,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Capabilities, ImageDecoder, MemorySink, PixelDecoder, TextureOptions, TexturePipeline,
        TextureSink,
    };
    pub use texel_common::{CubeFace, PixelLayout, RasterImage};
    pub use texel_dds::{DdsReader, DdsWriter, TextureKind};
    pub use texel_dxt::DxtFormat;
    pub use texel_image::{FaceOrder, HdrEncoding};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
