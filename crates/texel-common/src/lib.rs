//! Common utilities for Texel.
//!
//! This crate provides the foundational types shared by all Texel crates:
//!
//! - [`RasterImage`] - An owned, length-checked interleaved 8-bit image
//! - [`PixelLayout`] - Channel layouts (1 to 4 channels)
//! - [`CubeFace`] / [`TextureTarget`] - Cube map directions and upload targets
//! - [`BinaryReader`] - Magic and fixed-layout header reading

mod error;
mod face;
mod raster;
mod reader;

pub use error::{Error, Result};
pub use face::{CubeFace, TextureTarget};
pub use raster::{PixelLayout, RasterImage};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
