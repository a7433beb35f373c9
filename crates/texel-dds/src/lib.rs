//! DDS container handling for Texel.
//!
//! A DDS file is the 4-byte magic `"DDS "`, a 124-byte [`DdsHeader`], then
//! each face's mip chain from largest to smallest. Cube maps repeat the chain
//! for +X, -X, +Y, -Y, +Z, -Z.
//!
//! - [`validate`] - Ordered header checks, reporting the first failure
//! - [`MipChainLayout`] - Level sizes and offsets for a face
//! - [`DdsReader`] - Face-by-face access to a validated buffer
//! - [`DdsWriter`] - Building files from images, optionally DXT compressed
//!
//! Only DXT1, DXT3 and DXT5 compressed data and 24/32-bit BGR(A) data are
//! supported.

mod error;
pub mod header;
mod layout;
mod reader;
mod validate;
mod writer;

pub use error::{Error, MalformedReason, Result};
pub use header::{DdsHeader, DdsPixelFormat, FourCC};
pub use layout::{
    full_chain_len, level_dimensions, MipChainLayout, MipLevel, SurfaceFormat, TextureKind,
};
pub use reader::{DdsFaces, DdsLevel, DdsReader, DdsSurface};
pub use validate::validate;
pub use writer::{build_header, DdsWriter};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// Magic plus header.
pub const DDS_PREFIX_SIZE: usize = 4 + DdsHeader::SIZE as usize;
