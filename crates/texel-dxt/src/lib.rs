//! S3TC block compression for Texel.
//!
//! Images are compressed in 4x4 blocks:
//! - DXT1 - 8 bytes per block, RGB
//! - DXT3 - 16 bytes per block, RGB plus explicit 4-bit alpha
//! - DXT5 - 16 bytes per block, RGB plus interpolated alpha
//!
//! Endpoints are the bounding box of each block's colors; each pixel then
//! takes the nearest palette entry.
//!
//! # Example
//!
//! ```
//! use texel_common::{PixelLayout, RasterImage};
//! use texel_dxt::{compress, DxtFormat};
//!
//! let image = RasterImage::blank(16, 16, PixelLayout::Rgb);
//! let compressed = compress(&image)?;
//! assert_eq!(compressed.format, DxtFormat::Dxt1);
//! assert_eq!(compressed.data.len(), 128);
//! # Ok::<(), texel_dxt::Error>(())
//! ```

mod bc1;
mod bc2;
mod bc3;
mod compress;
mod decode;
mod error;
mod format;
pub mod rgb565;

pub use bc1::{decode_dxt1_block, Bc1Encoder};
pub use bc2::{decode_dxt3_block, Bc2Encoder};
pub use bc3::{decode_dxt5_block, Bc3Encoder};
pub use compress::{compress, compress_image, CompressedImage};
pub use decode::decompress_image;
pub use error::{Error, Result};
pub use format::DxtFormat;
