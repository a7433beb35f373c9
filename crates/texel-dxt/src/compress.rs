//! Whole-image compression.

use texel_common::{PixelLayout, RasterImage};
use tracing::debug;

use crate::bc1::Bc1Encoder;
use crate::bc2::Bc2Encoder;
use crate::bc3::Bc3Encoder;
use crate::{DxtFormat, Error, Result};

/// A compressed surface and the dimensions it was compressed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub format: DxtFormat,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Compress with DXT1 for odd channel counts and DXT5 for even ones.
pub fn compress(image: &RasterImage) -> Result<CompressedImage> {
    let format = DxtFormat::for_channels(image.channels());
    let data = compress_image(image, format)?;
    Ok(CompressedImage {
        format,
        width: image.width(),
        height: image.height(),
        data,
    })
}

/// Compress every 4x4 block of `image` into `format`.
///
/// Blocks that overhang the right or bottom edge repeat the last column or
/// row. Fails with [`Error::OutOfMemory`] when the output cannot be
/// allocated, which callers can treat as a cue to upload uncompressed data.
pub fn compress_image(image: &RasterImage, format: DxtFormat) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if image.is_empty() {
        return Err(Error::InvalidDimensions { width, height });
    }

    let mut output = allocate(format.compressed_size(width, height))?;
    debug!(width, height, %format, bytes = output.capacity(), "compressing image");

    for block_y in 0..height.div_ceil(4) {
        for block_x in 0..width.div_ceil(4) {
            let pixels = extract_block(image, block_x * 4, block_y * 4);
            match format {
                DxtFormat::Dxt1 => output.extend_from_slice(&Bc1Encoder::compress_block(&pixels)),
                DxtFormat::Dxt3 => output.extend_from_slice(&Bc2Encoder::compress_block(&pixels)),
                DxtFormat::Dxt5 => output.extend_from_slice(&Bc3Encoder::compress_block(&pixels)),
            }
        }
    }

    Ok(output)
}

fn allocate(bytes: usize) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    output
        .try_reserve_exact(bytes)
        .map_err(|_| Error::OutOfMemory { bytes })?;
    Ok(output)
}

/// Gather the 4x4 block at `(x0, y0)` as RGBA, clamping reads to the image.
fn extract_block(image: &RasterImage, x0: u32, y0: u32) -> [[u8; 4]; 16] {
    let max_x = image.width() - 1;
    let max_y = image.height() - 1;

    let mut block = [[0u8; 4]; 16];
    for (i, out) in block.iter_mut().enumerate() {
        let x = (x0 + (i % 4) as u32).min(max_x);
        let y = (y0 + (i / 4) as u32).min(max_y);
        *out = to_rgba(image.layout(), image.pixel(x, y));
    }
    block
}

#[inline]
fn to_rgba(layout: PixelLayout, pixel: &[u8]) -> [u8; 4] {
    match layout {
        PixelLayout::Luminance => [pixel[0], pixel[0], pixel[0], 255],
        PixelLayout::LuminanceAlpha => [pixel[0], pixel[0], pixel[0], pixel[1]],
        PixelLayout::Rgb => [pixel[0], pixel[1], pixel[2], 255],
        PixelLayout::Rgba => [pixel[0], pixel[1], pixel[2], pixel[3]],
    }
}
