//! Bilinear upscaling, box-filter reduction and mipmap chains.

use texel_common::RasterImage;
use tracing::debug;

use crate::{Error, Result};

/// Upscale `src` to `dst_width x dst_height` with bilinear filtering.
///
/// Both the source and the destination must be at least 2x2.
pub fn upscale_image(src: &RasterImage, dst_width: u32, dst_height: u32) -> Result<RasterImage> {
    let (width, height) = src.dimensions();
    if width < 2 || height < 2 || dst_width < 2 || dst_height < 2 {
        return Err(Error::UpscaleTooSmall {
            src_width: width,
            src_height: height,
            dst_width,
            dst_height,
        });
    }

    let channels = src.channels();
    let stride = src.stride();
    let orig = src.data();
    let dx = (width as f32 - 1.0) / (dst_width as f32 - 1.0);
    let dy = (height as f32 - 1.0) / (dst_height as f32 - 1.0);

    let mut out = RasterImage::blank(dst_width, dst_height, src.layout());
    let dst_stride = out.stride();
    let resampled = out.data_mut();

    for y in 0..dst_height as usize {
        let sample_y = y as f32 * dy;
        let base_y = (sample_y as usize).min(height as usize - 2);
        let fy = sample_y - base_y as f32;

        for x in 0..dst_width as usize {
            let sample_x = x as f32 * dx;
            let base_x = (sample_x as usize).min(width as usize - 2);
            let fx = sample_x - base_x as f32;

            let base = base_y * stride + base_x * channels;
            let dst = y * dst_stride + x * channels;
            for c in 0..channels {
                let i = base + c;
                let value = 0.5
                    + orig[i] as f32 * (1.0 - fx) * (1.0 - fy)
                    + orig[i + channels] as f32 * fx * (1.0 - fy)
                    + orig[i + stride] as f32 * (1.0 - fx) * fy
                    + orig[i + stride + channels] as f32 * fx * fy;
                resampled[dst + c] = value as u8;
            }
        }
    }

    Ok(out)
}

/// Reduce `src` by averaging `block_x x block_y` blocks.
///
/// The output is `max(1, width / block_x) x max(1, height / block_y)`.
/// Blocks that overhang the right or bottom edge only average the pixels
/// that exist.
pub fn mipmap_image(src: &RasterImage, block_x: u32, block_y: u32) -> Result<RasterImage> {
    let (width, height) = src.dimensions();
    if src.is_empty() || block_x == 0 || block_y == 0 {
        return Err(Error::InvalidMipBlock {
            width,
            height,
            block_x,
            block_y,
        });
    }

    let mip_width = (width / block_x).max(1);
    let mip_height = (height / block_y).max(1);
    let channels = src.channels();
    let stride = src.stride();
    let orig = src.data();

    let mut out = RasterImage::blank(mip_width, mip_height, src.layout());
    let resampled = out.data_mut();
    let mut dst = 0;

    for j in 0..mip_height {
        let top = j * block_y;
        let v_block = block_y.min(height - top) as usize;

        for i in 0..mip_width {
            let left = i * block_x;
            let u_block = block_x.min(width - left) as usize;
            let area = u_block * v_block;
            let origin = top as usize * stride + left as usize * channels;

            for c in 0..channels {
                let mut sum = area / 2;
                for v in 0..v_block {
                    let row = origin + v * stride + c;
                    for u in 0..u_block {
                        sum += orig[row + u * channels] as usize;
                    }
                }
                resampled[dst] = (sum / area) as u8;
                dst += 1;
            }
        }
    }

    Ok(out)
}

/// Smallest power-of-two dimensions that hold `width x height`.
pub fn next_power_of_two_size(width: u32, height: u32) -> (u32, u32) {
    (width.next_power_of_two(), height.next_power_of_two())
}

/// Whether both dimensions are powers of two.
pub fn is_power_of_two(width: u32, height: u32) -> bool {
    width.is_power_of_two() && height.is_power_of_two()
}

/// Upscale to power-of-two dimensions. Images that already have them are
/// returned unchanged.
pub fn resize_to_power_of_two(src: RasterImage) -> Result<RasterImage> {
    let (width, height) = src.dimensions();
    let (new_width, new_height) = next_power_of_two_size(width, height);
    if (new_width, new_height) == (width, height) {
        return Ok(src);
    }

    debug!(width, height, new_width, new_height, "upscaling to power of two");
    upscale_image(&src, new_width, new_height)
}

/// Box-reduce an image until both dimensions fit `max_size`.
///
/// Intended for power-of-two images, where the block sizes divide evenly.
pub fn reduce_to_max_size(src: RasterImage, max_size: u32) -> Result<RasterImage> {
    let (width, height) = src.dimensions();
    if max_size == 0 || (width <= max_size && height <= max_size) {
        return Ok(src);
    }

    let block_x = if width > max_size { width / max_size } else { 1 };
    let block_y = if height > max_size { height / max_size } else { 1 };
    debug!(width, height, max_size, block_x, block_y, "reducing to maximum size");
    mipmap_image(&src, block_x, block_y)
}

/// Number of levels in a full mip chain, including the base level.
pub fn mip_chain_len(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    32 - largest.leading_zeros()
}

/// Mip levels `1..` for `base`, each box-filtered directly from the base.
///
/// Level `n` uses `2^n x 2^n` blocks. The chain stops once the block is
/// larger than both dimensions, so the last level is 1x1 for power-of-two
/// input.
pub fn generate_mip_chain(base: &RasterImage) -> Result<Vec<RasterImage>> {
    let (width, height) = base.dimensions();
    let mut levels = Vec::new();
    let mut level = 1u32;
    while level < 32 && (1u32 << level <= width || 1u32 << level <= height) {
        let block = 1u32 << level;
        levels.push(mipmap_image(base, block, block)?);
        level += 1;
    }
    Ok(levels)
}
