//! Decompressing whole surfaces back to RGBA.

use texel_common::{PixelLayout, RasterImage};

use crate::bc1::decode_dxt1_block;
use crate::bc2::decode_dxt3_block;
use crate::bc3::decode_dxt5_block;
use crate::{DxtFormat, Error, Result};

/// Decode a `width x height` surface of `format` blocks into an RGBA image.
///
/// Trailing bytes past the surface are ignored.
pub fn decompress_image(
    data: &[u8],
    width: u32,
    height: u32,
    format: DxtFormat,
) -> Result<RasterImage> {
    let expected = format
        .checked_compressed_size(width, height)
        .unwrap_or(usize::MAX);
    if data.len() < expected {
        return Err(Error::BufferTooSmall {
            expected,
            actual: data.len(),
        });
    }

    let mut image = RasterImage::blank(width, height, PixelLayout::Rgba);
    if image.is_empty() {
        return Ok(image);
    }

    let blocks_wide = width.div_ceil(4) as usize;
    let stride = image.stride();
    let out = image.data_mut();

    for (index, chunk) in data[..expected]
        .chunks_exact(format.block_size())
        .enumerate()
    {
        let pixels = decode_block(chunk, format);
        let x0 = (index % blocks_wide) as u32 * 4;
        let y0 = (index / blocks_wide) as u32 * 4;

        for (i, pixel) in pixels.iter().enumerate() {
            let x = x0 + (i % 4) as u32;
            let y = y0 + (i / 4) as u32;
            if x < width && y < height {
                let start = y as usize * stride + x as usize * 4;
                out[start..start + 4].copy_from_slice(pixel);
            }
        }
    }

    Ok(image)
}

fn decode_block(chunk: &[u8], format: DxtFormat) -> [[u8; 4]; 16] {
    match format {
        DxtFormat::Dxt1 => {
            let mut block = [0u8; 8];
            block.copy_from_slice(chunk);
            decode_dxt1_block(&block)
        }
        DxtFormat::Dxt3 | DxtFormat::Dxt5 => {
            let mut block = [0u8; 16];
            block.copy_from_slice(chunk);
            if format == DxtFormat::Dxt3 {
                decode_dxt3_block(&block)
            } else {
                decode_dxt5_block(&block)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress_image;
    use rstest::rstest;

    #[rstest]
    #[case(DxtFormat::Dxt1)]
    #[case(DxtFormat::Dxt3)]
    #[case(DxtFormat::Dxt5)]
    fn test_solid_color_survives(#[case] format: DxtFormat) {
        // Pure RGB565-representable colors with full alpha decode exactly.
        let image = RasterImage::filled(8, 6, PixelLayout::Rgba, &[0, 255, 0, 255]).unwrap();
        let data = compress_image(&image, format).unwrap();
        let decoded = decompress_image(&data, 8, 6, format).unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.data(), image.data());
    }

    #[test]
    fn test_short_input() {
        assert!(matches!(
            decompress_image(&[0; 7], 4, 4, DxtFormat::Dxt1),
            Err(Error::BufferTooSmall {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_oversized_dimensions() {
        assert!(matches!(
            decompress_image(&[0; 16], u32::MAX, u32::MAX, DxtFormat::Dxt5),
            Err(Error::BufferTooSmall {
                expected: usize::MAX,
                actual: 16
            })
        ));
    }
}
