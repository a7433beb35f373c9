//! DXT1 (BC1) color blocks.
//!
//! A 4x4 block packs into 8 bytes:
//! - 2 bytes: color0 (RGB565)
//! - 2 bytes: color1 (RGB565)
//! - 4 bytes: sixteen 2-bit palette indices, pixel 0 in the lowest bits
//!
//! With `color0 > color1` the palette is color0, color1, 2/3 c0 + 1/3 c1 and
//! 1/3 c0 + 2/3 c1. Otherwise index 2 is the midpoint and index 3 is
//! transparent black.

use byteorder::{ByteOrder, LittleEndian};

use crate::rgb565::{
    color_distance_squared, lerp_u8, opaque_palette, rgb565_to_rgb888, rgb888_to_rgb565,
};

/// Encoder for DXT1 color blocks. DXT3 and DXT5 reuse it for their color half.
pub struct Bc1Encoder;

impl Bc1Encoder {
    /// Compress 16 RGBA pixels (row-major) into an 8-byte color block.
    ///
    /// Alpha is ignored.
    pub fn compress_block(pixels: &[[u8; 4]; 16]) -> [u8; 8] {
        let (c0, c1) = Self::find_endpoints(pixels);
        let (c0, c1) = if c0 >= c1 { (c0, c1) } else { (c1, c0) };

        let indices = if c0 == c1 {
            0
        } else {
            Self::generate_indices(pixels, c0, c1)
        };

        let mut output = [0u8; 8];
        LittleEndian::write_u16(&mut output[0..2], c0);
        LittleEndian::write_u16(&mut output[2..4], c1);
        LittleEndian::write_u32(&mut output[4..8], indices);
        output
    }

    /// Bounding box of the block's colors as (max, min) in RGB565.
    fn find_endpoints(pixels: &[[u8; 4]; 16]) -> (u16, u16) {
        let mut min = [255u8; 3];
        let mut max = [0u8; 3];
        for pixel in pixels {
            for c in 0..3 {
                min[c] = min[c].min(pixel[c]);
                max[c] = max[c].max(pixel[c]);
            }
        }

        (
            rgb888_to_rgb565(max[0], max[1], max[2]),
            rgb888_to_rgb565(min[0], min[1], min[2]),
        )
    }

    /// Nearest palette entry for every pixel, packed 2 bits each.
    fn generate_indices(pixels: &[[u8; 4]; 16], c0: u16, c1: u16) -> u32 {
        let palette = opaque_palette(c0, c1);

        let mut indices = 0u32;
        for (i, pixel) in pixels.iter().enumerate() {
            let mut best_dist = u32::MAX;
            let mut best_index = 0u32;
            for (idx, color) in palette.iter().enumerate() {
                let dist = color_distance_squared(pixel, color);
                if dist < best_dist {
                    best_dist = dist;
                    best_index = idx as u32;
                }
            }
            indices |= best_index << (i * 2);
        }
        indices
    }
}

/// Palette of a DXT1 block, honoring the three-color transparent mode.
fn dxt1_palette(c0: u16, c1: u16) -> [[u8; 4]; 4] {
    let a = rgb565_to_rgb888(c0);
    let b = rgb565_to_rgb888(c1);

    if c0 > c1 {
        opaque_palette(c0, c1).map(|[r, g, b]| [r, g, b, 255])
    } else {
        let mid = [
            lerp_u8(a[0], b[0], 1, 2),
            lerp_u8(a[1], b[1], 1, 2),
            lerp_u8(a[2], b[2], 1, 2),
        ];
        [
            [a[0], a[1], a[2], 255],
            [b[0], b[1], b[2], 255],
            [mid[0], mid[1], mid[2], 255],
            [0, 0, 0, 0],
        ]
    }
}

/// Decode an 8-byte DXT1 block into 16 RGBA pixels.
pub fn decode_dxt1_block(block: &[u8; 8]) -> [[u8; 4]; 16] {
    let c0 = LittleEndian::read_u16(&block[0..2]);
    let c1 = LittleEndian::read_u16(&block[2..4]);
    let indices = LittleEndian::read_u32(&block[4..8]);
    let palette = dxt1_palette(c0, c1);

    let mut pixels = [[0u8; 4]; 16];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        *pixel = palette[((indices >> (i * 2)) & 0b11) as usize];
    }
    pixels
}

/// Decode the 8-byte color half of a DXT3/DXT5 block. Alpha is left at 255.
pub(crate) fn decode_color_block(block: &[u8]) -> [[u8; 4]; 16] {
    let c0 = LittleEndian::read_u16(&block[0..2]);
    let c1 = LittleEndian::read_u16(&block[2..4]);
    let indices = LittleEndian::read_u32(&block[4..8]);
    let palette = opaque_palette(c0, c1);

    let mut pixels = [[0u8; 4]; 16];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        let [r, g, b] = palette[((indices >> (i * 2)) & 0b11) as usize];
        *pixel = [r, g, b, 255];
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(block: &[u8; 8]) -> (u16, u16) {
        (
            LittleEndian::read_u16(&block[0..2]),
            LittleEndian::read_u16(&block[2..4]),
        )
    }

    #[test]
    fn test_solid_black() {
        let block = Bc1Encoder::compress_block(&[[0, 0, 0, 255]; 16]);
        assert_eq!(block, [0; 8]);
    }

    #[test]
    fn test_solid_red_round_trip() {
        let block = Bc1Encoder::compress_block(&[[255, 0, 0, 255]; 16]);
        assert_eq!(endpoints(&block), (0xF800, 0xF800));
        assert_eq!(decode_dxt1_block(&block), [[255, 0, 0, 255]; 16]);
    }

    #[test]
    fn test_two_colors_use_four_color_mode() {
        let mut pixels = [[0u8, 0, 0, 255]; 16];
        for pixel in &mut pixels[8..] {
            *pixel = [255, 255, 255, 255];
        }

        let block = Bc1Encoder::compress_block(&pixels);
        let (c0, c1) = endpoints(&block);
        assert_eq!((c0, c1), (0xFFFF, 0x0000));

        let decoded = decode_dxt1_block(&block);
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn test_gradient_stays_close() {
        let mut pixels = [[0u8; 4]; 16];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            let v = (i * 255 / 15) as u8;
            *pixel = [v, v, v, 255];
        }

        let decoded = decode_dxt1_block(&Bc1Encoder::compress_block(&pixels));
        for (got, want) in decoded.iter().zip(&pixels) {
            assert!((got[0] as i32 - want[0] as i32).abs() <= 48);
            assert_eq!(got[3], 255);
        }
    }

    #[test]
    fn test_three_color_mode_decodes_transparent() {
        // color0 <= color1 selects the transparent palette; index 3 everywhere.
        let block = [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(decode_dxt1_block(&block), [[0, 0, 0, 0]; 16]);
    }
}
