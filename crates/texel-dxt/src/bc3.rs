//! DXT5 (BC3) blocks.
//!
//! A 4x4 block packs into 16 bytes:
//! - 1 byte: alpha0
//! - 1 byte: alpha1
//! - 6 bytes: sixteen 3-bit alpha indices
//! - 8 bytes: DXT1 color block

use byteorder::{ByteOrder, LittleEndian};

use crate::bc1::{decode_color_block, Bc1Encoder};
use crate::rgb565::lerp_u8;

pub struct Bc3Encoder;

impl Bc3Encoder {
    /// Compress 16 RGBA pixels (row-major) into a 16-byte block.
    pub fn compress_block(pixels: &[[u8; 4]; 16]) -> [u8; 16] {
        let mut output = [0u8; 16];
        output[0..8].copy_from_slice(&Self::compress_alpha(pixels));
        output[8..16].copy_from_slice(&Bc1Encoder::compress_block(pixels));
        output
    }

    /// Max alpha as alpha0 and min as alpha1, which selects the 8-value ramp.
    fn compress_alpha(pixels: &[[u8; 4]; 16]) -> [u8; 8] {
        let mut min_alpha = 255u8;
        let mut max_alpha = 0u8;
        for pixel in pixels {
            min_alpha = min_alpha.min(pixel[3]);
            max_alpha = max_alpha.max(pixel[3]);
        }

        let mut output = [0u8; 8];
        output[0] = max_alpha;
        output[1] = min_alpha;
        if max_alpha == min_alpha {
            return output;
        }

        let palette = alpha_palette(max_alpha, min_alpha);
        let mut indices = 0u64;
        for (i, pixel) in pixels.iter().enumerate() {
            let mut best_dist = u32::MAX;
            let mut best_index = 0u64;
            for (idx, &value) in palette.iter().enumerate() {
                let dist = (pixel[3] as i32 - value as i32).unsigned_abs();
                if dist < best_dist {
                    best_dist = dist;
                    best_index = idx as u64;
                }
            }
            indices |= best_index << (i * 3);
        }
        LittleEndian::write_u48(&mut output[2..8], indices);
        output
    }
}

/// Alpha ramp for a DXT5 block.
///
/// `alpha0 > alpha1` interpolates six values between the endpoints;
/// otherwise four are interpolated and indices 6 and 7 are 0 and 255.
fn alpha_palette(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let mut palette = [0u8; 8];
    palette[0] = alpha0;
    palette[1] = alpha1;
    if alpha0 > alpha1 {
        for (k, value) in palette[2..].iter_mut().enumerate() {
            *value = lerp_u8(alpha0, alpha1, k as u32 + 1, 7);
        }
    } else {
        for (k, value) in palette[2..6].iter_mut().enumerate() {
            *value = lerp_u8(alpha0, alpha1, k as u32 + 1, 5);
        }
        palette[6] = 0;
        palette[7] = 255;
    }
    palette
}

/// Decode a 16-byte DXT5 block into 16 RGBA pixels.
pub fn decode_dxt5_block(block: &[u8; 16]) -> [[u8; 4]; 16] {
    let palette = alpha_palette(block[0], block[1]);
    let indices = LittleEndian::read_u48(&block[2..8]);

    let mut pixels = decode_color_block(&block[8..16]);
    for (i, pixel) in pixels.iter_mut().enumerate() {
        pixel[3] = palette[((indices >> (i * 3)) & 0b111) as usize];
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_alpha() {
        let block = Bc3Encoder::compress_block(&[[128, 64, 192, 200]; 16]);
        assert_eq!(block[0], 200);
        assert_eq!(block[1], 200);
        assert_eq!(&block[2..8], &[0; 6]);
        assert!(decode_dxt5_block(&block).iter().all(|p| p[3] == 200));
    }

    #[test]
    fn test_alpha_endpoints_round_trip() {
        let mut pixels = [[0u8, 0, 0, 0]; 16];
        for pixel in &mut pixels[8..] {
            pixel[3] = 255;
        }

        let block = Bc3Encoder::compress_block(&pixels);
        assert_eq!(block[0], 255);
        assert_eq!(block[1], 0);

        let decoded = decode_dxt5_block(&block);
        for (got, want) in decoded.iter().zip(&pixels) {
            assert_eq!(got[3], want[3]);
        }
    }

    #[test]
    fn test_alpha_gradient_error_bound() {
        let mut pixels = [[0u8; 4]; 16];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            pixel[3] = (i * 17) as u8;
        }

        let decoded = decode_dxt5_block(&Bc3Encoder::compress_block(&pixels));
        for (got, want) in decoded.iter().zip(&pixels) {
            // Half of one ramp step: 255 / 7 / 2.
            assert!((got[3] as i32 - want[3] as i32).abs() <= 19);
        }
    }

    #[test]
    fn test_six_value_palette() {
        let palette = alpha_palette(0, 100);
        assert_eq!(palette, [0, 100, 20, 40, 60, 80, 0, 255]);
    }
}
