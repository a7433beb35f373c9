//! DXT3 (BC2) blocks: 64 bits of explicit 4-bit alpha, then a DXT1 color block.

use byteorder::{ByteOrder, LittleEndian};

use crate::bc1::{decode_color_block, Bc1Encoder};

pub struct Bc2Encoder;

impl Bc2Encoder {
    /// Compress 16 RGBA pixels into a 16-byte block.
    pub fn compress_block(pixels: &[[u8; 4]; 16]) -> [u8; 16] {
        let mut alpha = 0u64;
        for (i, pixel) in pixels.iter().enumerate() {
            let a4 = (pixel[3] as u64 * 15 + 127) / 255;
            alpha |= a4 << (i * 4);
        }

        let mut output = [0u8; 16];
        LittleEndian::write_u64(&mut output[0..8], alpha);
        output[8..16].copy_from_slice(&Bc1Encoder::compress_block(pixels));
        output
    }
}

/// Decode a 16-byte DXT3 block into 16 RGBA pixels.
pub fn decode_dxt3_block(block: &[u8; 16]) -> [[u8; 4]; 16] {
    let alpha = LittleEndian::read_u64(&block[0..8]);
    let mut pixels = decode_color_block(&block[8..16]);
    for (i, pixel) in pixels.iter_mut().enumerate() {
        pixel[3] = ((alpha >> (i * 4)) & 0xF) as u8 * 17;
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_quantization() {
        let mut pixels = [[10u8, 20, 30, 0]; 16];
        pixels[1][3] = 255;
        pixels[2][3] = 128;
        pixels[3][3] = 8;

        let block = Bc2Encoder::compress_block(&pixels);
        assert_eq!(block[0], 0xF0);
        // 128 -> 8, 8 -> 0
        assert_eq!(block[1], 0x08);

        let decoded = decode_dxt3_block(&block);
        assert_eq!(decoded[0][3], 0);
        assert_eq!(decoded[1][3], 255);
        assert_eq!(decoded[2][3], 136);
        assert_eq!(decoded[3][3], 0);
    }

    #[test]
    fn test_color_half_matches_dxt1() {
        let pixels = [[255u8, 0, 0, 77]; 16];
        let block = Bc2Encoder::compress_block(&pixels);
        assert_eq!(&block[8..], &Bc1Encoder::compress_block(&pixels));
        assert!(decode_dxt3_block(&block).iter().all(|p| p[..3] == [255, 0, 0]));
    }
}
