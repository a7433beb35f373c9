//! RGB565 packing and palette math shared by the block codecs.

/// Pack an 8-bit RGB color into RGB565 (5 bits red, 6 green, 5 blue).
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r >> 3) as u16;
    let g6 = (g >> 2) as u16;
    let b5 = (b >> 3) as u16;
    (r5 << 11) | (g6 << 5) | b5
}

/// Expand RGB565 to 8 bits per channel, replicating the high bits into the
/// low ones so 0x1F maps to 255.
pub fn rgb565_to_rgb888(color: u16) -> [u8; 3] {
    let r5 = (color >> 11) & 0x1F;
    let g6 = (color >> 5) & 0x3F;
    let b5 = color & 0x1F;
    [
        ((r5 << 3) | (r5 >> 2)) as u8,
        ((g6 << 2) | (g6 >> 4)) as u8,
        ((b5 << 3) | (b5 >> 2)) as u8,
    ]
}

/// `a + (b - a) * num / den`, truncated.
#[inline]
pub(crate) fn lerp_u8(a: u8, b: u8, num: u32, den: u32) -> u8 {
    ((a as u32 * (den - num) + b as u32 * num) / den) as u8
}

/// The four-color palette of a color block in opaque mode.
pub(crate) fn opaque_palette(c0: u16, c1: u16) -> [[u8; 3]; 4] {
    let a = rgb565_to_rgb888(c0);
    let b = rgb565_to_rgb888(c1);
    let mix = |num| {
        [
            lerp_u8(a[0], b[0], num, 3),
            lerp_u8(a[1], b[1], num, 3),
            lerp_u8(a[2], b[2], num, 3),
        ]
    };
    [a, b, mix(1), mix(2)]
}

/// Squared distance weighted 3:6:1 towards green.
#[inline]
pub(crate) fn color_distance_squared(a: &[u8; 4], b: &[u8; 3]) -> u32 {
    let dr = (a[0] as i32 - b[0] as i32) * 3;
    let dg = (a[1] as i32 - b[1] as i32) * 6;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case([0, 0, 0], 0x0000)]
    #[case([255, 255, 255], 0xFFFF)]
    #[case([255, 0, 0], 0xF800)]
    #[case([0, 255, 0], 0x07E0)]
    #[case([0, 0, 255], 0x001F)]
    fn test_primaries(#[case] rgb: [u8; 3], #[case] packed: u16) {
        assert_eq!(rgb888_to_rgb565(rgb[0], rgb[1], rgb[2]), packed);
        assert_eq!(rgb565_to_rgb888(packed), rgb);
    }

    #[test]
    fn test_precision_loss_is_bounded() {
        let original = [123u8, 234, 56];
        let back = rgb565_to_rgb888(rgb888_to_rgb565(original[0], original[1], original[2]));
        assert!((original[0] as i16 - back[0] as i16).abs() <= 7);
        assert!((original[1] as i16 - back[1] as i16).abs() <= 3);
        assert!((original[2] as i16 - back[2] as i16).abs() <= 7);
    }

    #[test]
    fn test_opaque_palette_thirds() {
        let palette = opaque_palette(0xFFFF, 0x0000);
        assert_eq!(palette[0], [255, 255, 255]);
        assert_eq!(palette[1], [0, 0, 0]);
        assert_eq!(palette[2], [170, 170, 170]);
        assert_eq!(palette[3], [85, 85, 85]);
    }
}
