//! Per-pixel color and channel transforms.
//!
//! Every transform works in place on a [`RasterImage`] and returns `false`
//! without touching the pixels when the image is empty or its layout is not
//! one the transform applies to.

use texel_common::{PixelLayout, RasterImage};
use tracing::trace;

/// Lower bound of the NTSC-safe range.
const NTSC_LOW: u32 = 16;
/// Upper bound of the NTSC-safe range.
const NTSC_HIGH: u32 = 235;

/// Lookup table mapping `v` to `round(16 + (235 - 16) * v / 255)`.
pub fn ntsc_safe_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (v, entry) in lut.iter_mut().enumerate() {
        let scaled = ((NTSC_HIGH - NTSC_LOW) * v as u32 + 127) / 255;
        *entry = (NTSC_LOW + scaled) as u8;
    }
    lut
}

/// Scale every color channel into `[16, 235]`. Alpha is left alone.
///
/// Not a good idea for normal maps or height maps.
pub fn scale_rgb_to_ntsc_safe(image: &mut RasterImage) -> bool {
    if image.is_empty() {
        trace!("skipping NTSC-safe scaling of an empty image");
        return false;
    }

    let lut = ntsc_safe_lut();
    let channels = image.channels();
    let color = image.layout().color_channels();
    for pixel in image.data_mut().chunks_exact_mut(channels) {
        for value in &mut pixel[..color] {
            *value = lut[*value as usize];
        }
    }
    true
}

#[inline]
fn clamp_byte(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Convert RGB to YCoCg.
///
/// Three channels are reordered to `(Co, Y, Cg)`; four channels become
/// `(Co, Cg, A, Y)`, which leaves Y in the slot DXT5 encodes best.
pub fn convert_rgb_to_ycocg(image: &mut RasterImage) -> bool {
    if image.is_empty() || image.channels() < 3 {
        trace!(layout = ?image.layout(), "skipping YCoCg conversion");
        return false;
    }

    let layout = image.layout();
    let channels = image.channels();
    for pixel in image.data_mut().chunks_exact_mut(channels) {
        let r = pixel[0] as i32;
        let g = (pixel[1] as i32 + 1) >> 1;
        let b = pixel[2] as i32;
        let t = (2 + r + b) >> 2;

        let co = clamp_byte(128 + ((r - b + 1) >> 1));
        let y = clamp_byte(g + t);
        let cg = clamp_byte(128 + g - t);

        match layout {
            PixelLayout::Rgb => {
                pixel[0] = co;
                pixel[1] = y;
                pixel[2] = cg;
            }
            _ => {
                let a = pixel[3];
                pixel[0] = co;
                pixel[1] = cg;
                pixel[2] = a;
                pixel[3] = y;
            }
        }
    }
    true
}

/// Inverse of [`convert_rgb_to_ycocg`].
pub fn convert_ycocg_to_rgb(image: &mut RasterImage) -> bool {
    if image.is_empty() || image.channels() < 3 {
        trace!(layout = ?image.layout(), "skipping YCoCg conversion");
        return false;
    }

    let layout = image.layout();
    let channels = image.channels();
    for pixel in image.data_mut().chunks_exact_mut(channels) {
        let (co, y, cg, a) = match layout {
            PixelLayout::Rgb => (pixel[0], pixel[1], pixel[2], None),
            _ => (pixel[0], pixel[3], pixel[1], Some(pixel[2])),
        };
        let co = co as i32 - 128;
        let cg = cg as i32 - 128;
        let y = y as i32;

        pixel[0] = clamp_byte(y + co - cg);
        pixel[1] = clamp_byte(y + cg);
        pixel[2] = clamp_byte(y - co - cg);
        if let Some(a) = a {
            pixel[3] = a;
        }
    }
    true
}

/// Convert straight alpha to premultiplied alpha.
///
/// Only luminance-alpha and RGBA images carry alpha; anything else is a no-op.
pub fn multiply_alpha(image: &mut RasterImage) -> bool {
    if image.is_empty() || !image.layout().has_alpha() {
        trace!(layout = ?image.layout(), "skipping alpha premultiplication");
        return false;
    }

    let channels = image.channels();
    for pixel in image.data_mut().chunks_exact_mut(channels) {
        let alpha = pixel[channels - 1] as u32;
        for value in &mut pixel[..channels - 1] {
            *value = ((*value as u32 * alpha + 127) / 255) as u8;
        }
    }
    true
}

/// Fake-HDR representations an RGBE image can be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HdrEncoding {
    /// `RGB * 2^(A - 128)`, left as decoded.
    #[default]
    Rgbe,
    /// `RGB / A`.
    RgbDivA,
    /// `RGB / (A * A)`.
    RgbDivA2,
}

impl HdrEncoding {
    /// Re-encode an RGBE image in place.
    pub fn apply(self, image: &mut RasterImage, rescale_to_max: bool) -> bool {
        match self {
            HdrEncoding::Rgbe => image.layout() == PixelLayout::Rgba && !image.is_empty(),
            HdrEncoding::RgbDivA => rgbe_to_rgb_div_a(image, rescale_to_max),
            HdrEncoding::RgbDivA2 => rgbe_to_rgb_div_a2(image, rescale_to_max),
        }
    }
}

/// Multiplier that turns an RGBE mantissa byte into its linear value.
#[inline]
fn rgbe_scale(exponent: u8) -> f32 {
    (1.0 / 255.0) * 2f32.powi(exponent as i32 - 128)
}

/// Brightest decoded channel value in an RGBE image.
fn find_max_rgbe(data: &[u8]) -> f32 {
    data.chunks_exact(4)
        .flat_map(|pixel| {
            let scale = rgbe_scale(pixel[3]);
            pixel[..3].iter().map(move |&c| c as f32 * scale)
        })
        .fold(0.0, f32::max)
}

/// Global scale so the brightest channel decodes to `target`.
fn rescale_factor(data: &[u8], rescale_to_max: bool, target: f32) -> f32 {
    if !rescale_to_max {
        return 1.0;
    }
    let max = find_max_rgbe(data);
    if max > 0.0 {
        target / max
    } else {
        1.0
    }
}

/// Convert RGBE pixels to `RGB / A`, where A holds a per-pixel scale.
pub fn rgbe_to_rgb_div_a(image: &mut RasterImage, rescale_to_max: bool) -> bool {
    if image.is_empty() || image.layout() != PixelLayout::Rgba {
        trace!(layout = ?image.layout(), "skipping RGBE to RGB/A conversion");
        return false;
    }

    let scale = rescale_factor(image.data(), rescale_to_max, 255.0);
    for pixel in image.data_mut().chunks_exact_mut(4) {
        let e = scale * rgbe_scale(pixel[3]);
        let rgb = [pixel[0] as f32 * e, pixel[1] as f32 * e, pixel[2] as f32 * e];
        let m = rgb[0].max(rgb[1]).max(rgb[2]);

        let alpha = if m != 0.0 { (255.0 / m) as u32 } else { 1 };
        let alpha = alpha.clamp(1, 255);
        pixel[3] = alpha as u8;
        for (value, channel) in pixel[..3].iter_mut().zip(rgb) {
            *value = ((alpha as f32 * channel + 0.5) as u32).min(255) as u8;
        }
    }
    true
}

/// Convert RGBE pixels to `RGB / (A * A)`.
pub fn rgbe_to_rgb_div_a2(image: &mut RasterImage, rescale_to_max: bool) -> bool {
    if image.is_empty() || image.layout() != PixelLayout::Rgba {
        trace!(layout = ?image.layout(), "skipping RGBE to RGB/A^2 conversion");
        return false;
    }

    let scale = rescale_factor(image.data(), rescale_to_max, 255.0 * 255.0);
    for pixel in image.data_mut().chunks_exact_mut(4) {
        let e = scale * rgbe_scale(pixel[3]);
        let rgb = [pixel[0] as f32 * e, pixel[1] as f32 * e, pixel[2] as f32 * e];
        let m = rgb[0].max(rgb[1]).max(rgb[2]);

        let alpha = if m != 0.0 {
            (255.0 * 255.0 / m).sqrt() as u32
        } else {
            1
        };
        let alpha = alpha.clamp(1, 255);
        pixel[3] = alpha as u8;
        let alpha_sq = (alpha * alpha) as f32;
        for (value, channel) in pixel[..3].iter_mut().zip(rgb) {
            *value = ((alpha_sq * channel / 255.0 + 0.5) as u32).min(255) as u8;
        }
    }
    true
}
