//! Turning encoded image files into pixels.

use image::{DynamicImage, ImageFormat};
use texel_common::{PixelLayout, RasterImage};
use thiserror::Error;
use tracing::debug;

/// Errors reported by a [`PixelDecoder`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Common(#[from] texel_common::Error),

    /// `decode_rgbe` was given something other than a Radiance HDR file.
    #[error("not a Radiance HDR image")]
    NotHdr,
}

/// Decodes image files into 8-bit pixels.
pub trait PixelDecoder {
    /// Decode `bytes`, converting to `force` when given and keeping the
    /// file's own channel count otherwise.
    fn decode(&self, bytes: &[u8], force: Option<PixelLayout>) -> Result<RasterImage, DecodeError>;

    /// Decode a Radiance HDR file to RGBE: 8-bit mantissas with a shared
    /// exponent in the alpha channel.
    fn decode_rgbe(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError>;
}

/// [`PixelDecoder`] backed by the `image` crate: PNG, JPEG, BMP, TGA and HDR.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl ImageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl PixelDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8], force: Option<PixelLayout>) -> Result<RasterImage, DecodeError> {
        let decoded = image::load_from_memory(bytes)?;
        let natural = PixelLayout::from_channels(decoded.color().channel_count() as usize)?;
        let layout = force.unwrap_or(natural);
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            channels = natural.channels(),
            forced = force.is_some(),
            "decoded image"
        );
        Ok(to_raster(&decoded, layout)?)
    }

    fn decode_rgbe(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError> {
        if image::guess_format(bytes).ok() != Some(ImageFormat::Hdr) {
            return Err(DecodeError::NotHdr);
        }
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Hdr)?.to_rgb32f();
        let (width, height) = decoded.dimensions();
        let data = decoded
            .pixels()
            .flat_map(|pixel| float_to_rgbe(pixel.0))
            .collect();
        Ok(RasterImage::new(width, height, PixelLayout::Rgba, data)?)
    }
}

fn to_raster(image: &DynamicImage, layout: PixelLayout) -> texel_common::Result<RasterImage> {
    let (width, height) = (image.width(), image.height());
    let data = match layout {
        PixelLayout::Luminance => image.to_luma8().into_raw(),
        PixelLayout::LuminanceAlpha => image.to_luma_alpha8().into_raw(),
        PixelLayout::Rgb => image.to_rgb8().into_raw(),
        PixelLayout::Rgba => image.to_rgba8().into_raw(),
    };
    RasterImage::new(width, height, layout, data)
}

/// Pack a linear color into RGBE with the exponent biased by 128.
pub(crate) fn float_to_rgbe(rgb: [f32; 3]) -> [u8; 4] {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    if !max.is_finite() || max <= 1e-32 {
        return [0; 4];
    }

    // max = mantissa * 2^exponent with mantissa in [0.5, 1).
    let mut exponent = max.log2().floor() as i32 + 1;
    let mut mantissa = max / 2f32.powi(exponent);
    if mantissa >= 1.0 {
        mantissa /= 2.0;
        exponent += 1;
    } else if mantissa < 0.5 {
        mantissa *= 2.0;
        exponent -= 1;
    }
    debug_assert!((0.5..1.0).contains(&mantissa));

    // Inverse of the `mantissa / 255 * 2^(e - 128)` decoding in texel-image.
    let scale = 255.0 / 2f32.powi(exponent);
    let channel = |c: f32| (c.max(0.0) * scale + 0.5).min(255.0) as u8;
    [
        channel(rgb[0]),
        channel(rgb[1]),
        channel(rgb[2]),
        (exponent + 128).clamp(0, 255) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use rstest::rstest;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([x as u8 * 10, y as u8 * 10, 100, 200])
        });
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decode_keeps_channels() {
        let image = ImageDecoder.decode(&png(3, 2), None).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.layout(), PixelLayout::Rgba);
        assert_eq!(image.pixel(2, 1), &[20, 10, 100, 200]);
    }

    #[rstest]
    #[case(PixelLayout::Luminance)]
    #[case(PixelLayout::LuminanceAlpha)]
    #[case(PixelLayout::Rgb)]
    #[case(PixelLayout::Rgba)]
    fn test_decode_forced_layout(#[case] layout: PixelLayout) {
        let image = ImageDecoder.decode(&png(4, 4), Some(layout)).unwrap();
        assert_eq!(image.layout(), layout);
        assert_eq!(image.data().len(), 16 * layout.channels());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            ImageDecoder.decode(b"not an image", None),
            Err(DecodeError::Image(_))
        ));
    }

    #[test]
    fn test_rgbe_requires_hdr() {
        assert!(matches!(
            ImageDecoder.decode_rgbe(&png(2, 2)),
            Err(DecodeError::NotHdr)
        ));
    }

    #[test]
    fn test_float_to_rgbe() {
        assert_eq!(float_to_rgbe([0.0, 0.0, 0.0]), [0, 0, 0, 0]);
        // 1.0 = 0.5 * 2^1
        assert_eq!(float_to_rgbe([1.0, 0.5, 0.0]), [128, 64, 0, 129]);
        assert_eq!(float_to_rgbe([4.0, 4.0, 4.0]), [128, 128, 128, 131]);
    }

    #[rstest]
    #[case([1.0, 0.5, 0.25])]
    #[case([3.7, 0.2, 1.9])]
    #[case([0.01, 0.004, 0.0])]
    #[case([1000.0, 640.0, 12.5])]
    fn test_rgbe_decodes_back(#[case] rgb: [f32; 3]) {
        let rgbe = float_to_rgbe(rgb);
        let scale = 2f32.powi(rgbe[3] as i32 - 128) / 255.0;
        let max = rgb[0].max(rgb[1]).max(rgb[2]);
        for (stored, want) in rgbe[..3].iter().zip(rgb) {
            let got = *stored as f32 * scale;
            assert!((got - want).abs() <= max / 255.0, "{got} vs {want}");
        }
    }
}
