//! Surface formats and mip chain layout.

use std::fmt;

use texel_common::PixelLayout;
use texel_dxt::DxtFormat;

use crate::header::{pixel_flags, DdsHeader};
use crate::{MalformedReason, Result};

/// Whether a DDS file holds one 2D surface or six cube faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureKind {
    Plain,
    Cubemap,
}

impl TextureKind {
    pub fn of(header: &DdsHeader) -> Self {
        if header.is_cubemap() {
            TextureKind::Cubemap
        } else {
            TextureKind::Plain
        }
    }

    /// Number of faces stored for this kind.
    pub const fn face_count(self) -> usize {
        match self {
            TextureKind::Plain => 1,
            TextureKind::Cubemap => 6,
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureKind::Plain => f.write_str("plain"),
            TextureKind::Cubemap => f.write_str("cube map"),
        }
    }
}

/// How the pixels of one surface are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceFormat {
    /// 24-bit BGR on disk.
    Rgb,
    /// 32-bit BGRA on disk.
    Rgba,
    Dxt(DxtFormat),
}

impl SurfaceFormat {
    /// Format of a validated header. Uncompressed surfaces are RGBA when the
    /// pixel format declares alpha and RGB otherwise.
    pub fn from_header(header: &DdsHeader) -> Self {
        if let Some(format) = header.dxt_format() {
            return SurfaceFormat::Dxt(format);
        }
        if header.pixel_format.flags & pixel_flags::ALPHAPIXELS != 0 {
            SurfaceFormat::Rgba
        } else {
            SurfaceFormat::Rgb
        }
    }

    /// Uncompressed format holding `layout` once expanded to color.
    pub fn uncompressed(layout: PixelLayout) -> Self {
        if layout.has_alpha() {
            SurfaceFormat::Rgba
        } else {
            SurfaceFormat::Rgb
        }
    }

    #[inline]
    pub fn is_compressed(self) -> bool {
        matches!(self, SurfaceFormat::Dxt(_))
    }

    /// Pixel layout of the surface once decoded.
    pub fn layout(self) -> PixelLayout {
        match self {
            SurfaceFormat::Rgb | SurfaceFormat::Dxt(DxtFormat::Dxt1) => PixelLayout::Rgb,
            SurfaceFormat::Rgba | SurfaceFormat::Dxt(_) => PixelLayout::Rgba,
        }
    }

    /// Bytes of one `width x height` surface, or `None` if that does not
    /// fit in `usize`.
    pub fn surface_size(self, width: u32, height: u32) -> Option<usize> {
        let (units, unit_size) = match self {
            SurfaceFormat::Rgb => ((width as usize).checked_mul(height as usize)?, 3),
            SurfaceFormat::Rgba => ((width as usize).checked_mul(height as usize)?, 4),
            SurfaceFormat::Dxt(format) => return format.checked_compressed_size(width, height),
        };
        units.checked_mul(unit_size)
    }
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceFormat::Rgb => f.write_str("RGB"),
            SurfaceFormat::Rgba => f.write_str("RGBA"),
            SurfaceFormat::Dxt(format) => write!(f, "{format}"),
        }
    }
}

/// One level of a mip chain, located within a face's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MipLevel {
    /// 0 is the full-size surface.
    pub level: u32,
    pub width: u32,
    pub height: u32,
    /// Byte offset from the start of the face.
    pub offset: usize,
    pub size: usize,
}

/// Sizes and offsets of every level of one face.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MipChainLayout {
    pub format: SurfaceFormat,
    pub levels: Vec<MipLevel>,
    /// Bytes of one face's full chain.
    pub total_size: usize,
}

impl MipChainLayout {
    /// Layout of `level_count` levels starting at `width x height`.
    ///
    /// Level `n` is `max(1, width >> n) x max(1, height >> n)`. The count is
    /// capped at the full chain down to 1x1. Sizes that overflow `usize` are
    /// reported as [`MalformedReason::SurfaceTooLarge`].
    pub fn new(format: SurfaceFormat, width: u32, height: u32, level_count: u32) -> Result<Self> {
        let level_count = level_count.clamp(1, full_chain_len(width, height));
        let mut levels = Vec::with_capacity(level_count as usize);
        let mut offset: usize = 0;
        for level in 0..level_count {
            let (w, h) = level_dimensions(width, height, level);
            let size = format
                .surface_size(w, h)
                .ok_or(MalformedReason::SurfaceTooLarge)?;
            levels.push(MipLevel {
                level,
                width: w,
                height: h,
                offset,
                size,
            });
            offset = offset
                .checked_add(size)
                .ok_or(MalformedReason::SurfaceTooLarge)?;
        }

        Ok(Self {
            format,
            levels,
            total_size: offset,
        })
    }

    /// Layout described by a validated header.
    pub fn from_header(header: &DdsHeader) -> Result<Self> {
        let (width, height) = header.dimensions();
        Self::new(
            SurfaceFormat::from_header(header),
            width,
            height,
            header.mip_count(),
        )
    }

    /// The full-size level.
    pub fn base(&self) -> &MipLevel {
        &self.levels[0]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Levels from `width x height` down to 1x1, inclusive.
#[inline]
pub fn full_chain_len(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

/// Dimensions of mip level `level` of a `width x height` surface.
#[inline]
pub fn level_dimensions(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shift = |dim: u32| dim.checked_shr(level).unwrap_or(0).max(1);
    (shift(width), shift(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{caps, FourCC};

    #[test]
    fn test_uncompressed_chain() {
        let layout = MipChainLayout::new(SurfaceFormat::Rgba, 4, 2, 3).unwrap();
        let sizes: Vec<_> = layout.levels.iter().map(|l| (l.width, l.height, l.size)).collect();
        assert_eq!(sizes, vec![(4, 2, 32), (2, 1, 8), (1, 1, 4)]);
        assert_eq!(layout.levels[2].offset, 40);
        assert_eq!(layout.total_size, 44);
    }

    #[test]
    fn test_compressed_chain_rounds_up_blocks() {
        let layout = MipChainLayout::new(SurfaceFormat::Dxt(DxtFormat::Dxt1), 16, 16, 5).unwrap();
        let sizes: Vec<_> = layout.levels.iter().map(|l| l.size).collect();
        assert_eq!(sizes, vec![128, 32, 8, 8, 8]);
        assert_eq!(layout.total_size, 184);
    }

    #[test]
    fn test_from_header() {
        let mut header = DdsHeader::empty();
        header.width = 256;
        header.height = 64;
        header.mipmap_count = 9;
        header.caps = caps::MIPMAP;
        header.pixel_format.flags = pixel_flags::FOURCC;
        header.pixel_format.four_cc = FourCC::DXT5;

        let layout = MipChainLayout::from_header(&header).unwrap();
        assert_eq!(layout.format, SurfaceFormat::Dxt(DxtFormat::Dxt5));
        assert_eq!(layout.level_count(), 9);
        let last = layout.levels.last().unwrap();
        assert_eq!((last.width, last.height), (1, 1));
        assert_eq!(layout.base().size, 64 * 16 * 16);
    }

    #[test]
    fn test_single_level_without_mipmap_caps() {
        let mut header = DdsHeader::empty();
        header.width = 8;
        header.height = 8;
        header.mipmap_count = 4;
        header.pixel_format.flags = pixel_flags::RGB;

        let layout = MipChainLayout::from_header(&header).unwrap();
        assert_eq!(layout.format, SurfaceFormat::Rgb);
        assert_eq!(layout.level_count(), 1);
        assert_eq!(layout.total_size, 8 * 8 * 3);
    }

    #[test]
    fn test_level_count_capped_at_full_chain() {
        let layout = MipChainLayout::new(SurfaceFormat::Rgb, 4, 4, u32::MAX).unwrap();
        assert_eq!(layout.level_count(), 3);
        assert_eq!(layout.total_size, 48 + 12 + 3);

        let layout = MipChainLayout::new(SurfaceFormat::Rgb, 8, 2, 10).unwrap();
        assert_eq!(layout.level_count(), 4);
        assert_eq!(full_chain_len(1, 1), 1);
        assert_eq!(full_chain_len(0, 0), 1);
        assert_eq!(full_chain_len(u32::MAX, 1), 32);
    }

    #[test]
    fn test_oversized_surface_is_an_error() {
        assert_eq!(SurfaceFormat::Rgba.surface_size(u32::MAX, u32::MAX), None);
        assert!(SurfaceFormat::Dxt(DxtFormat::Dxt5)
            .surface_size(u32::MAX, u32::MAX)
            .is_none());
        assert!(matches!(
            MipChainLayout::new(SurfaceFormat::Rgb, u32::MAX, u32::MAX, 1),
            Err(crate::Error::Malformed(MalformedReason::SurfaceTooLarge))
        ));
    }

    #[test]
    fn test_level_dimensions_saturate() {
        assert_eq!(level_dimensions(8, 2, 2), (2, 1));
        assert_eq!(level_dimensions(8, 2, 40), (1, 1));
    }

    #[test]
    fn test_surface_format_layout() {
        assert_eq!(SurfaceFormat::Dxt(DxtFormat::Dxt1).layout(), PixelLayout::Rgb);
        assert_eq!(SurfaceFormat::Dxt(DxtFormat::Dxt3).layout(), PixelLayout::Rgba);
        assert_eq!(SurfaceFormat::uncompressed(PixelLayout::LuminanceAlpha), SurfaceFormat::Rgba);
        assert_eq!(SurfaceFormat::Dxt(DxtFormat::Dxt5).to_string(), "DXT5");
    }
}
