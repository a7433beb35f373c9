//! Serializing images and mip chains to DDS.

use texel_common::{PixelLayout, RasterImage};
use texel_dxt::{compress_image, DxtFormat};
use tracing::debug;

use crate::header::{caps, flags, pixel_flags, DdsHeader, FourCC};
use crate::layout::{level_dimensions, MipChainLayout, SurfaceFormat, TextureKind};
use crate::{Error, Result, DDS_MAGIC, DDS_PREFIX_SIZE};

/// Builds DDS files from prepared images.
///
/// Each face is passed as its full mip chain, level 0 first. Level `n` must
/// be `max(1, width >> n) x max(1, height >> n)`.
///
/// # Example
///
/// ```
/// use texel_common::{PixelLayout, RasterImage};
/// use texel_dds::{DdsReader, DdsWriter, SurfaceFormat};
/// use texel_dxt::DxtFormat;
///
/// let image = RasterImage::blank(8, 8, PixelLayout::Rgba);
/// let bytes = DdsWriter::new().compressed(true).write_texture(&[image])?;
///
/// let reader = DdsReader::new(&bytes)?;
/// assert_eq!(reader.format(), SurfaceFormat::Dxt(DxtFormat::Dxt5));
/// # Ok::<(), texel_dds::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DdsWriter {
    compress: bool,
}

impl DdsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store DXT1 (odd channel counts) or DXT5 (even) blocks instead of
    /// raw pixels.
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Write a 2D texture.
    pub fn write_texture(&self, levels: &[RasterImage]) -> Result<Vec<u8>> {
        self.write(&[levels], TextureKind::Plain)
    }

    /// Write a cube map. Faces are in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn write_cubemap(&self, faces: &[Vec<RasterImage>; 6]) -> Result<Vec<u8>> {
        let faces: Vec<&[RasterImage]> = faces.iter().map(Vec::as_slice).collect();
        self.write(&faces, TextureKind::Cubemap)
    }

    fn write(&self, faces: &[&[RasterImage]], kind: TextureKind) -> Result<Vec<u8>> {
        let base = faces
            .first()
            .and_then(|levels| levels.first())
            .filter(|image| !image.is_empty())
            .ok_or(Error::EmptyImage)?;
        let (width, height) = base.dimensions();
        let layout = base.layout();
        let level_count = faces[0].len();

        for levels in faces {
            check_chain(levels, width, height, layout, level_count)?;
        }
        if kind == TextureKind::Cubemap && width != height {
            return Err(Error::FaceMismatch);
        }

        let format = if self.compress {
            SurfaceFormat::Dxt(DxtFormat::for_channels(layout.channels()))
        } else {
            SurfaceFormat::uncompressed(layout)
        };
        let chain = MipChainLayout::new(format, width, height, level_count as u32)?;
        let header = build_header(format, width, height, level_count as u32, kind);
        debug!(width, height, %format, levels = level_count, %kind, "writing DDS");

        let mut output = Vec::with_capacity(DDS_PREFIX_SIZE + chain.total_size * faces.len());
        output.extend_from_slice(DDS_MAGIC);
        output.extend_from_slice(header.to_bytes());
        for levels in faces {
            for image in *levels {
                encode_level(image, format, &mut output)?;
            }
        }
        Ok(output)
    }
}

fn check_chain(
    levels: &[RasterImage],
    width: u32,
    height: u32,
    layout: PixelLayout,
    level_count: usize,
) -> Result<()> {
    if levels.len() != level_count {
        return Err(Error::FaceMismatch);
    }
    for (level, image) in levels.iter().enumerate() {
        if image.layout() != layout {
            return Err(Error::FaceMismatch);
        }
        let (expected_width, expected_height) = level_dimensions(width, height, level as u32);
        if image.dimensions() != (expected_width, expected_height) {
            return Err(Error::LevelMismatch {
                level,
                width: expected_width,
                height: expected_height,
                actual_width: image.width(),
                actual_height: image.height(),
            });
        }
    }
    Ok(())
}

/// Header for a surface of `format`, with mipmap and cube map bits as needed.
pub fn build_header(
    format: SurfaceFormat,
    width: u32,
    height: u32,
    level_count: u32,
    kind: TextureKind,
) -> DdsHeader {
    let mut header = DdsHeader::empty();
    let mut header_flags = flags::REQUIRED;
    let mut caps1 = caps::TEXTURE;

    header.width = width;
    header.height = height;

    match format {
        SurfaceFormat::Dxt(dxt) => {
            header_flags |= flags::LINEARSIZE;
            header.pitch_or_linear_size = format
                .surface_size(width, height)
                .and_then(|size| u32::try_from(size).ok())
                .unwrap_or(u32::MAX);
            header.pixel_format.flags = pixel_flags::FOURCC;
            header.pixel_format.four_cc = FourCC::from(dxt);
        }
        SurfaceFormat::Rgb | SurfaceFormat::Rgba => {
            let alpha = format == SurfaceFormat::Rgba;
            let bytes_per_pixel = if alpha { 4 } else { 3 };
            header_flags |= flags::PITCH;
            header.pitch_or_linear_size = width * bytes_per_pixel;
            header.pixel_format.flags = if alpha {
                pixel_flags::RGB | pixel_flags::ALPHAPIXELS
            } else {
                pixel_flags::RGB
            };
            header.pixel_format.rgb_bit_count = bytes_per_pixel * 8;
            header.pixel_format.r_bit_mask = 0x00FF_0000;
            header.pixel_format.g_bit_mask = 0x0000_FF00;
            header.pixel_format.b_bit_mask = 0x0000_00FF;
            header.pixel_format.a_bit_mask = if alpha { 0xFF00_0000 } else { 0 };
        }
    }

    if level_count > 1 {
        header_flags |= flags::MIPMAPCOUNT;
        header.mipmap_count = level_count;
        caps1 |= caps::COMPLEX | caps::MIPMAP;
    }

    if kind == TextureKind::Cubemap {
        caps1 |= caps::COMPLEX;
        header.caps2 = caps::CUBEMAP | caps::CUBEMAP_ALL_FACES;
    }

    header.flags = header_flags;
    header.caps = caps1;
    header
}

fn encode_level(image: &RasterImage, format: SurfaceFormat, output: &mut Vec<u8>) -> Result<()> {
    match format {
        SurfaceFormat::Dxt(dxt) => output.extend_from_slice(&compress_image(image, dxt)?),
        uncompressed => {
            let mut pixels = image.with_layout(uncompressed.layout());
            pixels.swap_red_blue();
            output.extend_from_slice(pixels.data());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DdsReader;
    use rstest::rstest;
    use texel_common::{CubeFace, TextureTarget};

    fn chain(width: u32, height: u32, layout: PixelLayout) -> Vec<RasterImage> {
        let mut levels = Vec::new();
        let mut level = 0;
        loop {
            let (w, h) = level_dimensions(width, height, level);
            levels.push(RasterImage::filled(w, h, layout, &vec![200; layout.channels()]).unwrap());
            if (w, h) == (1, 1) {
                return levels;
            }
            level += 1;
        }
    }

    #[test]
    fn test_uncompressed_round_trip() {
        let image =
            RasterImage::new(2, 1, PixelLayout::Rgb, vec![10, 20, 30, 40, 50, 60]).unwrap();
        let bytes = DdsWriter::new().write_texture(&[image.clone()]).unwrap();

        // Stored as BGR.
        assert_eq!(&bytes[DDS_PREFIX_SIZE..], &[30, 20, 10, 60, 50, 40]);

        let reader = DdsReader::new(&bytes).unwrap();
        assert_eq!({ reader.header().pitch_or_linear_size }, 6);
        let face = reader.faces().next().unwrap().unwrap();
        assert_eq!(face.decode_base().unwrap(), image);
    }

    #[rstest]
    #[case(PixelLayout::Luminance, SurfaceFormat::Rgb)]
    #[case(PixelLayout::LuminanceAlpha, SurfaceFormat::Rgba)]
    fn test_grey_expands(#[case] layout: PixelLayout, #[case] format: SurfaceFormat) {
        let image = RasterImage::blank(4, 4, layout);
        let bytes = DdsWriter::new().write_texture(&[image]).unwrap();
        let reader = DdsReader::new(&bytes).unwrap();
        assert_eq!(reader.format(), format);
        assert_eq!(reader.layout().total_size, 16 * format.layout().channels());
    }

    #[rstest]
    #[case(PixelLayout::Rgb, DxtFormat::Dxt1)]
    #[case(PixelLayout::Rgba, DxtFormat::Dxt5)]
    fn test_compressed_mip_chain(#[case] layout: PixelLayout, #[case] dxt: DxtFormat) {
        let levels = chain(16, 16, layout);
        assert_eq!(levels.len(), 5);

        let bytes = DdsWriter::new().compressed(true).write_texture(&levels).unwrap();
        let reader = DdsReader::new(&bytes).unwrap();
        let header = reader.header();

        assert_eq!(reader.format(), SurfaceFormat::Dxt(dxt));
        assert_eq!(header.mip_count(), 5);
        assert!(header.has_flags(flags::MIPMAPCOUNT | flags::LINEARSIZE));
        assert_eq!({ header.pitch_or_linear_size } as usize, dxt.compressed_size(16, 16));
        assert_eq!(bytes.len(), DDS_PREFIX_SIZE + reader.layout().total_size);
    }

    #[test]
    fn test_cubemap_round_trip() {
        let faces: [Vec<RasterImage>; 6] = std::array::from_fn(|i| {
            vec![RasterImage::filled(4, 4, PixelLayout::Rgba, &[i as u8 * 40, 0, 0, 255]).unwrap()]
        });
        let bytes = DdsWriter::new().write_cubemap(&faces).unwrap();

        let reader = DdsReader::new(&bytes).unwrap();
        assert_eq!(reader.kind(), TextureKind::Cubemap);
        assert_eq!({ reader.header().caps2 }, caps::CUBEMAP | caps::CUBEMAP_ALL_FACES);

        let decoded: Vec<_> = reader.faces().collect::<Result<_>>().unwrap();
        assert_eq!(decoded.len(), 6);
        for (i, face) in decoded.iter().enumerate() {
            assert_eq!(face.target, TextureTarget::CubeFace(CubeFace::ALL[i]));
            assert_eq!(face.decode_base().unwrap(), faces[i][0]);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            DdsWriter::new().write_texture(&[]),
            Err(Error::EmptyImage)
        ));

        let levels = vec![
            RasterImage::blank(8, 8, PixelLayout::Rgb),
            RasterImage::blank(3, 4, PixelLayout::Rgb),
        ];
        assert!(matches!(
            DdsWriter::new().write_texture(&levels),
            Err(Error::LevelMismatch { level: 1, .. })
        ));

        let faces: [Vec<RasterImage>; 6] =
            std::array::from_fn(|_| vec![RasterImage::blank(8, 4, PixelLayout::Rgb)]);
        assert!(matches!(
            DdsWriter::new().write_cubemap(&faces),
            Err(Error::FaceMismatch)
        ));
    }
}
