//! Reading validated DDS buffers face by face.

use std::borrow::Cow;

use texel_common::{CubeFace, RasterImage, TextureTarget};
use texel_dxt::decompress_image;
use tracing::{debug, warn};

use crate::header::DdsHeader;
use crate::layout::{MipChainLayout, SurfaceFormat, TextureKind};
use crate::validate::validate;
use crate::{Error, MalformedReason, Result, DDS_PREFIX_SIZE};

/// A validated DDS buffer.
///
/// # Example
///
/// ```no_run
/// use texel_dds::DdsReader;
///
/// let bytes = std::fs::read("texture.dds")?;
/// let reader = DdsReader::new(&bytes)?;
/// for face in reader.faces() {
///     let face = face?;
///     println!("{}: {} levels", face.target, face.levels.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DdsReader<'a> {
    header: DdsHeader,
    layout: MipChainLayout,
    kind: TextureKind,
    data: &'a [u8],
}

impl<'a> DdsReader<'a> {
    /// Validate the header and compute the per-face layout.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let header = validate(bytes)?;
        let layout = MipChainLayout::from_header(&header)?;
        let kind = TextureKind::of(&header);
        if layout.total_size.checked_mul(kind.face_count()).is_none() {
            return Err(MalformedReason::SurfaceTooLarge.into());
        }
        let (width, height) = header.dimensions();
        debug!(
            width,
            height,
            format = %layout.format,
            levels = layout.level_count(),
            %kind,
            "parsed DDS header"
        );

        Ok(Self {
            header,
            layout,
            kind,
            data: &bytes[DDS_PREFIX_SIZE..],
        })
    }

    #[inline]
    pub fn header(&self) -> &DdsHeader {
        &self.header
    }

    /// Per-face mip chain layout.
    #[inline]
    pub fn layout(&self) -> &MipChainLayout {
        &self.layout
    }

    #[inline]
    pub fn format(&self) -> SurfaceFormat {
        self.layout.format
    }

    #[inline]
    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    /// Fail with [`Error::KindMismatch`] unless the file is `expected`.
    pub fn expect_kind(&self, expected: TextureKind) -> Result<()> {
        if self.kind != expected {
            return Err(Error::KindMismatch {
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }

    /// Surface bytes following the header.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Iterate over the stored faces: one for plain textures, six in
    /// +X, -X, +Y, -Y, +Z, -Z order for cube maps.
    ///
    /// Uncompressed levels are converted from BGR(A) to RGB(A). Iteration
    /// ends after the first [`Error::Truncated`].
    pub fn faces(&self) -> DdsFaces<'_> {
        DdsFaces {
            layout: &self.layout,
            kind: self.kind,
            remaining: self.data,
            index: 0,
            done: false,
        }
    }
}

/// One level of a face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsLevel<'a> {
    pub level: u32,
    pub width: u32,
    pub height: u32,
    /// Compressed blocks as stored, or RGB(A) pixels.
    pub data: Cow<'a, [u8]>,
}

/// A face with its complete mip chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsSurface<'a> {
    pub target: TextureTarget,
    pub format: SurfaceFormat,
    pub levels: Vec<DdsLevel<'a>>,
}

impl DdsSurface<'_> {
    /// Decode the full-size level into pixels, decompressing DXT data.
    pub fn decode_base(&self) -> Result<RasterImage> {
        let base = &self.levels[0];
        match self.format {
            SurfaceFormat::Dxt(format) => {
                Ok(decompress_image(&base.data, base.width, base.height, format)?)
            }
            uncompressed => Ok(RasterImage::new(
                base.width,
                base.height,
                uncompressed.layout(),
                base.data.to_vec(),
            )?),
        }
    }
}

/// Iterator over the faces of a [`DdsReader`].
#[derive(Debug, Clone)]
pub struct DdsFaces<'a> {
    layout: &'a MipChainLayout,
    kind: TextureKind,
    remaining: &'a [u8],
    index: usize,
    done: bool,
}

impl<'a> DdsFaces<'a> {
    fn target(&self) -> TextureTarget {
        match self.kind {
            TextureKind::Plain => TextureTarget::Texture2d,
            TextureKind::Cubemap => TextureTarget::CubeFace(CubeFace::ALL[self.index]),
        }
    }

    fn slice_levels(&self, face: &'a [u8]) -> Vec<DdsLevel<'a>> {
        let bytes_per_pixel = match self.layout.format {
            SurfaceFormat::Rgb => Some(3),
            SurfaceFormat::Rgba => Some(4),
            SurfaceFormat::Dxt(_) => None,
        };

        self.layout
            .levels
            .iter()
            .map(|level| {
                let stored = &face[level.offset..level.offset + level.size];
                let data = match bytes_per_pixel {
                    Some(bpp) => {
                        let mut pixels = stored.to_vec();
                        for pixel in pixels.chunks_exact_mut(bpp) {
                            pixel.swap(0, 2);
                        }
                        Cow::Owned(pixels)
                    }
                    None => Cow::Borrowed(stored),
                };
                DdsLevel {
                    level: level.level,
                    width: level.width,
                    height: level.height,
                    data,
                }
            })
            .collect()
    }
}

impl<'a> Iterator for DdsFaces<'a> {
    type Item = Result<DdsSurface<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.kind.face_count() {
            return None;
        }

        let target = self.target();
        let needed = self.layout.total_size;
        if self.remaining.len() < needed {
            warn!(%target, needed, available = self.remaining.len(), "DDS data truncated");
            self.done = true;
            return Some(Err(Error::Truncated {
                face: target,
                needed,
                available: self.remaining.len(),
            }));
        }

        let (face, rest) = self.remaining.split_at(needed);
        self.remaining = rest;
        self.index += 1;

        Some(Ok(DdsSurface {
            target,
            format: self.layout.format,
            levels: self.slice_levels(face),
        }))
    }
}

impl std::iter::FusedIterator for DdsFaces<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{caps, flags, pixel_flags, FourCC};
    use crate::DDS_MAGIC;
    use zerocopy::IntoBytes;

    fn header(width: u32, height: u32) -> DdsHeader {
        let mut header = DdsHeader::empty();
        header.flags = flags::REQUIRED;
        header.width = width;
        header.height = height;
        header.caps = caps::TEXTURE;
        header
    }

    fn file(header: &DdsHeader, payload: &[u8]) -> Vec<u8> {
        let mut bytes = DDS_MAGIC.to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_plain_uncompressed_swaps_bgr() {
        let mut h = header(2, 1);
        h.pixel_format.flags = pixel_flags::RGB;
        let bytes = file(&h, &[1, 2, 3, 4, 5, 6]);

        let reader = DdsReader::new(&bytes).unwrap();
        assert_eq!(reader.kind(), TextureKind::Plain);
        let faces: Vec<_> = reader.faces().collect::<Result<_>>().unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].target, TextureTarget::Texture2d);
        assert_eq!(&*faces[0].levels[0].data, &[3, 2, 1, 6, 5, 4]);

        let image = faces[0].decode_base().unwrap();
        assert_eq!(image.pixel(0, 0), &[3, 2, 1]);
    }

    #[test]
    fn test_huge_dimensions_are_malformed() {
        let mut h = header(u32::MAX, u32::MAX);
        h.pixel_format.flags = pixel_flags::RGB | pixel_flags::ALPHAPIXELS;
        let bytes = file(&h, &[]);

        assert!(matches!(
            DdsReader::new(&bytes),
            Err(Error::Malformed(MalformedReason::SurfaceTooLarge))
        ));
    }

    #[test]
    fn test_huge_compressed_cubemap_is_malformed() {
        let mut h = header(u32::MAX, u32::MAX);
        h.caps2 = caps::CUBEMAP | caps::CUBEMAP_ALL_FACES;
        h.pixel_format.flags = pixel_flags::FOURCC;
        h.pixel_format.four_cc = FourCC::DXT5;
        let bytes = file(&h, &[0; 16]);

        assert!(matches!(
            DdsReader::new(&bytes),
            Err(Error::Malformed(MalformedReason::SurfaceTooLarge))
        ));
    }

    #[test]
    fn test_large_dimensions_without_data_are_truncated() {
        let mut h = header(1 << 20, 1 << 20);
        h.pixel_format.flags = pixel_flags::FOURCC;
        h.pixel_format.four_cc = FourCC::DXT1;
        let bytes = file(&h, &[0; 8]);

        let reader = DdsReader::new(&bytes).unwrap();
        let results: Vec<_> = reader.faces().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(Error::Truncated { needed, available: 8, .. }) if needed >= 1 << 39
        ));
    }

    #[test]
    fn test_mip_count_beyond_full_chain_is_capped() {
        let mut h = header(4, 4);
        h.flags = flags::REQUIRED | flags::MIPMAPCOUNT;
        h.mipmap_count = u32::MAX;
        h.caps = caps::TEXTURE | caps::MIPMAP | caps::COMPLEX;
        h.pixel_format.flags = pixel_flags::RGB;
        let bytes = file(&h, &[0; 48 + 12 + 3]);

        let reader = DdsReader::new(&bytes).unwrap();
        assert_eq!(reader.layout().level_count(), 3);
        let face = reader.faces().next().unwrap().unwrap();
        let dims: Vec<_> = face.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(dims, vec![(4, 4), (2, 2), (1, 1)]);
    }

    #[test]
    fn test_compressed_mip_chain_is_borrowed() {
        let mut h = header(8, 8);
        h.flags = flags::REQUIRED | flags::MIPMAPCOUNT;
        h.mipmap_count = 4;
        h.caps = caps::TEXTURE | caps::MIPMAP | caps::COMPLEX;
        h.pixel_format.flags = pixel_flags::FOURCC;
        h.pixel_format.four_cc = FourCC::DXT1;
        let payload: Vec<u8> = (0..56).collect();
        let bytes = file(&h, &payload);

        let reader = DdsReader::new(&bytes).unwrap();
        let face = reader.faces().next().unwrap().unwrap();
        let sizes: Vec<_> = face.levels.iter().map(|l| l.data.len()).collect();
        assert_eq!(sizes, vec![32, 8, 8, 8]);
        assert!(matches!(face.levels[1].data, Cow::Borrowed(_)));
        assert_eq!(face.levels[1].data[0], 32);
    }

    #[test]
    fn test_cubemap_faces_in_order() {
        let mut h = header(4, 4);
        h.caps = caps::TEXTURE | caps::COMPLEX;
        h.caps2 = caps::CUBEMAP | caps::CUBEMAP_ALL_FACES;
        h.pixel_format.flags = pixel_flags::FOURCC;
        h.pixel_format.four_cc = FourCC::DXT5;
        let payload: Vec<u8> = (0..6u8).flat_map(|face| [face; 16]).collect();
        let bytes = file(&h, &payload);

        let reader = DdsReader::new(&bytes).unwrap();
        assert!(reader.expect_kind(TextureKind::Cubemap).is_ok());
        assert!(matches!(
            reader.expect_kind(TextureKind::Plain),
            Err(Error::KindMismatch { .. })
        ));

        let faces: Vec<_> = reader.faces().collect::<Result<_>>().unwrap();
        assert_eq!(faces.len(), 6);
        for (i, face) in faces.iter().enumerate() {
            assert_eq!(face.target, TextureTarget::CubeFace(CubeFace::ALL[i]));
            assert_eq!(&*face.levels[0].data, &[i as u8; 16]);
        }
    }

    #[test]
    fn test_truncated_cubemap_stops() {
        let mut h = header(4, 4);
        h.caps2 = caps::CUBEMAP | caps::CUBEMAP_ALL_FACES;
        h.pixel_format.flags = pixel_flags::FOURCC;
        h.pixel_format.four_cc = FourCC::DXT1;
        let bytes = file(&h, &[0; 8 * 2 + 3]);

        let reader = DdsReader::new(&bytes).unwrap();
        let results: Vec<_> = reader.faces().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok() && results[1].is_ok());
        assert!(matches!(
            results[2],
            Err(Error::Truncated {
                face: TextureTarget::CubeFace(CubeFace::PositiveY),
                needed: 8,
                available: 3,
            })
        ));
    }
}
