//! On-disk layout of the DDS header and its flag bits.

use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use texel_dxt::DxtFormat;

/// Header flag bits (`DDSD_*`).
pub mod flags {
    pub const CAPS: u32 = 0x0000_0001;
    pub const HEIGHT: u32 = 0x0000_0002;
    pub const WIDTH: u32 = 0x0000_0004;
    pub const PITCH: u32 = 0x0000_0008;
    pub const PIXELFORMAT: u32 = 0x0000_1000;
    pub const MIPMAPCOUNT: u32 = 0x0002_0000;
    pub const LINEARSIZE: u32 = 0x0008_0000;
    pub const DEPTH: u32 = 0x0080_0000;

    /// Flags every texture header must carry.
    pub const REQUIRED: u32 = CAPS | HEIGHT | WIDTH | PIXELFORMAT;
}

/// Pixel format flag bits (`DDPF_*`).
pub mod pixel_flags {
    pub const ALPHAPIXELS: u32 = 0x0000_0001;
    pub const FOURCC: u32 = 0x0000_0004;
    pub const RGB: u32 = 0x0000_0040;
}

/// Capability bits (`DDSCAPS_*` in caps, `DDSCAPS2_*` in caps2).
pub mod caps {
    pub const COMPLEX: u32 = 0x0000_0008;
    pub const TEXTURE: u32 = 0x0000_1000;
    pub const MIPMAP: u32 = 0x0040_0000;

    pub const CUBEMAP: u32 = 0x0000_0200;
    pub const CUBEMAP_POSITIVEX: u32 = 0x0000_0400;
    pub const CUBEMAP_NEGATIVEX: u32 = 0x0000_0800;
    pub const CUBEMAP_POSITIVEY: u32 = 0x0000_1000;
    pub const CUBEMAP_NEGATIVEY: u32 = 0x0000_2000;
    pub const CUBEMAP_POSITIVEZ: u32 = 0x0000_4000;
    pub const CUBEMAP_NEGATIVEZ: u32 = 0x0000_8000;
    pub const CUBEMAP_ALL_FACES: u32 = CUBEMAP_POSITIVEX
        | CUBEMAP_NEGATIVEX
        | CUBEMAP_POSITIVEY
        | CUBEMAP_NEGATIVEY
        | CUBEMAP_POSITIVEZ
        | CUBEMAP_NEGATIVEZ;
}

/// DDS file header, following the 4-byte magic.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Always 124.
    pub size: u32,
    /// `flags::*` bits.
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    /// Row pitch for uncompressed data, base level size for compressed data.
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    /// Levels including the base, when `flags::MIPMAPCOUNT` is set.
    pub mipmap_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: DdsPixelFormat,
    /// `caps::TEXTURE`, `caps::COMPLEX` and `caps::MIPMAP`.
    pub caps: u32,
    /// Cube map bits.
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
}

impl DdsHeader {
    pub const SIZE: u32 = 124;

    /// A header with only the size fields set.
    pub fn empty() -> Self {
        let mut header = Self::new_zeroed();
        header.size = Self::SIZE;
        header.pixel_format.size = DdsPixelFormat::SIZE;
        header
    }

    /// Header bytes as stored on disk (without the magic).
    pub fn to_bytes(&self) -> &[u8] {
        self.as_bytes()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn has_flags(&self, bits: u32) -> bool {
        self.flags & bits == bits
    }

    /// Whether caps2 marks this as a cube map.
    #[inline]
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & caps::CUBEMAP != 0
    }

    /// Whether caps1 declares a mip chain with more than one level.
    #[inline]
    pub fn has_mipmaps(&self) -> bool {
        self.caps & caps::MIPMAP != 0 && self.mipmap_count > 1
    }

    /// Number of stored levels, including the base level.
    #[inline]
    pub fn mip_count(&self) -> u32 {
        if self.has_mipmaps() {
            self.mipmap_count
        } else {
            1
        }
    }

    /// Compression format named by the FourCC, if the FOURCC flag is set.
    pub fn dxt_format(&self) -> Option<DxtFormat> {
        if self.pixel_format.flags & pixel_flags::FOURCC == 0 {
            return None;
        }
        DxtFormat::from_fourcc(&self.pixel_format.four_cc.0)
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Always 32.
    pub size: u32,
    /// `pixel_flags::*` bits.
    pub flags: u32,
    pub four_cc: FourCC,
    /// 24 or 32 for the supported uncompressed formats.
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    pub const SIZE: u32 = 32;
}

/// Compression tag stored in the pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const DXT1: Self = Self(*b"DXT1");
    pub const DXT3: Self = Self(*b"DXT3");
    pub const DXT5: Self = Self(*b"DXT5");

    /// The code as text, with non-printable bytes escaped.
    pub fn as_string(&self) -> String {
        self.0.escape_ascii().to_string()
    }
}

impl From<DxtFormat> for FourCC {
    fn from(format: DxtFormat) -> Self {
        Self(format.fourcc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(std::mem::size_of::<DdsHeader>(), DdsHeader::SIZE as usize);
        assert_eq!(
            std::mem::size_of::<DdsPixelFormat>(),
            DdsPixelFormat::SIZE as usize
        );
    }

    #[test]
    fn test_empty_header() {
        let header = DdsHeader::empty();
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), 124);
        assert_eq!(&bytes[0..4], &124u32.to_le_bytes());
        // Pixel format size sits after 18 words of header fields.
        assert_eq!(&bytes[72..76], &32u32.to_le_bytes());
        assert_eq!(header.mip_count(), 1);
        assert!(!header.is_cubemap());
    }

    #[test]
    fn test_mip_count_needs_caps() {
        let mut header = DdsHeader::empty();
        header.mipmap_count = 5;
        assert_eq!(header.mip_count(), 1);

        header.caps = caps::MIPMAP;
        assert_eq!(header.mip_count(), 5);
    }

    #[test]
    fn test_dxt_format_requires_fourcc_flag() {
        let mut header = DdsHeader::empty();
        header.pixel_format.four_cc = FourCC::DXT5;
        assert_eq!(header.dxt_format(), None);

        header.pixel_format.flags = pixel_flags::FOURCC;
        assert_eq!(header.dxt_format(), Some(DxtFormat::Dxt5));
        assert_eq!(FourCC::from(DxtFormat::Dxt1), FourCC::DXT1);
        assert_eq!(FourCC(*b"AB\0C").as_string(), "AB\\x00C");
    }
}
