use std::fmt;

/// S3TC block compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DxtFormat {
    /// 8-byte blocks, opaque or 1-bit alpha.
    Dxt1,
    /// 16-byte blocks with explicit 4-bit alpha.
    Dxt3,
    /// 16-byte blocks with interpolated alpha.
    Dxt5,
}

impl DxtFormat {
    /// Bytes per 4x4 block.
    #[inline]
    pub const fn block_size(self) -> usize {
        match self {
            DxtFormat::Dxt1 => 8,
            DxtFormat::Dxt3 | DxtFormat::Dxt5 => 16,
        }
    }

    /// FourCC code stored in a DDS pixel format.
    pub const fn fourcc(self) -> [u8; 4] {
        match self {
            DxtFormat::Dxt1 => *b"DXT1",
            DxtFormat::Dxt3 => *b"DXT3",
            DxtFormat::Dxt5 => *b"DXT5",
        }
    }

    /// Format for a FourCC code, if it names one of ours.
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"DXT1" => Some(DxtFormat::Dxt1),
            b"DXT3" => Some(DxtFormat::Dxt3),
            b"DXT5" => Some(DxtFormat::Dxt5),
            _ => None,
        }
    }

    /// DXT1 for an odd channel count (no alpha), DXT5 for an even one.
    #[inline]
    pub const fn for_channels(channels: usize) -> Self {
        if channels % 2 == 1 {
            DxtFormat::Dxt1
        } else {
            DxtFormat::Dxt5
        }
    }

    /// Whether the blocks carry an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        !matches!(self, DxtFormat::Dxt1)
    }

    /// Number of 4x4 blocks covering `width x height`.
    #[inline]
    pub fn block_count(width: u32, height: u32) -> usize {
        width.div_ceil(4) as usize * height.div_ceil(4) as usize
    }

    /// Compressed byte size of a `width x height` surface.
    #[inline]
    pub fn compressed_size(self, width: u32, height: u32) -> usize {
        Self::block_count(width, height) * self.block_size()
    }

    /// [`compressed_size`](Self::compressed_size), or `None` on overflow.
    pub fn checked_compressed_size(self, width: u32, height: u32) -> Option<usize> {
        (width.div_ceil(4) as usize)
            .checked_mul(height.div_ceil(4) as usize)?
            .checked_mul(self.block_size())
    }
}

impl fmt::Display for DxtFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DxtFormat::Dxt1 => "DXT1",
            DxtFormat::Dxt3 => "DXT3",
            DxtFormat::Dxt5 => "DXT5",
        };
        f.write_str(name)
    }
}
