//! Ordered header validation.
//!
//! Each rule is checked in turn and the first one that fails is reported, so
//! a buffer with several problems always yields the same reason.

use texel_common::BinaryReader;
use tracing::debug;

use crate::header::{caps, flags, pixel_flags, DdsHeader, DdsPixelFormat};
use crate::{MalformedReason, Result, DDS_MAGIC, DDS_PREFIX_SIZE};

type Rule = (MalformedReason, fn(&DdsHeader) -> bool);

const RULES: [Rule; 6] = [
    (MalformedReason::BadHeaderSize, header_size),
    (MalformedReason::MissingRequiredFlags, required_flags),
    (MalformedReason::BadPixelFormatSize, pixel_format_size),
    (MalformedReason::NoPixelFormat, has_pixel_format),
    (MalformedReason::NotATexture, is_texture),
    (MalformedReason::UnsupportedFourCc, supported_fourcc),
];

fn header_size(h: &DdsHeader) -> bool {
    h.size == DdsHeader::SIZE
}

fn required_flags(h: &DdsHeader) -> bool {
    h.has_flags(flags::REQUIRED)
}

fn pixel_format_size(h: &DdsHeader) -> bool {
    h.pixel_format.size == DdsPixelFormat::SIZE
}

fn has_pixel_format(h: &DdsHeader) -> bool {
    h.pixel_format.flags & (pixel_flags::FOURCC | pixel_flags::RGB) != 0
}

fn is_texture(h: &DdsHeader) -> bool {
    h.caps & caps::TEXTURE != 0
}

fn supported_fourcc(h: &DdsHeader) -> bool {
    h.pixel_format.flags & pixel_flags::FOURCC == 0 || h.dxt_format().is_some()
}

/// Check that `bytes` starts with a DDS texture header we can read and
/// return the header.
pub fn validate(bytes: &[u8]) -> Result<DdsHeader> {
    if bytes.len() < DDS_PREFIX_SIZE {
        return Err(MalformedReason::TooSmall.into());
    }

    let mut reader = BinaryReader::new(bytes);
    if reader.expect_magic(DDS_MAGIC).is_err() {
        return Err(MalformedReason::BadMagic.into());
    }
    let header: DdsHeader = reader.read_struct()?;

    if let Some((reason, _)) = RULES.iter().find(|(_, holds)| !holds(&header)) {
        debug!(%reason, "rejecting DDS header");
        return Err((*reason).into());
    }
    Ok(header)
}
