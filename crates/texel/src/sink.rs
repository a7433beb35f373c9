//! The device side of the pipeline.
//!
//! [`TextureSink`] is everything the pipeline needs from a graphics API:
//! capability queries, texture objects, uploads and sampling state.
//! [`MemorySink`] records calls instead of talking to a device.

use std::collections::BTreeMap;
use std::fmt;

use texel_common::{PixelLayout, TextureTarget};
use texel_dxt::DxtFormat;
use thiserror::Error;

use crate::capabilities::Capabilities;

/// Opaque texture object name handed out by a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureHandle(pub u32);

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of texture object to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureType {
    Texture2d,
    /// Non-normalized coordinates, no mipmaps.
    Rectangle,
    Cubemap,
}

/// Optional device features the pipeline adapts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    NonPowerOfTwo,
    Rectangle,
    Cubemap,
    Dxt,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::NonPowerOfTwo => "non-power-of-two textures",
            Capability::Rectangle => "rectangle textures",
            Capability::Cubemap => "cube maps",
            Capability::Dxt => "DXT compression",
        };
        f.write_str(name)
    }
}

/// How uploaded bytes are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UploadFormat {
    /// Uncompressed pixels stored as they are.
    Raw(PixelLayout),
    /// Uncompressed pixels the device should compress to `internal`.
    RawAs {
        layout: PixelLayout,
        internal: DxtFormat,
    },
    /// DXT blocks.
    Compressed(DxtFormat),
}

/// One level of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upload<'a> {
    pub target: TextureTarget,
    pub level: u32,
    pub format: UploadFormat,
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Wrap {
    Repeat,
    #[default]
    Clamp,
}

/// Filtering and wrapping for a finished texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sampling {
    /// Trilinear minification when true, linear otherwise.
    pub mipmapped: bool,
    /// Applies to every coordinate, including R for cube maps.
    pub wrap: Wrap,
}

impl Sampling {
    pub fn new(mipmapped: bool, repeat: bool) -> Self {
        Self {
            mipmapped,
            wrap: if repeat { Wrap::Repeat } else { Wrap::Clamp },
        }
    }
}

/// Failure reported by a sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("texture sink error: {0}")]
pub struct SinkError(pub String);

/// A graphics device the pipeline uploads textures to.
pub trait TextureSink {
    fn query_capability(&self, capability: Capability) -> bool;

    /// Largest dimension accepted for textures of `kind`.
    fn max_texture_size(&self, kind: TextureType) -> u32;

    /// Create a texture object, or rebind `reuse` when given.
    fn create_texture(
        &mut self,
        kind: TextureType,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle, SinkError>;

    fn upload(&mut self, handle: TextureHandle, upload: Upload<'_>) -> Result<(), SinkError>;

    fn set_sampling(&mut self, handle: TextureHandle, sampling: Sampling) -> Result<(), SinkError>;

    fn release(&mut self, handle: TextureHandle);
}

/// An upload as seen by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub target: TextureTarget,
    pub level: u32,
    pub format: UploadFormat,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A live texture in a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTexture {
    pub kind: TextureType,
    pub uploads: Vec<RecordedUpload>,
    pub sampling: Option<Sampling>,
}

impl MemoryTexture {
    /// Uploads to `target`, ordered by level.
    pub fn levels(&self, target: TextureTarget) -> Vec<&RecordedUpload> {
        let mut levels: Vec<_> = self.uploads.iter().filter(|u| u.target == target).collect();
        levels.sort_by_key(|u| u.level);
        levels
    }
}

/// A [`TextureSink`] that keeps everything in memory.
///
/// Used by tests and by dry runs of the CLI.
#[derive(Debug, Clone)]
pub struct MemorySink {
    capabilities: Capabilities,
    textures: BTreeMap<TextureHandle, MemoryTexture>,
    released: Vec<TextureHandle>,
    next_id: u32,
    uploads_seen: usize,
    fail_upload: Option<usize>,
}

impl MemorySink {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            textures: BTreeMap::new(),
            released: Vec::new(),
            next_id: 1,
            uploads_seen: 0,
            fail_upload: None,
        }
    }

    /// Reject the `n`th upload (counting from zero) with a [`SinkError`].
    pub fn failing_upload(mut self, n: usize) -> Self {
        self.fail_upload = Some(n);
        self
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&MemoryTexture> {
        self.textures.get(&handle)
    }

    /// Live textures.
    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &MemoryTexture)> {
        self.textures.iter().map(|(handle, texture)| (*handle, texture))
    }

    pub fn released(&self) -> &[TextureHandle] {
        &self.released
    }

    fn live(&mut self, handle: TextureHandle) -> Result<&mut MemoryTexture, SinkError> {
        self.textures
            .get_mut(&handle)
            .ok_or_else(|| SinkError(format!("unknown texture {handle}")))
    }
}

impl TextureSink for MemorySink {
    fn query_capability(&self, capability: Capability) -> bool {
        self.capabilities.supports(capability)
    }

    fn max_texture_size(&self, kind: TextureType) -> u32 {
        self.capabilities.max_size(kind)
    }

    fn create_texture(
        &mut self,
        kind: TextureType,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle, SinkError> {
        let handle = match reuse {
            Some(handle) => handle,
            None => {
                let handle = TextureHandle(self.next_id);
                self.next_id += 1;
                handle
            }
        };
        self.textures
            .entry(handle)
            .and_modify(|texture| texture.kind = kind)
            .or_insert_with(|| MemoryTexture {
                kind,
                uploads: Vec::new(),
                sampling: None,
            });
        Ok(handle)
    }

    fn upload(&mut self, handle: TextureHandle, upload: Upload<'_>) -> Result<(), SinkError> {
        let n = self.uploads_seen;
        self.uploads_seen += 1;
        if self.fail_upload == Some(n) {
            return Err(SinkError(format!("upload {n} rejected")));
        }

        let texture = self.live(handle)?;
        texture
            .uploads
            .retain(|u| !(u.target == upload.target && u.level == upload.level));
        texture.uploads.push(RecordedUpload {
            target: upload.target,
            level: upload.level,
            format: upload.format,
            width: upload.width,
            height: upload.height,
            data: upload.data.to_vec(),
        });
        Ok(())
    }

    fn set_sampling(&mut self, handle: TextureHandle, sampling: Sampling) -> Result<(), SinkError> {
        self.live(handle)?.sampling = Some(sampling);
        Ok(())
    }

    fn release(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_some() {
            self.released.push(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(level: u32, data: &[u8]) -> Upload<'_> {
        Upload {
            target: TextureTarget::Texture2d,
            level,
            format: UploadFormat::Raw(PixelLayout::Luminance),
            width: 1,
            height: 1,
            data,
        }
    }

    #[test]
    fn test_handles_are_unique() {
        let mut sink = MemorySink::new(Capabilities::full(64));
        let a = sink.create_texture(TextureType::Texture2d, None).unwrap();
        let b = sink.create_texture(TextureType::Cubemap, None).unwrap();
        assert_ne!(a, b);
        assert_eq!(sink.textures().count(), 2);

        let again = sink.create_texture(TextureType::Texture2d, Some(a)).unwrap();
        assert_eq!(again, a);
        assert_eq!(sink.textures().count(), 2);
    }

    #[test]
    fn test_reupload_replaces_level() {
        let mut sink = MemorySink::new(Capabilities::full(64));
        let handle = sink.create_texture(TextureType::Texture2d, None).unwrap();
        sink.upload(handle, upload(1, &[1])).unwrap();
        sink.upload(handle, upload(0, &[2])).unwrap();
        sink.upload(handle, upload(0, &[3])).unwrap();

        let levels = sink.texture(handle).unwrap().levels(TextureTarget::Texture2d);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].data, vec![3]);
        assert_eq!(levels[1].data, vec![1]);
    }

    #[test]
    fn test_failing_upload_and_release() {
        let mut sink = MemorySink::new(Capabilities::full(64)).failing_upload(1);
        let handle = sink.create_texture(TextureType::Texture2d, None).unwrap();
        assert!(sink.upload(handle, upload(0, &[0])).is_ok());
        assert!(sink.upload(handle, upload(1, &[0])).is_err());

        sink.release(handle);
        assert!(sink.texture(handle).is_none());
        assert_eq!(sink.released(), &[handle]);
        assert!(sink.set_sampling(handle, Sampling::default()).is_err());
    }
}
