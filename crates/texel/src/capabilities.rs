//! Device capabilities, queried once per pipeline.

use crate::sink::{Capability, TextureSink, TextureType};

/// What the device behind a [`TextureSink`] can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    pub npot: bool,
    pub rectangle: bool,
    pub cubemap: bool,
    pub dxt: bool,
    pub max_texture_size: u32,
    pub max_cubemap_size: u32,
}

impl Capabilities {
    /// Ask `sink` for every capability.
    pub fn query<S: TextureSink + ?Sized>(sink: &S) -> Self {
        Self {
            npot: sink.query_capability(Capability::NonPowerOfTwo),
            rectangle: sink.query_capability(Capability::Rectangle),
            cubemap: sink.query_capability(Capability::Cubemap),
            dxt: sink.query_capability(Capability::Dxt),
            max_texture_size: sink.max_texture_size(TextureType::Texture2d),
            max_cubemap_size: sink.max_texture_size(TextureType::Cubemap),
        }
    }

    /// Everything supported, up to `max_size` in either dimension.
    pub fn full(max_size: u32) -> Self {
        Self {
            npot: true,
            rectangle: true,
            cubemap: true,
            dxt: true,
            max_texture_size: max_size,
            max_cubemap_size: max_size,
        }
    }

    /// No optional features, up to `max_size` in either dimension.
    pub fn minimal(max_size: u32) -> Self {
        Self {
            npot: false,
            rectangle: false,
            cubemap: false,
            dxt: false,
            max_texture_size: max_size,
            max_cubemap_size: max_size,
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::NonPowerOfTwo => self.npot,
            Capability::Rectangle => self.rectangle,
            Capability::Cubemap => self.cubemap,
            Capability::Dxt => self.dxt,
        }
    }

    /// Size limit for textures of `kind`. Rectangles share the 2D limit.
    pub fn max_size(&self, kind: TextureType) -> u32 {
        match kind {
            TextureType::Cubemap => self.max_cubemap_size,
            TextureType::Texture2d | TextureType::Rectangle => self.max_texture_size,
        }
    }
}
