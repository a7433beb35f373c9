//! Texture preparation options.

/// What to do to an image on its way to the device.
///
/// All options are off by default.
///
/// # Example
///
/// ```
/// use texel::TextureOptions;
///
/// let options = TextureOptions::new()
///     .with_mipmaps(true)
///     .with_compress_dxt(true);
/// assert!(options.mipmaps && options.compress_dxt);
/// assert!(!options.repeat);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextureOptions {
    /// Upscale to power-of-two dimensions.
    pub power_of_two: bool,
    /// Generate and upload a mip chain. Implies `power_of_two`.
    pub mipmaps: bool,
    /// Wrap texture coordinates instead of clamping them.
    pub repeat: bool,
    /// Convert straight alpha to premultiplied alpha.
    pub multiply_alpha: bool,
    /// Flip the image vertically.
    pub invert_y: bool,
    /// Compress to DXT1 (no alpha) or DXT5 (alpha) when the device supports it.
    pub compress_dxt: bool,
    /// Try to upload the input as a DDS file before decoding it as an image.
    pub dds_direct: bool,
    /// Scale colors into the NTSC-safe `[16, 235]` range.
    pub ntsc_safe: bool,
    /// Store colors as YCoCg.
    pub ycocg: bool,
    /// Use a rectangle texture with unnormalized coordinates. Ignored for cube maps.
    pub rectangle: bool,
}

impl TextureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power_of_two(mut self, on: bool) -> Self {
        self.power_of_two = on;
        self
    }

    pub fn with_mipmaps(mut self, on: bool) -> Self {
        self.mipmaps = on;
        self
    }

    pub fn with_repeat(mut self, on: bool) -> Self {
        self.repeat = on;
        self
    }

    pub fn with_multiply_alpha(mut self, on: bool) -> Self {
        self.multiply_alpha = on;
        self
    }

    pub fn with_invert_y(mut self, on: bool) -> Self {
        self.invert_y = on;
        self
    }

    pub fn with_compress_dxt(mut self, on: bool) -> Self {
        self.compress_dxt = on;
        self
    }

    pub fn with_dds_direct(mut self, on: bool) -> Self {
        self.dds_direct = on;
        self
    }

    pub fn with_ntsc_safe(mut self, on: bool) -> Self {
        self.ntsc_safe = on;
        self
    }

    pub fn with_ycocg(mut self, on: bool) -> Self {
        self.ycocg = on;
        self
    }

    pub fn with_rectangle(mut self, on: bool) -> Self {
        self.rectangle = on;
        self
    }

    /// Options set in either `self` or `other`.
    pub fn union(self, other: Self) -> Self {
        Self {
            power_of_two: self.power_of_two || other.power_of_two,
            mipmaps: self.mipmaps || other.mipmaps,
            repeat: self.repeat || other.repeat,
            multiply_alpha: self.multiply_alpha || other.multiply_alpha,
            invert_y: self.invert_y || other.invert_y,
            compress_dxt: self.compress_dxt || other.compress_dxt,
            dds_direct: self.dds_direct || other.dds_direct,
            ntsc_safe: self.ntsc_safe || other.ntsc_safe,
            ycocg: self.ycocg || other.ycocg,
            rectangle: self.rectangle || other.rectangle,
        }
    }

    /// Options that still apply when a DDS file is uploaded as stored.
    ///
    /// Direct uploads keep the file's own pixels and mip chain, so only
    /// `repeat` survives.
    pub fn effective_for_dds(self) -> Self {
        if !self.dds_direct {
            return self;
        }
        Self {
            repeat: self.repeat,
            dds_direct: true,
            ..Self::default()
        }
    }
}
