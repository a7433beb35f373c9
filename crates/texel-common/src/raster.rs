//! Interleaved 8-bit raster images.

use crate::{Error, Result};

/// Channel layout of an interleaved 8-bit image.
///
/// The discriminant is the channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelLayout {
    /// One channel (greyscale).
    Luminance = 1,
    /// Greyscale plus alpha.
    LuminanceAlpha = 2,
    /// Red, green, blue.
    Rgb = 3,
    /// Red, green, blue, alpha.
    Rgba = 4,
}

impl PixelLayout {
    /// Layout for a channel count in `1..=4`.
    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::Luminance),
            2 => Ok(Self::LuminanceAlpha),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            n => Err(Error::InvalidChannelCount(n)),
        }
    }

    /// Number of interleaved channels.
    #[inline]
    pub const fn channels(self) -> usize {
        self as usize
    }

    /// Whether the last channel is alpha (2 and 4 channel layouts).
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::LuminanceAlpha | Self::Rgba)
    }

    /// Number of color (non-alpha) channels.
    #[inline]
    pub const fn color_channels(self) -> usize {
        match self {
            Self::Luminance | Self::LuminanceAlpha => 1,
            Self::Rgb | Self::Rgba => 3,
        }
    }
}

/// An image with `width * height * channels` interleaved bytes.
///
/// The buffer length always equals that product. Zero-sized images are
/// allowed and hold an empty buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap an existing pixel buffer, checking its length.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = Self::buffer_len(width, height, layout);
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                width,
                height,
                channels: layout.channels(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Create a zero-filled image.
    pub fn blank(width: u32, height: u32, layout: PixelLayout) -> Self {
        Self {
            width,
            height,
            layout,
            data: vec![0; Self::buffer_len(width, height, layout)],
        }
    }

    /// Create an image with every pixel set to `pixel`.
    ///
    /// `pixel` must hold exactly `layout.channels()` bytes.
    pub fn filled(width: u32, height: u32, layout: PixelLayout, pixel: &[u8]) -> Result<Self> {
        if pixel.len() != layout.channels() {
            return Err(Error::InvalidChannelCount(pixel.len()));
        }
        let count = width as usize * height as usize;
        Self::new(width, height, layout, pixel.repeat(count))
    }

    /// Byte length of a buffer for the given dimensions.
    #[inline]
    pub fn buffer_len(width: u32, height: u32, layout: PixelLayout) -> usize {
        width as usize * height as usize * layout.channels()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// True when the image has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the pixel bytes. The length cannot change.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of one row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels()
    }

    /// Bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Bytes of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside of the image.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[start..start + channels]
    }

    /// Mirror the image about its horizontal axis.
    pub fn flip_vertical(&mut self) {
        let stride = self.stride();
        let height = self.height as usize;
        for top in 0..height / 2 {
            let bottom = height - 1 - top;
            let (upper, lower) = self.data.split_at_mut(bottom * stride);
            upper[top * stride..(top + 1) * stride].swap_with_slice(&mut lower[..stride]);
        }
    }

    /// Swap the first and third channel of every pixel (RGB <-> BGR).
    ///
    /// Images with fewer than three channels are left untouched.
    pub fn swap_red_blue(&mut self) {
        let channels = self.channels();
        if channels < 3 {
            return;
        }
        for pixel in self.data.chunks_exact_mut(channels) {
            pixel.swap(0, 2);
        }
    }

    /// Copy a rectangular region into a new image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let fits = x
            .checked_add(width)
            .zip(y.checked_add(height))
            .is_some_and(|(right, bottom)| right <= self.width && bottom <= self.height);
        if !fits {
            return Err(Error::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                image_width: self.width,
                image_height: self.height,
            });
        }

        let channels = self.channels();
        let row_bytes = width as usize * channels;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for row in y..y + height {
            let start = (row as usize * self.width as usize + x as usize) * channels;
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        Self::new(width, height, self.layout, data)
    }

    /// Convert to another channel layout.
    ///
    /// Luminance is replicated into RGB, RGB is reduced to luminance with
    /// integer Rec.601 weights, and alpha is dropped or filled with 255.
    pub fn with_layout(&self, layout: PixelLayout) -> Self {
        if layout == self.layout {
            return self.clone();
        }

        let src_channels = self.channels();
        let mut data = Vec::with_capacity(Self::buffer_len(self.width, self.height, layout));
        for pixel in self.data.chunks_exact(src_channels) {
            let (r, g, b) = match self.layout {
                PixelLayout::Luminance | PixelLayout::LuminanceAlpha => {
                    (pixel[0], pixel[0], pixel[0])
                }
                PixelLayout::Rgb | PixelLayout::Rgba => (pixel[0], pixel[1], pixel[2]),
            };
            let alpha = if self.layout.has_alpha() {
                pixel[src_channels - 1]
            } else {
                255
            };

            match layout {
                PixelLayout::Luminance => data.push(luma(r, g, b)),
                PixelLayout::LuminanceAlpha => data.extend_from_slice(&[luma(r, g, b), alpha]),
                PixelLayout::Rgb => data.extend_from_slice(&[r, g, b]),
                PixelLayout::Rgba => data.extend_from_slice(&[r, g, b, alpha]),
            }
        }

        Self {
            width: self.width,
            height: self.height,
            layout,
            data,
        }
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}
