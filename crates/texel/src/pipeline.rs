//! Preparing images and DDS files and handing them to a [`TextureSink`].
//!
//! Raw pixels go through these steps, each one optional:
//!
//! 1. rectangle targets (2D only) disable power-of-two, mipmaps and repeat
//! 2. vertical flip
//! 3. NTSC-safe color scaling
//! 4. alpha premultiplication
//! 5. power-of-two upscale, forced when the device lacks NPOT support
//! 6. box reduction to the device's maximum size
//! 7. YCoCg conversion
//! 8. upload of level 0, DXT compressed when requested and supported
//! 9. upload of mip levels box-filtered from the prepared base
//! 10. sampling state
//!
//! DDS files bypass all of this and are uploaded as stored.

use texel_common::{CubeFace, PixelLayout, RasterImage, TextureTarget};
use texel_dds::{DdsReader, SurfaceFormat, TextureKind};
use texel_dxt::{compress_image, DxtFormat};
use texel_image::{
    convert_rgb_to_ycocg, generate_mip_chain, multiply_alpha, reduce_to_max_size,
    resize_to_power_of_two, scale_rgb_to_ntsc_safe, split_cubemap, FaceOrder, HdrEncoding,
};
use tracing::{debug, warn};

use crate::capabilities::Capabilities;
use crate::decoder::PixelDecoder;
use crate::options::TextureOptions;
use crate::sink::{Capability, Sampling, TextureHandle, TextureSink, TextureType, Upload, UploadFormat};
use crate::{Error, Result};

/// Uploads textures to a sink, adapting them to its capabilities.
///
/// Every operation either returns the texture handle or an error. A texture
/// created by a failing call is released before the error is returned; a
/// handle passed in as `reuse` is left alone.
///
/// # Example
///
/// ```
/// use texel::prelude::*;
///
/// let mut sink = MemorySink::new(Capabilities::full(1024));
/// let mut pipeline = TexturePipeline::new(&mut sink);
///
/// let image = RasterImage::blank(3, 5, PixelLayout::Rgb);
/// let options = TextureOptions::new().with_mipmaps(true);
/// let handle = pipeline.create_texture(&image, &options, None)?;
///
/// let texture = sink.texture(handle).unwrap();
/// assert_eq!(texture.uploads[0].width, 4);
/// assert_eq!(texture.uploads.len(), 4);
/// # Ok::<(), texel::Error>(())
/// ```
pub struct TexturePipeline<'a, S: TextureSink + ?Sized> {
    sink: &'a mut S,
    capabilities: Capabilities,
}

impl<'a, S: TextureSink + ?Sized> TexturePipeline<'a, S> {
    /// Query the sink's capabilities and wrap it.
    pub fn new(sink: &'a mut S) -> Self {
        let capabilities = Capabilities::query(&*sink);
        debug!(?capabilities, "queried device capabilities");
        Self { sink, capabilities }
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &*self.sink
    }

    /// Create a 2D (or rectangle) texture from pixels.
    pub fn create_texture(
        &mut self,
        image: &RasterImage,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        let (options, kind, target) = self.resolve_2d(options)?;
        let prepared = self.prepare(image, &options, kind)?;

        self.with_texture(kind, reuse, |this, handle| {
            this.upload_prepared(handle, target, &prepared, &options)?;
            this.set_sampling(handle, &options)
        })
    }

    /// Create a 2D texture from an encoded file.
    ///
    /// With `dds_direct`, DDS input is uploaded as stored; anything the DDS
    /// path rejects is handed to `decoder` instead.
    pub fn load_texture<D: PixelDecoder + ?Sized>(
        &mut self,
        bytes: &[u8],
        decoder: &D,
        force: Option<PixelLayout>,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        if options.dds_direct {
            match self.load_dds(bytes, TextureKind::Plain, options, reuse) {
                Ok(handle) => return Ok(handle),
                Err(err) => debug!(%err, "direct DDS load failed, decoding instead"),
            }
        }

        let image = decoder.decode(bytes, force)?;
        self.create_texture(&image, options, reuse)
    }

    /// Create a 2D texture from a Radiance HDR file stored as `encoding`.
    ///
    /// With `rescale_to_max`, the brightest channel is mapped to the top of
    /// the encoding's range.
    pub fn load_hdr_texture<D: PixelDecoder + ?Sized>(
        &mut self,
        bytes: &[u8],
        decoder: &D,
        encoding: HdrEncoding,
        rescale_to_max: bool,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        let mut image = decoder.decode_rgbe(bytes)?;
        if !encoding.apply(&mut image, rescale_to_max) {
            warn!(?encoding, layout = ?image.layout(), "HDR encoding not applied");
        }
        self.create_texture(&image, options, reuse)
    }

    /// Create a cube map from six files in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn load_cubemap<D: PixelDecoder + ?Sized>(
        &mut self,
        faces: [&[u8]; 6],
        decoder: &D,
        force: Option<PixelLayout>,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        self.require(Capability::Cubemap)?;

        let mut images = Vec::with_capacity(6);
        for (face, bytes) in CubeFace::ALL.into_iter().zip(faces) {
            images.push((face, decoder.decode(bytes, force)?));
        }
        self.upload_cubemap(images, options, reuse)
    }

    /// Create a cube map from one file holding all six faces side by side.
    ///
    /// With `dds_direct`, a DDS cube map is uploaded as stored.
    pub fn load_single_cubemap<D: PixelDecoder + ?Sized>(
        &mut self,
        bytes: &[u8],
        order: &FaceOrder,
        decoder: &D,
        force: Option<PixelLayout>,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        if options.dds_direct {
            match self.load_dds(bytes, TextureKind::Cubemap, options, reuse) {
                Ok(handle) => return Ok(handle),
                Err(err) => debug!(%err, "direct DDS cube map load failed, decoding instead"),
            }
        }

        self.require(Capability::Cubemap)?;
        let image = decoder.decode(bytes, force)?;
        self.create_single_cubemap(&image, order, options, reuse)
    }

    /// Create a cube map from a 6:1 or 1:6 strip of faces laid out in `order`.
    pub fn create_single_cubemap(
        &mut self,
        image: &RasterImage,
        order: &FaceOrder,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        self.require(Capability::Cubemap)?;
        let faces = split_cubemap(image, order)?;
        self.upload_cubemap(faces.into_dds_order(), options, reuse)
    }

    /// Upload a DDS file as stored, including its mip chain.
    ///
    /// The file must hold a texture of `kind`. Of `options`, only `repeat`
    /// applies.
    pub fn load_dds(
        &mut self,
        bytes: &[u8],
        kind: TextureKind,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        let reader = DdsReader::new(bytes)?;
        reader.expect_kind(kind)?;
        if reader.format().is_compressed() {
            self.require(Capability::Dxt)?;
        }
        let texture_type = match kind {
            TextureKind::Plain => TextureType::Texture2d,
            TextureKind::Cubemap => {
                self.require(Capability::Cubemap)?;
                TextureType::Cubemap
            }
        };
        let sampling = Sampling::new(
            reader.layout().level_count() > 1,
            options.effective_for_dds().repeat,
        );

        self.with_texture(texture_type, reuse, |this, handle| {
            for surface in reader.faces() {
                let surface = surface?;
                let format = match surface.format {
                    SurfaceFormat::Dxt(format) => UploadFormat::Compressed(format),
                    uncompressed => UploadFormat::Raw(uncompressed.layout()),
                };
                for level in &surface.levels {
                    this.sink.upload(
                        handle,
                        Upload {
                            target: surface.target,
                            level: level.level,
                            format,
                            width: level.width,
                            height: level.height,
                            data: level.data.as_ref(),
                        },
                    )?;
                }
            }
            this.sink.set_sampling(handle, sampling)?;
            Ok(())
        })
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities.supports(capability) {
            Ok(())
        } else {
            Err(Error::Unsupported(capability))
        }
    }

    /// Apply rectangle handling for a 2D request.
    fn resolve_2d(
        &self,
        options: &TextureOptions,
    ) -> Result<(TextureOptions, TextureType, TextureTarget)> {
        let mut options = *options;
        if !options.rectangle {
            return Ok((options, TextureType::Texture2d, TextureTarget::Texture2d));
        }
        self.require(Capability::Rectangle)?;
        options.power_of_two = false;
        options.mipmaps = false;
        options.repeat = false;
        Ok((options, TextureType::Rectangle, TextureTarget::Rectangle))
    }

    /// Run the pixel transforms and resizing for one surface.
    fn prepare(
        &self,
        image: &RasterImage,
        options: &TextureOptions,
        kind: TextureType,
    ) -> Result<RasterImage> {
        let (width, height) = image.dimensions();
        if image.is_empty() {
            return Err(Error::EmptyImage { width, height });
        }

        let mut image = image.clone();
        if options.invert_y {
            image.flip_vertical();
        }
        if options.ntsc_safe {
            scale_rgb_to_ntsc_safe(&mut image);
        }
        if options.multiply_alpha {
            multiply_alpha(&mut image);
        }

        let max_size = self.capabilities.max_size(kind);
        let force_pot = !self.capabilities.npot && kind != TextureType::Rectangle;
        if options.power_of_two
            || options.mipmaps
            || force_pot
            || width > max_size
            || height > max_size
        {
            image = resize_to_power_of_two(image)?;
        }
        image = reduce_to_max_size(image, max_size)?;

        if options.ycocg {
            convert_rgb_to_ycocg(&mut image);
        }
        Ok(image)
    }

    /// Create or rebind a texture and fill it, releasing it again if `fill`
    /// fails and it was created here.
    fn with_texture<F>(
        &mut self,
        kind: TextureType,
        reuse: Option<TextureHandle>,
        fill: F,
    ) -> Result<TextureHandle>
    where
        F: FnOnce(&mut Self, TextureHandle) -> Result<()>,
    {
        let handle = self.sink.create_texture(kind, reuse)?;
        if let Err(err) = fill(self, handle) {
            if reuse != Some(handle) {
                debug!(%handle, %err, "releasing texture after failed upload");
                self.sink.release(handle);
            }
            return Err(err);
        }
        Ok(handle)
    }

    fn upload_cubemap(
        &mut self,
        faces: Vec<(CubeFace, RasterImage)>,
        options: &TextureOptions,
        reuse: Option<TextureHandle>,
    ) -> Result<TextureHandle> {
        let options = TextureOptions {
            rectangle: false,
            ..*options
        };
        let prepared = faces
            .iter()
            .map(|(face, image)| Ok((*face, self.prepare(image, &options, TextureType::Cubemap)?)))
            .collect::<Result<Vec<_>>>()?;

        self.with_texture(TextureType::Cubemap, reuse, |this, handle| {
            for (face, image) in &prepared {
                this.upload_prepared(handle, TextureTarget::CubeFace(*face), image, &options)?;
            }
            this.set_sampling(handle, &options)
        })
    }

    /// Upload a prepared base level and, if requested, its mip chain.
    fn upload_prepared(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
        image: &RasterImage,
        options: &TextureOptions,
    ) -> Result<()> {
        let compression = (options.compress_dxt && self.capabilities.dxt)
            .then(|| DxtFormat::for_channels(image.channels()));
        debug!(
            %target,
            width = image.width(),
            height = image.height(),
            channels = image.channels(),
            compression = ?compression,
            mipmaps = options.mipmaps,
            "uploading texture"
        );

        self.upload_level(handle, target, 0, image, compression)?;
        if options.mipmaps {
            for (index, mip) in generate_mip_chain(image)?.iter().enumerate() {
                self.upload_level(handle, target, index as u32 + 1, mip, compression)?;
            }
        }
        Ok(())
    }

    /// Upload one level, compressing it first when `compression` is set.
    ///
    /// If the compressor fails the raw pixels are uploaded instead, asking
    /// the device to compress them.
    fn upload_level(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
        level: u32,
        image: &RasterImage,
        compression: Option<DxtFormat>,
    ) -> Result<()> {
        let layout = image.layout();
        let blocks;
        let (format, data) = match compression {
            None => (UploadFormat::Raw(layout), image.data()),
            Some(format) => match compress_image(image, format) {
                Ok(compressed) => {
                    blocks = compressed;
                    (UploadFormat::Compressed(format), blocks.as_slice())
                }
                Err(err) => {
                    warn!(%err, %target, level, "DXT compression failed, uploading raw pixels");
                    let format = UploadFormat::RawAs {
                        layout,
                        internal: format,
                    };
                    (format, image.data())
                }
            },
        };

        self.sink.upload(
            handle,
            Upload {
                target,
                level,
                format,
                width: image.width(),
                height: image.height(),
                data,
            },
        )?;
        Ok(())
    }

    fn set_sampling(&mut self, handle: TextureHandle, options: &TextureOptions) -> Result<()> {
        let sampling = Sampling::new(options.mipmaps, options.repeat);
        self.sink.set_sampling(handle, sampling)?;
        Ok(())
    }
}
