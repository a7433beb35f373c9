//! Pixel transforms for Texel.
//!
//! - [`color`] - NTSC-safe scaling, YCoCg, premultiplied alpha and RGBE re-encoding
//! - [`resample`] - Bilinear upscaling, box-filter reduction and mipmap chains
//! - [`cubemap`] - Splitting a 6:1 strip into cube map faces

pub mod color;
pub mod cubemap;
mod error;
pub mod resample;

pub use color::{
    convert_rgb_to_ycocg, convert_ycocg_to_rgb, multiply_alpha, rgbe_to_rgb_div_a,
    rgbe_to_rgb_div_a2, scale_rgb_to_ntsc_safe, HdrEncoding,
};
pub use cubemap::{split_cubemap, CubeFaceSet, FaceOrder};
pub use error::{Error, Result};
pub use resample::{
    generate_mip_chain, is_power_of_two, mip_chain_len, mipmap_image, next_power_of_two_size,
    reduce_to_max_size, resize_to_power_of_two, upscale_image,
};
