//! Image store types: pixel arena buffers, image records and format
//! conversion.
//!
//! Pixels are kept once per root image as straight RGBA8. Child images are
//! views onto their root's buffer, so writes through any of them are seen by
//! all.

mod buffer;
mod format;
mod image;

pub use buffer::{PixelBuffer, PixelRect};
pub use format::{ImageFormat, Texel};
pub use image::{Image, ImageQuality, MAX_IMAGE_DIMENSION};

pub(crate) use format::{decode, encode};
