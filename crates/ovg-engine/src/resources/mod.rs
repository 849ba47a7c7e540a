//! Application-owned tables of paths, paints and images.
//!
//! Every object is addressed by a generational handle. A handle whose object
//! was destroyed resolves to [`VgError::InvalidHandle`] instead of dangling,
//! which is how stale paint bindings on a context are detected.

mod images;
mod paints;
mod paths;

use slotmap::{new_key_type, SlotMap};

use crate::error::{VgError, VgResult};
use crate::image::{Image, PixelBuffer};
use crate::paint::Paint;
use crate::path::Path;

new_key_type! {
    pub struct PathHandle;
    pub struct PaintHandle;
    pub struct ImageHandle;
    /// Slot of a root image's pixel buffer in the pixel arena.
    pub struct BufferId;
}

#[derive(Debug, Default)]
pub struct Resources {
    paths: SlotMap<PathHandle, Path>,
    paints: SlotMap<PaintHandle, Paint>,
    images: SlotMap<ImageHandle, Image>,
    buffers: SlotMap<BufferId, PixelBuffer>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn paint_count(&self) -> usize {
        self.paints.len()
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Number of live pixel buffers; children share their root's buffer.
    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn path(&self, handle: PathHandle) -> VgResult<&Path> {
        self.paths.get(handle).ok_or(VgError::InvalidHandle)
    }

    pub fn path_mut(&mut self, handle: PathHandle) -> VgResult<&mut Path> {
        self.paths.get_mut(handle).ok_or(VgError::InvalidHandle)
    }

    pub fn paint(&self, handle: PaintHandle) -> VgResult<&Paint> {
        self.paints.get(handle).ok_or(VgError::InvalidHandle)
    }

    pub fn paint_mut(&mut self, handle: PaintHandle) -> VgResult<&mut Paint> {
        self.paints.get_mut(handle).ok_or(VgError::InvalidHandle)
    }

    pub fn image(&self, handle: ImageHandle) -> VgResult<&Image> {
        self.images.get(handle).ok_or(VgError::InvalidHandle)
    }

    /// Pixel buffer backing `image` (its root's buffer for a child).
    pub fn image_buffer(&self, image: &Image) -> VgResult<&PixelBuffer> {
        self.buffers.get(image.buffer).ok_or(VgError::InvalidHandle)
    }

    fn image_buffer_mut(&mut self, buffer: BufferId) -> VgResult<&mut PixelBuffer> {
        self.buffers.get_mut(buffer).ok_or(VgError::InvalidHandle)
    }
}
