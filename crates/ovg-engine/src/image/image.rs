use bitflags::bitflags;

use crate::resources::{BufferId, ImageHandle};

use super::buffer::PixelRect;
use super::format::ImageFormat;

/// Largest accepted image width or height.
pub const MAX_IMAGE_DIMENSION: i32 = 8192;

bitflags! {
    /// Resampling qualities an image may be drawn with.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ImageQuality: u32 {
        const NONANTIALIASED = 1 << 0;
        const FASTER         = 1 << 1;
        const BETTER         = 1 << 2;
    }
}

/// Image record. Pixels live in a shared [`PixelBuffer`](super::PixelBuffer);
/// a child image points at its root's buffer with an accumulated offset.
#[derive(Debug, Clone)]
pub struct Image {
    pub(crate) format: ImageFormat,
    pub(crate) allowed_quality: ImageQuality,
    pub(crate) buffer: BufferId,
    /// Region of the root buffer this image covers.
    pub(crate) region: PixelRect,
    pub(crate) parent: Option<ImageHandle>,
    pub(crate) children: usize,
}

impl Image {
    pub(crate) fn root(
        format: ImageFormat,
        width: u32,
        height: u32,
        allowed_quality: ImageQuality,
        buffer: BufferId,
    ) -> Self {
        Self {
            format,
            allowed_quality,
            buffer,
            region: PixelRect::new(0, 0, width, height),
            parent: None,
            children: 0,
        }
    }

    /// Child covering `local` (relative to this image).
    pub(crate) fn child(&self, parent: ImageHandle, local: PixelRect) -> Self {
        Self {
            format: self.format,
            allowed_quality: self.allowed_quality,
            buffer: self.buffer,
            region: local.offset(self.region.x, self.region.y),
            parent: Some(parent),
            children: 0,
        }
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.region.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.region.height
    }

    #[inline]
    pub fn allowed_quality(&self) -> ImageQuality {
        self.allowed_quality
    }

    #[inline]
    pub fn parent(&self) -> Option<ImageHandle> {
        self.parent
    }

    #[inline]
    pub fn region(&self) -> PixelRect {
        self.region
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.children > 0
    }

    /// Validates a rectangle in this image's space and maps it into the
    /// root buffer.
    pub(crate) fn map_rect(&self, x: i32, y: i32, width: i32, height: i32) -> Option<PixelRect> {
        PixelRect::checked(x, y, width, height, (self.width(), self.height()))
            .map(|local| local.offset(self.region.x, self.region.y))
    }
}
