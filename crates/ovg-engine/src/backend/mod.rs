//! Rasterization backends.
//!
//! The draw pipeline talks to a [`Backend`] in terms of [`cmd`] types only.
//! Two implementations ship with the crate:
//! - [`WgpuBackend`]: renders through wgpu (Vulkan, Metal, DX12 or GL)
//! - [`RecordingBackend`]: keeps an ordered command log, for tests and
//!   headless tooling

pub mod cmd;
mod recording;
pub mod gpu;

use crate::image::ImageFormat;

pub use cmd::{
    BatchDraw, BatchVertex, ClearCmd, GradientFill, ImageDraw, ImageFilter, MeshDraw, MeshPaint,
    RasterPass, TextureRef,
};
pub use recording::{Command, RecordedGradient, RecordingBackend};
pub use gpu::{Gpu, WgpuBackend, WgpuInit};

/// Backend family, chosen when a context is created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BackendKind {
    Wgpu,
    Recording,
}

/// Receiver of draw commands for one surface.
///
/// Calls arrive in issue order. None of them waits for GPU completion.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Whether images of `format` can be drawn through this backend.
    fn supports_format(&self, format: ImageFormat) -> bool {
        format.is_supported()
    }

    /// Surface size in pixels changed.
    fn resize(&mut self, width: u32, height: u32);

    fn begin_frame(&mut self);

    fn clear(&mut self, cmd: &ClearCmd);

    fn draw_mesh(&mut self, cmd: &MeshDraw<'_>);

    fn draw_image(&mut self, cmd: &ImageDraw<'_>);

    fn draw_batch(&mut self, cmd: &BatchDraw<'_>);

    /// Submits the frame's work.
    fn end_frame(&mut self);
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn supports_format(&self, format: ImageFormat) -> bool {
        (**self).supports_format(format)
    }

    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height)
    }

    fn begin_frame(&mut self) {
        (**self).begin_frame()
    }

    fn clear(&mut self, cmd: &ClearCmd) {
        (**self).clear(cmd)
    }

    fn draw_mesh(&mut self, cmd: &MeshDraw<'_>) {
        (**self).draw_mesh(cmd)
    }

    fn draw_image(&mut self, cmd: &ImageDraw<'_>) {
        (**self).draw_image(cmd)
    }

    fn draw_batch(&mut self, cmd: &BatchDraw<'_>) {
        (**self).draw_batch(cmd)
    }

    fn end_frame(&mut self) {
        (**self).end_frame()
    }
}
