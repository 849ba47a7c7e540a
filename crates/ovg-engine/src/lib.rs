//! Retained-mode 2D vector engine with OpenVG semantics.
//!
//! The application owns a [`Resources`] store of paths, paints and images
//! and one [`Context`] per surface. A frame looks like:
//!
//! ```no_run
//! use ovg_engine::{Context, PaintMode, PathDesc, RecordingBackend, Resources, vgu};
//!
//! # fn main() -> Result<(), ovg_engine::VgError> {
//! let mut res = Resources::new();
//! let mut ctx = Context::new(800, 600, RecordingBackend::new())?;
//!
//! let path = res.create_path(PathDesc::default())?;
//! vgu::rect(res.path_mut(path)?, 0.0, 0.0, 200.0, 200.0)?;
//! let paint = res.create_paint();
//! res.set_paint_color(paint, [1.0, 0.5, 0.0, 1.0])?;
//!
//! ctx.begin_frame()?;
//! ctx.set_paint(&res, paint, PaintMode::FILL | PaintMode::STROKE)?;
//! ctx.translate(400.0, 300.0)?;
//! ctx.draw_path(&mut res, path, PaintMode::FILL | PaintMode::STROKE)?;
//! ctx.end_frame()?;
//! # Ok(())
//! # }
//! ```
//!
//! Path draws can also be captured with [`Context::begin_batch`] into a
//! [`Batch`] of pre-colored triangles and replayed with
//! [`Context::draw_batch`].
//!
//! Rasterization goes through a [`Backend`]: [`WgpuBackend`] on the GPU or
//! [`RecordingBackend`] for tests and headless tools.

pub mod backend;
pub mod context;
pub mod coords;
pub mod error;
pub mod image;
pub mod logging;
pub mod math;
pub mod paint;
pub mod path;
pub mod render;
pub mod resources;

pub use backend::{Backend, BackendKind, Gpu, RecordingBackend, WgpuBackend, WgpuInit};
pub use context::{CameraStack, Context, ContextConfig, ContextState, ImageMode, RenderingQuality};
pub use coords::{Rect, Vec2};
pub use error::{VgError, VgResult};
pub use image::{ImageFormat, ImageQuality};
pub use math::{Mat3, Mat4, MatrixMode};
pub use paint::{Color, PaintMode, PaintType, SpreadMode, TilingMode};
pub use render::Batch;
pub use path::{vgu, CapStyle, FillRule, JoinStyle, PathCapabilities, PathDatatype, PathDesc, Segment, SegmentCommand};
pub use resources::{ImageHandle, PaintHandle, PathHandle, Resources};
