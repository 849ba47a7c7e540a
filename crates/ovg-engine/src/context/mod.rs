//! Per-surface drawing state.
//!
//! A [`Context`] holds everything OpenVG keeps per context: the four matrix
//! stacks and the selected mode, weak fill/stroke paint bindings, scalar
//! parameters, the orthographic camera stack and the lifecycle state. Draw
//! calls live in [`crate::render`].

mod camera;
mod ctx;
mod params;
mod state;

pub use camera::CameraStack;
pub use ctx::Context;
pub use params::{ContextConfig, ImageMode, RenderingQuality, DEFAULT_TOLERANCE};
pub use state::ContextState;

pub(crate) use ctx::check_modes;
