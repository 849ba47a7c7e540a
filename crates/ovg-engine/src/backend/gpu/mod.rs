//! wgpu rasterization backend.
//!
//! Convention:
//! - meshes arrive in user space with a user → surface transform and a
//!   surface → clip projection; both are folded into one matrix per draw
//! - surface pixels have their origin at the bottom-left, +Y up
//! - colors are premultiplied; image texels are straight and premultiplied
//!   in the fragment shader
//! - gradients are evaluated per fragment from paint-space coordinates and
//!   sample a shared ramp atlas
//! - batch vertices are already in surface space and only get the projection
//!
//! Draws are staged and submitted at the end of a frame. A frame is split
//! into several submits when an image already drawn gets new pixels, or when
//! the ramp atlas runs out of rows.

mod backend;
mod common;
mod device;
mod pipeline;
mod ramps;
mod textures;

pub use backend::WgpuBackend;
pub use device::{Gpu, WgpuInit};
