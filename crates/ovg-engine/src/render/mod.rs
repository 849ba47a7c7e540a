//! Draw pipeline.
//!
//! Turns retained paths and images plus the context's matrices, camera and
//! paint bindings into [`crate::backend`] commands:
//! - `draw_path`: fill mesh then stroke mesh, each with its paint (a solid
//!   color or a gradient evaluated per fragment)
//! - `draw_image`: one textured quad over the image's region of its buffer
//! - `clear`: a surface rectangle filled with the clear color
//! - `draw_batch`: triangles captured earlier by `begin_batch`/`end_batch`
//!
//! Path geometry is tessellated in user space; the user → surface matrix
//! and the camera projection travel with each command.

mod batch;
mod draw;
mod quality;

pub use batch::Batch;
pub use quality::{effective_quality, sampling_filter};
