//! Transform math: 2D user transforms, the per-mode matrix stacks and the
//! 4×4 projections used by the camera stack.

mod mat3;
mod mat4;
mod stack;

pub use mat3::Mat3;
pub use mat4::Mat4;
pub use stack::{MatrixMode, MatrixStack, MatrixStacks};
