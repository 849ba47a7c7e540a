//! Coordinate types shared by paths, bounds and the draw pipeline.
//!
//! Surface space follows OpenVG: origin bottom-left, +X right, +Y up.
//! The default camera maps it to clip space; nothing here assumes a
//! particular orientation.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
