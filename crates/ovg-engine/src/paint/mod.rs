//! Paint store types.
//!
//! Scope:
//! - color representation (premultiplied for backends, straight in paints)
//! - paint objects (color, gradients and stored pattern parameters)
//! - color ramp evaluation with pad, repeat and reflect spread
//! - the fill/stroke mode mask used when binding paints

pub mod color;
pub mod gradient;
mod paint;

use bitflags::bitflags;

use crate::error::{VgError, VgResult};

pub use color::Color;
pub use gradient::{
    ColorRamp, ColorStop, GradientShape, LinearGradient, RadialGradient, SpreadMode, RAMP_WIDTH,
};
pub use paint::{Paint, PaintType, TilingMode};

bitflags! {
    /// Which path parts a paint is bound to or drawn with.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct PaintMode: u32 {
        const STROKE = 1 << 0;
        const FILL   = 1 << 1;
    }
}

impl PaintMode {
    /// Validates raw mode bits; empty or unknown bits are rejected.
    pub fn from_raw(bits: u32) -> VgResult<Self> {
        match Self::from_bits(bits) {
            Some(mode) if !mode.is_empty() => Ok(mode),
            _ => Err(VgError::IllegalArgument("paint mode must be FILL and/or STROKE")),
        }
    }
}
