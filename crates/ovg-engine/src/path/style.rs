/// Interior test used by fill tessellation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FillRule {
    EvenOdd,
    #[default]
    NonZero,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum CapStyle {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum JoinStyle {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Stroke parameters that shape the outline geometry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub cap: CapStyle,
    pub join: JoinStyle,
    pub miter_limit: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: CapStyle::Butt,
            join: JoinStyle::Miter,
            miter_limit: 4.0,
        }
    }
}

impl StrokeStyle {
    /// A stroke with non-positive or non-finite width produces no geometry.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.width.is_finite() && self.width > 0.0
    }
}
