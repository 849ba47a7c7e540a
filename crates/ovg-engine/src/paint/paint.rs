use crate::resources::ImageHandle;

use crate::coords::Vec2;

use super::color::{clamp_straight, Color};
use super::gradient::{ColorRamp, GradientShape, LinearGradient, RadialGradient};

/// Kind of paint.
///
/// Colors and gradients render natively; patterns render with the paint
/// color.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PaintType {
    #[default]
    Color,
    LinearGradient,
    RadialGradient,
    Pattern,
}

/// How a pattern image repeats outside its bounds.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TilingMode {
    #[default]
    Fill,
    Pad,
    Repeat,
    Reflect,
}

/// Paint object. Its fill or stroke role is chosen when it is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub paint_type: PaintType,
    color: [f32; 4],
    pub linear: LinearGradient,
    pub radial: RadialGradient,
    pub ramp: ColorRamp,
    pub tiling: TilingMode,
    pub pattern: Option<ImageHandle>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            paint_type: PaintType::Color,
            color: [0.0, 0.0, 0.0, 1.0],
            linear: LinearGradient::default(),
            radial: RadialGradient::default(),
            ramp: ColorRamp::default(),
            tiling: TilingMode::Fill,
            pattern: None,
        }
    }
}

impl Paint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Straight RGBA color.
    #[inline]
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Sets the straight RGBA color; channels are clamped to [0, 1].
    #[inline]
    pub fn set_color(&mut self, rgba: [f32; 4]) {
        self.color = clamp_straight(rgba);
    }

    /// Flat color standing in for this paint where a single color is
    /// needed (image tinting, patterns). Gradients use the ramp start.
    pub fn render_color(&self) -> Color {
        match self.paint_type {
            PaintType::Color | PaintType::Pattern => Color::from_straight_array(self.color),
            PaintType::LinearGradient | PaintType::RadialGradient => self.ramp.color_at(0.0),
        }
    }

    /// Gradient geometry for gradient paints.
    pub fn gradient(&self) -> Option<GradientShape> {
        match self.paint_type {
            PaintType::LinearGradient => Some(GradientShape::Linear(self.linear)),
            PaintType::RadialGradient => Some(GradientShape::Radial(self.radial)),
            PaintType::Color | PaintType::Pattern => None,
        }
    }

    /// Premultiplied color at paint-space point `p`.
    pub fn color_at(&self, p: Vec2) -> Color {
        match self.gradient() {
            Some(shape) => self.ramp.sample(shape.parameter(p)),
            None => self.render_color(),
        }
    }

    #[inline]
    pub fn renders_natively(&self) -> bool {
        self.paint_type != PaintType::Pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_opaque_black_color() {
        let p = Paint::new();
        assert_eq!(p.paint_type, PaintType::Color);
        assert_eq!(p.color(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(p.render_color(), Color::from_premul(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn set_color_clamps() {
        let mut p = Paint::new();
        p.set_color([1.5, -0.2, 0.5, 2.0]);
        assert_eq!(p.color(), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn gradient_flat_color_is_the_ramp_start() {
        let mut p = Paint::new();
        p.set_color([0.0, 0.0, 1.0, 1.0]);
        p.paint_type = PaintType::LinearGradient;
        assert_eq!(p.render_color(), Color::from_premul(0.0, 0.0, 0.0, 1.0));

        p.ramp.set_stops(&[0.0, 1.0, 0.0, 0.0, 0.5]).unwrap();
        assert_eq!(p.render_color(), Color::from_premul(0.5, 0.0, 0.0, 0.5));
        assert!(p.renders_natively());
    }

    #[test]
    fn linear_gradient_colors_follow_the_axis() {
        let mut p = Paint::new();
        p.paint_type = PaintType::LinearGradient;
        p.linear = LinearGradient::from_array([0.0, 0.0, 100.0, 0.0]);
        p.ramp
            .set_stops(&[0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(p.color_at(Vec2::new(-50.0, 3.0)), Color::from_premul(1.0, 0.0, 0.0, 1.0));
        assert_eq!(p.color_at(Vec2::new(150.0, 3.0)), Color::from_premul(0.0, 0.0, 1.0, 1.0));
        let mid = p.color_at(Vec2::new(50.0, 0.0));
        assert!((mid.r - 0.5).abs() < 1e-4 && (mid.b - 0.5).abs() < 1e-4);
    }

    #[test]
    fn pattern_paint_is_flat() {
        let mut p = Paint::new();
        p.set_color([0.0, 1.0, 0.0, 1.0]);
        p.paint_type = PaintType::Pattern;
        assert!(p.gradient().is_none());
        assert!(!p.renders_natively());
        assert_eq!(p.color_at(Vec2::new(3.0, 4.0)), Color::from_premul(0.0, 1.0, 0.0, 1.0));
    }
}
