use crate::coords::Vec2;
use crate::error::{VgError, VgResult};

use super::color::{clamp_straight, Color};

/// Maximum number of color ramp stops kept per paint.
pub const MAX_COLOR_RAMP_STOPS: usize = 32;

/// Texels in a rasterized color ramp.
pub const RAMP_WIDTH: usize = 256;

/// How far toward the circle edge a radial focal point may sit.
const FOCUS_LIMIT: f32 = 0.99;

/// Black to white, used while a ramp has no stops.
const DEFAULT_STOPS: [ColorStop; 2] = [
    ColorStop::new(0.0, [0.0, 0.0, 0.0, 1.0]),
    ColorStop::new(1.0, [1.0, 1.0, 1.0, 1.0]),
];

/// Gradient spread behavior outside the [0, 1] range.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    #[default]
    Pad,
    /// Repeat the ramp.
    Repeat,
    /// Mirror-repeat the ramp.
    Reflect,
}

impl SpreadMode {
    /// Maps a gradient parameter into [0, 1].
    pub fn apply(self, g: f32) -> f32 {
        let t = match self {
            SpreadMode::Pad => g.clamp(0.0, 1.0),
            SpreadMode::Repeat => g - g.floor(),
            SpreadMode::Reflect => {
                let m = g.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        };
        if t.is_nan() { 0.0 } else { t }
    }
}

/// A single ramp stop with a straight-alpha color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: [f32; 4],
}

impl ColorStop {
    #[inline]
    pub const fn new(offset: f32, color: [f32; 4]) -> Self {
        Self { offset, color }
    }
}

/// Color ramp shared by the gradient paint types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorRamp {
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMode,
    pub premultiplied: bool,
}

impl ColorRamp {
    /// Replaces the stops from a flat `[offset, r, g, b, a]*` array.
    ///
    /// Stops with an offset outside [0, 1] or below the previous offset are
    /// dropped; channels are clamped. At most [`MAX_COLOR_RAMP_STOPS`] are kept.
    pub fn set_stops(&mut self, values: &[f32]) -> VgResult<()> {
        if values.len() % 5 != 0 {
            return Err(VgError::IllegalArgument("color ramp stops come in groups of five"));
        }

        let mut stops: Vec<ColorStop> = Vec::with_capacity(values.len() / 5);
        for chunk in values.chunks_exact(5).take(MAX_COLOR_RAMP_STOPS) {
            let offset = chunk[0];
            if !(0.0..=1.0).contains(&offset) {
                continue;
            }
            if stops.last().is_some_and(|prev| offset < prev.offset) {
                continue;
            }
            let color = clamp_straight([chunk[1], chunk[2], chunk[3], chunk[4]]);
            stops.push(ColorStop::new(offset, color));
        }

        self.stops = stops;
        Ok(())
    }

    /// Stops in use; an empty ramp runs from opaque black to opaque white.
    pub fn effective_stops(&self) -> &[ColorStop] {
        if self.stops.is_empty() {
            &DEFAULT_STOPS
        } else {
            &self.stops
        }
    }

    /// Premultiplied color at ramp offset `t`, which must already be in
    /// [0, 1]. Offsets before the first stop or after the last take that
    /// stop's color.
    pub fn color_at(&self, t: f32) -> Color {
        let stops = self.effective_stops();
        let (first, last) = (stops[0], stops[stops.len() - 1]);
        if t <= first.offset {
            return Color::from_straight_array(first.color);
        }
        if t >= last.offset {
            return Color::from_straight_array(last.color);
        }

        let i = stops.partition_point(|s| s.offset <= t);
        let (s0, s1) = (stops[i - 1], stops[i]);
        let span = s1.offset - s0.offset;
        let f = if span > 0.0 { (t - s0.offset) / span } else { 1.0 };

        if self.premultiplied {
            Color::from_straight_array(s0.color).lerp(Color::from_straight_array(s1.color), f)
        } else {
            let c: [f32; 4] = std::array::from_fn(|k| s0.color[k] + (s1.color[k] - s0.color[k]) * f);
            Color::from_straight_array(c)
        }
    }

    /// Color for gradient parameter `g`, spread applied.
    #[inline]
    pub fn sample(&self, g: f32) -> Color {
        self.color_at(self.spread.apply(g))
    }

    /// Rasterizes offsets 0 to 1 into `width` premultiplied RGBA8 texels.
    pub fn texels(&self, width: usize) -> Vec<[u8; 4]> {
        let last = width.saturating_sub(1).max(1) as f32;
        (0..width)
            .map(|i| self.color_at(i as f32 / last).to_rgba8())
            .collect()
    }
}

/// Linear gradient axis in paint space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
}

impl LinearGradient {
    /// From the OpenVG `{x0, y0, x1, y1}` layout.
    pub fn from_array(v: [f32; 4]) -> Self {
        Self {
            start: Vec2::new(v[0], v[1]),
            end: Vec2::new(v[2], v[3]),
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.start.x, self.start.y, self.end.x, self.end.y]
    }

    /// Projection of `p` onto the axis: 0 at `start`, 1 at `end`.
    /// Coincident end points give 1 everywhere.
    pub fn parameter(&self, p: Vec2) -> f32 {
        let d = self.end - self.start;
        let len2 = d.length_squared();
        if len2 <= 0.0 {
            return 1.0;
        }
        d.dot(p - self.start) / len2
    }
}

/// Radial gradient circle and focal point in paint space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub focus: Vec2,
    pub radius: f32,
}

impl RadialGradient {
    /// From the OpenVG `{cx, cy, fx, fy, r}` layout.
    pub fn from_array(v: [f32; 5]) -> Self {
        Self {
            center: Vec2::new(v[0], v[1]),
            focus: Vec2::new(v[2], v[3]),
            radius: v[4],
        }
    }

    pub fn to_array(self) -> [f32; 5] {
        [self.center.x, self.center.y, self.focus.x, self.focus.y, self.radius]
    }

    /// Focal point pulled just inside the circle when it lies outside.
    pub fn clamped_focus(&self) -> Vec2 {
        let fp = self.focus - self.center;
        let limit = self.radius.max(0.0) * FOCUS_LIMIT;
        let len2 = fp.length_squared();
        if len2 <= limit * limit {
            return self.focus;
        }
        self.center + fp * (limit / len2.sqrt())
    }

    /// 0 at the focal point, 1 on the circle. A non-positive radius gives 1
    /// everywhere.
    pub fn parameter(&self, p: Vec2) -> f32 {
        if self.radius <= 0.0 {
            return 1.0;
        }
        let focus = self.clamped_focus();
        let fp = focus - self.center;
        let d = p - focus;
        let r2 = self.radius * self.radius;
        let den = r2 - fp.length_squared();
        let cross = d.cross(fp);
        let num = d.dot(fp) + (r2 * d.length_squared() - cross * cross).max(0.0).sqrt();
        num / den
    }
}

/// Geometry of a gradient paint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GradientShape {
    Linear(LinearGradient),
    Radial(RadialGradient),
}

impl GradientShape {
    /// Gradient parameter at paint-space point `p`, before spread.
    #[inline]
    pub fn parameter(&self, p: Vec2) -> f32 {
        match self {
            GradientShape::Linear(g) => g.parameter(p),
            GradientShape::Radial(g) => g.parameter(p),
        }
    }
}
