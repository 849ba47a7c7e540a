/// Premultiplied RGBA color, the form handed to backends.
///
/// Invariant:
/// - `rgb` components are multiplied by `a`.
///
/// Paint objects keep straight (non-premultiplied) channels as set through
/// the API and convert with [`Color::from_straight`] at draw time.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_premul(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight channels, clamping each
    /// to `[0, 1]`.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    #[inline]
    pub fn from_straight_array(c: [f32; 4]) -> Self {
        Self::from_straight(c[0], c[1], c[2], c[3])
    }

    /// Returns straight channels; for `a == 0` RGB is 0.
    #[inline]
    pub fn to_straight(self) -> [f32; 4] {
        if self.a <= 0.0 {
            [0.0; 4]
        } else {
            let inv = 1.0 / self.a;
            [self.r * inv, self.g * inv, self.b * inv, self.a]
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Channel-wise linear interpolation from `self` (t = 0) to `other`.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Quantized to 8 bits per channel, rounding to nearest.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        self.to_array()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
    }

    #[inline]
    pub fn from_rgba8(c: [u8; 4]) -> Self {
        let [r, g, b, a] = c.map(|v| v as f32 / 255.0);
        Self { r, g, b, a }
    }

    /// Channel-wise product; premultiplication is preserved.
    #[inline]
    pub fn modulate(self, other: Color) -> Color {
        Color {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
            a: self.a * other.a,
        }
    }
}

/// Clamps straight channels to `[0, 1]`; NaN becomes 0.
pub fn clamp_straight(c: [f32; 4]) -> [f32; 4] {
    c.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_rounds_to_nearest() {
        let c = Color::from_premul(1.0, 0.5, 0.0, 1.0);
        assert_eq!(c.to_rgba8(), [255, 128, 0, 255]);
        assert_eq!(Color::from_rgba8([255, 0, 0, 255]), Color::from_premul(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn lerp_hits_both_ends() {
        let a = Color::transparent();
        let b = Color::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5).a, 0.5);
    }

    #[test]
    fn straight_round_trip() {
        let c = Color::from_straight(1.0, 0.5, 0.0, 0.5);
        assert_eq!(c, Color::from_premul(0.5, 0.25, 0.0, 0.5));
        assert_eq!(c.to_straight(), [1.0, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn fully_transparent_has_no_rgb() {
        assert_eq!(Color::from_straight(1.0, 1.0, 1.0, 0.0).to_straight(), [0.0; 4]);
    }

    #[test]
    fn modulate_by_white_is_identity() {
        let c = Color::from_straight(0.2, 0.4, 0.6, 0.8);
        assert_eq!(c.modulate(Color::WHITE), c);
    }

    #[test]
    fn clamp_straight_limits_range() {
        assert_eq!(clamp_straight([-1.0, 2.0, 0.5, f32::NAN]), [0.0, 1.0, 0.5, 0.0]);
    }
}
