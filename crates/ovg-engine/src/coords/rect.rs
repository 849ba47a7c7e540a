use super::Vec2;

/// Axis-aligned rectangle, origin at its minimum corner.
///
/// Used for path bounds, so a degenerate (zero width or height) rectangle is
/// a legal value: the bounds of a horizontal line have zero height.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            origin: min,
            size: max - min,
        }
    }

    /// Smallest rectangle containing every point, or `None` for no points.
    pub fn from_points<I>(points: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Rect::from_min_max(min, max))
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn union(self, other: Rect) -> Rect {
        Rect::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Approximate equality of both corners.
    pub fn approx_eq(self, other: Rect, eps: f32) -> bool {
        let close = |a: f32, b: f32| (a - b).abs() <= eps;
        close(self.origin.x, other.origin.x)
            && close(self.origin.y, other.origin.y)
            && close(self.size.x, other.size.x)
            && close(self.size.y, other.size.y)
    }
}
