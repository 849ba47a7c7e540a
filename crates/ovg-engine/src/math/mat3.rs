use core::ops::Mul;

use crate::coords::Vec2;

/// 3×3 transform acting on column vectors: `p' = M · p`.
///
/// Stored row-major:
///
/// ```text
/// [ sx   shx  tx ]
/// [ shy  sy   ty ]
/// [ w0   w1   w2 ]
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    pub m: [[f32; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat3 {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    #[inline]
    pub const fn from_rows(m: [[f32; 3]; 3]) -> Self {
        Self { m }
    }

    #[inline]
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self {
            m: [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]],
        }
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Counter-clockwise rotation (in a +Y up frame) by `radians`.
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            m: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    #[inline]
    pub const fn shearing(shx: f32, shy: f32) -> Self {
        Self {
            m: [[1.0, shx, 0.0], [shy, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Builds a matrix from the nine-float OpenVG layout
    /// `{ sx, shy, w0, shx, sy, w1, tx, ty, w2 }`.
    pub const fn from_vg_array(v: [f32; 9]) -> Self {
        Self {
            m: [[v[0], v[3], v[6]], [v[1], v[4], v[7]], [v[2], v[5], v[8]]],
        }
    }

    /// Inverse of [`from_vg_array`](Self::from_vg_array).
    pub const fn to_vg_array(self) -> [f32; 9] {
        let m = self.m;
        [
            m[0][0], m[1][0], m[2][0], m[0][1], m[1][1], m[2][1], m[0][2], m[1][2], m[2][2],
        ]
    }

    #[inline]
    pub fn is_affine(self) -> bool {
        self.m[2] == [0.0, 0.0, 1.0]
    }

    /// Returns a copy with the last row replaced by `[0, 0, 1]`.
    #[inline]
    pub fn to_affine(mut self) -> Self {
        self.m[2] = [0.0, 0.0, 1.0];
        self
    }

    pub fn is_finite(self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
    }

    /// Applies the transform to a point, with perspective division when the
    /// matrix is projective.
    pub fn transform_point(self, p: Vec2) -> Vec2 {
        let m = self.m;
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if w == 1.0 || w == 0.0 {
            Vec2::new(x, y)
        } else {
            Vec2::new(x / w, y / w)
        }
    }

    /// Applies only the linear part (no translation); used for relative
    /// offsets and arc radii.
    pub fn transform_vector(self, v: Vec2) -> Vec2 {
        let m = self.m;
        Vec2::new(m[0][0] * v.x + m[0][1] * v.y, m[1][0] * v.x + m[1][1] * v.y)
    }

    pub fn determinant(self) -> f32 {
        let m = self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn inverse(self) -> Option<Mat3> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let m = self.m;
        let inv = 1.0 / det;
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        let out = Mat3::from_rows([
            [cof(1, 2, 1, 2) * inv, -cof(0, 2, 1, 2) * inv, cof(0, 1, 1, 2) * inv],
            [-cof(1, 2, 0, 2) * inv, cof(0, 2, 0, 2) * inv, -cof(0, 1, 0, 2) * inv],
            [cof(1, 2, 0, 1) * inv, -cof(0, 2, 0, 1) * inv, cof(0, 1, 0, 1) * inv],
        ]);
        out.is_finite().then_some(out)
    }

    pub fn approx_eq(self, other: Mat3, eps: f32) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let a = self.m;
        let b = rhs.m;
        let mut out = [[0.0f32; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = a[r][0] * b[0][c] + a[r][1] * b[1][c] + a[r][2] * b[2][c];
            }
        }
        Mat3 { m: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_vec_eq(a: Vec2, b: Vec2) {
        assert!((a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_is_neutral() {
        let t = Mat3::translation(3.0, 4.0) * Mat3::rotation(0.7);
        assert!((Mat3::identity() * t).approx_eq(t, EPS));
        assert!((t * Mat3::identity()).approx_eq(t, EPS));
    }

    #[test]
    fn translate_then_scale_applies_scale_first() {
        // top · op: the last composed operation hits the geometry first.
        let m = Mat3::translation(10.0, 0.0) * Mat3::scaling(2.0, 2.0);
        assert_vec_eq(m.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn rotation_quarter_turn_is_ccw() {
        let m = Mat3::rotation(std::f32::consts::FRAC_PI_2);
        assert_vec_eq(m.transform_point(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn shear_offsets_x_by_y() {
        let m = Mat3::shearing(0.5, 0.0);
        assert_vec_eq(m.transform_point(Vec2::new(0.0, 2.0)), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn vg_array_layout_is_column_major() {
        let m = Mat3::from_vg_array([2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 5.0, 7.0, 1.0]);
        assert_eq!(m.m[0], [2.0, 0.0, 5.0]);
        assert_eq!(m.m[1], [0.0, 3.0, 7.0]);
        assert_eq!(m.to_vg_array(), [2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 5.0, 7.0, 1.0]);
    }

    #[test]
    fn projective_point_is_divided() {
        let m = Mat3::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]]);
        assert!(!m.is_affine());
        assert_vec_eq(m.transform_point(Vec2::new(4.0, 6.0)), Vec2::new(2.0, 3.0));
        assert!(m.to_affine().is_affine());
    }

    #[test]
    fn inverse_undoes_the_transform() {
        let m = Mat3::translation(5.0, -3.0) * Mat3::rotation(0.4) * Mat3::scaling(2.0, 0.5);
        let inv = m.inverse().unwrap();
        assert!((m * inv).approx_eq(Mat3::identity(), 1e-5));
        let p = Vec2::new(7.0, 11.0);
        assert_vec_eq(inv.transform_point(m.transform_point(p)), p);
        assert_eq!(Mat3::scaling(0.0, 1.0).inverse(), None);
    }

    #[test]
    fn vector_ignores_translation() {
        let m = Mat3::translation(100.0, 100.0) * Mat3::scaling(2.0, 3.0);
        assert_vec_eq(m.transform_vector(Vec2::new(1.0, 1.0)), Vec2::new(2.0, 3.0));
    }
}
