use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::Mat3;
use crate::coords::Vec2;
use crate::error::{VgError, VgResult};

/// 4×4 column-major matrix, laid out the way WGSL `mat4x4<f32>` expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Orthographic projection mapping the box `[l, r] × [b, t] × [-n, -f]`
    /// onto the unit clip cube (OpenGL convention).
    ///
    /// Fails when any pair of planes coincides or a bound is not finite.
    pub fn ortho(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> VgResult<Self> {
        let all_finite = [l, r, b, t, n, f].iter().all(|v| v.is_finite());
        if !all_finite || r == l || t == b || f == n {
            return Err(VgError::IllegalArgument("degenerate orthographic volume"));
        }

        let rl = r - l;
        let tb = t - b;
        let fnr = f - n;
        Ok(Self {
            cols: [
                [2.0 / rl, 0.0, 0.0, 0.0],
                [0.0, 2.0 / tb, 0.0, 0.0],
                [0.0, 0.0, -2.0 / fnr, 0.0],
                [-(r + l) / rl, -(t + b) / tb, -(f + n) / fnr, 1.0],
            ],
        })
    }

    /// Embeds a 2D homogeneous transform, leaving z untouched.
    pub fn from_mat3(m: Mat3) -> Self {
        let m = m.m;
        Self {
            cols: [
                [m[0][0], m[1][0], 0.0, m[2][0]],
                [m[0][1], m[1][1], 0.0, m[2][1]],
                [0.0, 0.0, 1.0, 0.0],
                [m[0][2], m[1][2], 0.0, m[2][2]],
            ],
        }
    }

    /// Clip-space position of a 2D point at z = 0.
    pub fn project(self, p: Vec2) -> [f32; 4] {
        let c = self.cols;
        let mut out = [0.0f32; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * p.x + c[1][i] * p.y + c[3][i];
        }
        out
    }

    pub fn approx_eq(self, other: Mat4, eps: f32) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let a = self.cols;
        let b = rhs.cols;
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in out.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| a[k][r] * b[c][k]).sum();
            }
        }
        Mat4 { cols: out }
    }
}
