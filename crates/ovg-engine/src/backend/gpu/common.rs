//! GPU-side types shared by the color, gradient, image and batch pipelines.

use bytemuck::{Pod, Zeroable};

use crate::backend::cmd::{BatchVertex, GradientFill};
use crate::math::Mat4;
use crate::paint::{GradientShape, SpreadMode};

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── vertex ────────────────────────────────────────────────────────────────

/// Position in user space plus a second coordinate: texture coordinates for
/// images, paint-space position for gradients, zero otherwise.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // uv
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const BATCH_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x4  // premultiplied color
];

pub(super) fn batch_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BatchVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &BATCH_ATTRS,
    }
}

// ── per-draw uniform ──────────────────────────────────────────────────────

/// Uniform block of one draw (112 bytes):
///
///  offset   0  mvp       mat4x4<f32>  user space → clip space
///  offset  64  color     vec4<f32>    premultiplied color or tint
///  offset  80  points    vec4<f32>    linear: start, end; radial: center, focus
///  offset  96  gradient  vec4<f32>    radius, shape, spread, ramp row v
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawUniform {
    pub mvp: Mat4,
    pub color: [f32; 4],
    pub points: [f32; 4],
    pub gradient: [f32; 4],
}

impl DrawUniform {
    pub fn solid(mvp: Mat4, color: [f32; 4]) -> Self {
        Self {
            mvp,
            color,
            points: [0.0; 4],
            gradient: [0.0; 4],
        }
    }

    /// Gradient parameters as the gradient shader reads them; `ramp_v` is
    /// the texture row holding the ramp.
    pub fn gradient(mvp: Mat4, fill: &GradientFill<'_>, ramp_v: f32) -> Self {
        let (points, radius, shape) = match fill.shape {
            GradientShape::Linear(g) => (g.to_array(), 0.0, 0.0),
            GradientShape::Radial(g) => {
                let focus = g.clamped_focus();
                ([g.center.x, g.center.y, focus.x, focus.y], g.radius, 1.0)
            }
        };
        let spread = match fill.spread {
            SpreadMode::Pad => 0.0,
            SpreadMode::Repeat => 1.0,
            SpreadMode::Reflect => 2.0,
        };
        Self {
            mvp,
            color: [1.0; 4],
            points,
            gradient: [radius, shape, spread, ramp_v],
        }
    }
}

pub(super) const DRAW_UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

/// Distance between consecutive uniforms in the dynamic-offset buffer.
pub(super) fn uniform_stride(device: &wgpu::Device) -> u64 {
    let align = device.limits().min_uniform_buffer_offset_alignment.max(1) as u64;
    DRAW_UNIFORM_SIZE.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_wgsl_layout() {
        assert_eq!(DRAW_UNIFORM_SIZE, 112);
        assert_eq!(std::mem::size_of::<Vertex>(), 16);
        assert_eq!(std::mem::size_of::<BatchVertex>(), 24);
    }

    #[test]
    fn gradient_uniform_packs_shape_and_spread() {
        use crate::math::Mat3;
        use crate::paint::RadialGradient;

        let fill = GradientFill {
            shape: GradientShape::Radial(RadialGradient::from_array([1.0, 2.0, 1.0, 2.0, 8.0])),
            spread: SpreadMode::Reflect,
            user_to_paint: Mat3::identity(),
            ramp: &[],
        };
        let u = DrawUniform::gradient(Mat4::identity(), &fill, 0.25);
        assert_eq!(u.points, [1.0, 2.0, 1.0, 2.0]);
        assert_eq!(u.gradient, [8.0, 1.0, 2.0, 0.25]);
    }
}
