//! Backend-agnostic draw commands.
//!
//! Commands borrow their geometry and pixels from the retained stores; a
//! backend copies whatever it needs before returning.

use bytemuck::{Pod, Zeroable};

use crate::coords::Rect;
use crate::image::PixelRect;
use crate::math::{Mat3, Mat4};
use crate::paint::{Color, GradientShape, SpreadMode};
use crate::path::Mesh;
use crate::resources::BufferId;

/// Which part of a path a mesh rasterizes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RasterPass {
    Fill,
    Stroke,
}

/// Texture sampling for image draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ImageFilter {
    Nearest,
    Linear,
}

/// Gradient evaluated per fragment from paint-space coordinates.
#[derive(Debug, Copy, Clone)]
pub struct GradientFill<'a> {
    pub shape: GradientShape,
    pub spread: SpreadMode,
    /// Path user space to paint space.
    pub user_to_paint: Mat3,
    /// Premultiplied RGBA8 texels spanning ramp offsets 0 to 1.
    pub ramp: &'a [[u8; 4]],
}

/// What a mesh is filled with.
#[derive(Debug, Copy, Clone)]
pub enum MeshPaint<'a> {
    Solid(Color),
    Gradient(GradientFill<'a>),
}

impl MeshPaint<'_> {
    /// Solid color, or the ramp start for gradients.
    pub fn flat_color(&self) -> Color {
        match self {
            MeshPaint::Solid(color) => *color,
            MeshPaint::Gradient(g) => g
                .ramp
                .first()
                .map_or(Color::transparent(), |&t| Color::from_rgba8(t)),
        }
    }
}

/// Triangle mesh in path user space.
#[derive(Debug, Copy, Clone)]
pub struct MeshDraw<'a> {
    pub pass: RasterPass,
    pub mesh: &'a Mesh,
    /// Path user space to surface pixels.
    pub transform: Mat3,
    /// Surface pixels to clip space.
    pub projection: Mat4,
    pub paint: MeshPaint<'a>,
}

impl MeshDraw<'_> {
    /// Combined user-to-clip matrix.
    #[inline]
    pub fn clip_matrix(&self) -> Mat4 {
        self.projection * Mat4::from_mat3(self.transform)
    }

    /// Bounds of the mesh after `transform`, in surface pixels.
    pub fn surface_bounds(&self) -> Option<Rect> {
        Rect::from_points(
            self.mesh
                .vertices
                .iter()
                .map(|&v| self.transform.transform_point(v.into())),
        )
    }
}

/// Pixels of a root image buffer. `version` changes whenever they do.
#[derive(Debug, Copy, Clone)]
pub struct TextureRef<'a> {
    pub buffer: BufferId,
    pub version: u64,
    pub width: u32,
    pub height: u32,
    /// Straight RGBA8 texels, `width * 4` bytes per row.
    pub texels: &'a [u8],
}

/// Image region drawn as a `region.width × region.height` quad in image
/// user space, texel row 0 at `y = 0`.
#[derive(Debug, Copy, Clone)]
pub struct ImageDraw<'a> {
    pub texture: TextureRef<'a>,
    /// Sub-rectangle of the texture (child images cover part of it).
    pub region: PixelRect,
    pub transform: Mat3,
    pub projection: Mat4,
    /// Premultiplied color the sampled texels are multiplied by.
    pub tint: Color,
    pub filter: ImageFilter,
}

impl ImageDraw<'_> {
    #[inline]
    pub fn clip_matrix(&self) -> Mat4 {
        self.projection * Mat4::from_mat3(self.transform)
    }

    /// Quad corners in user space paired with texture coordinates.
    pub fn quad(&self) -> [([f32; 2], [f32; 2]); 4] {
        let (w, h) = (self.region.width as f32, self.region.height as f32);
        let (tw, th) = (self.texture.width.max(1) as f32, self.texture.height.max(1) as f32);
        let u0 = self.region.x as f32 / tw;
        let v0 = self.region.y as f32 / th;
        let u1 = (self.region.x + self.region.width) as f32 / tw;
        let v1 = (self.region.y + self.region.height) as f32 / th;
        [
            ([0.0, 0.0], [u0, v0]),
            ([w, 0.0], [u1, v0]),
            ([w, h], [u1, v1]),
            ([0.0, h], [u0, v1]),
        ]
    }
}

/// Vertex of a recorded batch: surface-space position with a premultiplied
/// color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BatchVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

/// Pre-transformed, pre-colored triangles drawn in one call.
#[derive(Debug, Copy, Clone)]
pub struct BatchDraw<'a> {
    pub vertices: &'a [BatchVertex],
    pub indices: &'a [u32],
    /// Surface pixels to clip space.
    pub projection: Mat4,
}

/// Fills a surface rectangle (pixels, origin bottom-left) with a color,
/// replacing what is there.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearCmd {
    pub rect: PixelRect,
    pub color: Color,
}
