use crate::coords::Rect;
use crate::image::{ImageFormat, PixelRect};
use crate::math::{Mat3, Mat4};
use crate::paint::{Color, GradientShape, SpreadMode};
use crate::resources::BufferId;

use super::cmd::{BatchDraw, ClearCmd, ImageDraw, ImageFilter, MeshDraw, MeshPaint, RasterPass};
use super::{Backend, BackendKind};

/// Gradient of a recorded mesh draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedGradient {
    pub shape: GradientShape,
    pub spread: SpreadMode,
    pub user_to_paint: Mat3,
    pub ramp: Vec<[u8; 4]>,
}

/// One recorded backend call, with the data a test needs to inspect it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Resize {
        width: u32,
        height: u32,
    },
    BeginFrame,
    Clear(ClearCmd),
    Mesh {
        pass: RasterPass,
        vertex_count: usize,
        index_count: usize,
        transform: Mat3,
        projection: Mat4,
        /// Solid color, or the ramp start of a gradient.
        color: Color,
        gradient: Option<RecordedGradient>,
        /// Vertex bounds after `transform`.
        surface_bounds: Option<Rect>,
    },
    Image {
        buffer: BufferId,
        version: u64,
        region: PixelRect,
        transform: Mat3,
        projection: Mat4,
        tint: Color,
        filter: ImageFilter,
    },
    Batch {
        vertex_count: usize,
        index_count: usize,
        projection: Mat4,
    },
    EndFrame,
}

/// Backend that rasterizes nothing and logs every call in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    frames: usize,
    unsupported: Vec<ImageFormat>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that refuses to draw images of the given formats.
    pub fn without_formats(formats: &[ImageFormat]) -> Self {
        Self {
            unsupported: formats.to_vec(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of completed frames.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Passes of the recorded mesh draws, in issue order.
    pub fn mesh_passes(&self) -> Vec<RasterPass> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Mesh { pass, .. } => Some(*pass),
                _ => None,
            })
            .collect()
    }
}

impl Backend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Recording
    }

    fn supports_format(&self, format: ImageFormat) -> bool {
        format.is_supported() && !self.unsupported.contains(&format)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.commands.push(Command::Resize { width, height });
    }

    fn begin_frame(&mut self) {
        self.commands.push(Command::BeginFrame);
    }

    fn clear(&mut self, cmd: &ClearCmd) {
        self.commands.push(Command::Clear(*cmd));
    }

    fn draw_mesh(&mut self, cmd: &MeshDraw<'_>) {
        let gradient = match cmd.paint {
            MeshPaint::Solid(_) => None,
            MeshPaint::Gradient(g) => Some(RecordedGradient {
                shape: g.shape,
                spread: g.spread,
                user_to_paint: g.user_to_paint,
                ramp: g.ramp.to_vec(),
            }),
        };
        self.commands.push(Command::Mesh {
            pass: cmd.pass,
            vertex_count: cmd.mesh.vertices.len(),
            index_count: cmd.mesh.indices.len(),
            transform: cmd.transform,
            projection: cmd.projection,
            color: cmd.paint.flat_color(),
            gradient,
            surface_bounds: cmd.surface_bounds(),
        });
    }

    fn draw_image(&mut self, cmd: &ImageDraw<'_>) {
        self.commands.push(Command::Image {
            buffer: cmd.texture.buffer,
            version: cmd.texture.version,
            region: cmd.region,
            transform: cmd.transform,
            projection: cmd.projection,
            tint: cmd.tint,
            filter: cmd.filter,
        });
    }

    fn draw_batch(&mut self, cmd: &BatchDraw<'_>) {
        self.commands.push(Command::Batch {
            vertex_count: cmd.vertices.len(),
            index_count: cmd.indices.len(),
            projection: cmd.projection,
        });
    }

    fn end_frame(&mut self) {
        self.commands.push(Command::EndFrame);
        self.frames += 1;
    }
}
