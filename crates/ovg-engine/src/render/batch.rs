use crate::backend::{Backend, BatchDraw, BatchVertex};
use crate::context::Context;
use crate::coords::Vec2;
use crate::error::{VgError, VgResult};
use crate::math::Mat3;
use crate::paint::Color;
use crate::path::Mesh;

/// Path draws captured between [`Context::begin_batch`] and
/// [`Context::end_batch`].
///
/// Vertices are stored in surface pixels with their paint color already
/// evaluated, so replaying a batch ignores the matrices and paints in effect
/// at replay time. Only the camera projection applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    vertices: Vec<BatchVertex>,
    indices: Vec<u32>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertices(&self) -> &[BatchVertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles recorded.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle list with indices resolved, three vertices per triangle.
    pub fn triangles(&self) -> Vec<BatchVertex> {
        self.indices
            .iter()
            .map(|&i| self.vertices[i as usize])
            .collect()
    }

    /// Raw bytes of [`Batch::triangles`]: per vertex two `f32` position
    /// components then four `f32` premultiplied color channels, native
    /// endian.
    pub fn dump(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.triangles()).to_vec()
    }

    /// Adds `mesh` transformed to surface space, coloring each vertex by its
    /// user-space position.
    pub(crate) fn push_mesh(&mut self, mesh: &Mesh, transform: Mat3, color: impl Fn(Vec2) -> Color) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(mesh.vertices.iter().map(|&v| {
            let user = Vec2::from(v);
            BatchVertex {
                pos: transform.transform_point(user).to_array(),
                color: color(user).to_array(),
            }
        }));
        self.indices.extend(mesh.indices.iter().map(|&i| i + base));
    }

    /// Appends every triangle of `other`.
    pub fn extend_from(&mut self, other: &Batch) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|&i| i + base));
    }
}

impl<B: Backend> Context<B> {
    /// Starts capturing path draws into a new batch. Until
    /// [`Context::end_batch`], `draw_path` and `draw_batch` add triangles to
    /// the batch instead of drawing; images and clears still draw
    /// immediately.
    pub fn begin_batch(&mut self) -> VgResult<()> {
        let result = self.begin_batch_inner();
        self.record(result)
    }

    fn begin_batch_inner(&mut self) -> VgResult<()> {
        self.ensure_alive()?;
        if self.batch.is_some() {
            return Err(VgError::IllegalArgument("a batch is already open"));
        }
        self.batch = Some(Batch::new());
        log::debug!("batch opened");
        Ok(())
    }

    /// Closes the open batch and hands it to the caller.
    pub fn end_batch(&mut self) -> VgResult<Batch> {
        let result = self.end_batch_inner();
        self.record(result)
    }

    fn end_batch_inner(&mut self) -> VgResult<Batch> {
        self.ensure_alive()?;
        let batch = self
            .batch
            .take()
            .ok_or(VgError::IllegalArgument("no batch is open"))?;
        log::debug!("batch closed: {} triangles", batch.triangle_count());
        Ok(batch)
    }

    #[inline]
    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    /// Draws a finished batch through the current camera projection.
    pub fn draw_batch(&mut self, batch: &Batch) -> VgResult<()> {
        let result = self.draw_batch_inner(batch);
        self.record(result)
    }

    fn draw_batch_inner(&mut self, batch: &Batch) -> VgResult<()> {
        self.ensure_alive()?;
        if let Some(open) = self.batch.as_mut() {
            open.extend_from(batch);
            return Ok(());
        }
        if batch.is_empty() {
            return Ok(());
        }
        self.enter_drawing()?;
        self.backend.draw_batch(&BatchDraw {
            vertices: batch.vertices(),
            indices: batch.indices(),
            projection: self.cameras.current(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, RecordingBackend};
    use crate::math::MatrixMode;
    use crate::paint::{PaintMode, PaintType};
    use crate::path::{vgu, PathDesc};
    use crate::resources::{PathHandle, Resources};

    fn setup() -> (Context<RecordingBackend>, Resources, PathHandle) {
        let ctx = Context::new(200, 100, RecordingBackend::new()).unwrap();
        let mut res = Resources::new();
        let path = res.create_path(PathDesc::default()).unwrap();
        vgu::rect(res.path_mut(path).unwrap(), 0.0, 0.0, 10.0, 10.0).unwrap();
        (ctx, res, path)
    }

    #[test]
    fn path_draws_are_captured_not_drawn() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        res.set_paint_color(paint, [1.0, 0.0, 0.0, 1.0]).unwrap();
        ctx.set_paint(&res, paint, PaintMode::FILL).unwrap();

        ctx.begin_batch().unwrap();
        ctx.translate(50.0, 20.0).unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL).unwrap();
        let batch = ctx.end_batch().unwrap();

        assert!(ctx.backend().commands().is_empty());
        assert!(!batch.is_empty());
        for v in batch.vertices() {
            assert!((50.0..=60.0).contains(&v.pos[0]) && (20.0..=30.0).contains(&v.pos[1]));
            assert_eq!(v.color, [1.0, 0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn replay_sends_one_batch_command() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        ctx.set_paint(&res, paint, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();

        ctx.begin_batch().unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();
        let batch = ctx.end_batch().unwrap();

        ctx.draw_batch(&batch).unwrap();
        ctx.draw_batch(&batch).unwrap();
        let batches: Vec<_> = ctx
            .backend()
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Batch { vertex_count, index_count, .. } => Some((*vertex_count, *index_count)),
                _ => None,
            })
            .collect();
        assert_eq!(batches, vec![(batch.vertices().len(), batch.indices().len()); 2]);
        assert!(ctx.backend().mesh_passes().is_empty());
    }

    #[test]
    fn gradient_colors_are_evaluated_per_vertex() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        res.set_paint_type(paint, PaintType::LinearGradient).unwrap();
        res.set_linear_gradient(paint, [0.0, 0.0, 10.0, 0.0]).unwrap();
        res.set_color_ramp_stops(paint, &[0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0])
            .unwrap();
        ctx.set_paint(&res, paint, PaintMode::FILL).unwrap();

        ctx.begin_batch().unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL).unwrap();
        let batch = ctx.end_batch().unwrap();

        for v in batch.vertices() {
            let expected = if v.pos[0] < 5.0 { [1.0, 0.0, 0.0, 1.0] } else { [0.0, 0.0, 1.0, 1.0] };
            assert_eq!(v.color, expected);
        }
    }

    #[test]
    fn paint_matrix_moves_the_gradient_in_batches() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        res.set_paint_type(paint, PaintType::LinearGradient).unwrap();
        res.set_linear_gradient(paint, [0.0, 0.0, 10.0, 0.0]).unwrap();
        res.set_color_ramp_stops(paint, &[0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0])
            .unwrap();
        ctx.set_paint(&res, paint, PaintMode::FILL).unwrap();
        // Paint space shifted right by 10: every vertex sits before the axis.
        ctx.set_matrix_mode(MatrixMode::FillPaintToUser).unwrap();
        ctx.translate(10.0, 0.0).unwrap();

        ctx.begin_batch().unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL).unwrap();
        let batch = ctx.end_batch().unwrap();
        assert!(batch.vertices().iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn batch_nesting_and_misuse() {
        let (mut ctx, _, _) = setup();
        assert!(matches!(ctx.end_batch(), Err(VgError::IllegalArgument(_))));
        ctx.begin_batch().unwrap();
        assert!(matches!(ctx.begin_batch(), Err(VgError::IllegalArgument(_))));
        assert!(ctx.is_batching());
        ctx.end_batch().unwrap();
        assert!(!ctx.is_batching());
    }

    #[test]
    fn drawing_a_batch_while_batching_appends_it() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        ctx.set_paint(&res, paint, PaintMode::FILL).unwrap();
        ctx.begin_batch().unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL).unwrap();
        let inner = ctx.end_batch().unwrap();

        ctx.begin_batch().unwrap();
        ctx.draw_batch(&inner).unwrap();
        ctx.draw_batch(&inner).unwrap();
        let outer = ctx.end_batch().unwrap();
        assert_eq!(outer.triangle_count(), inner.triangle_count() * 2);
        assert_eq!(outer.indices()[inner.indices().len()], inner.indices()[0] + inner.vertices().len() as u32);
        assert!(ctx.backend().commands().is_empty());
    }

    #[test]
    fn dump_expands_triangles() {
        let mut batch = Batch::new();
        let mesh = Mesh {
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            indices: vec![0, 1, 2, 0, 2, 3],
        };
        batch.push_mesh(&mesh, Mat3::scaling(2.0, 2.0), |_| Color::WHITE);
        let tris = batch.triangles();
        assert_eq!(tris.len(), 6);
        assert_eq!(tris[2].pos, [2.0, 2.0]);
        assert_eq!(batch.dump().len(), 6 * std::mem::size_of::<BatchVertex>());
    }
}
