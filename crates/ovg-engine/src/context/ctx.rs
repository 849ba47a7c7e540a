use crate::backend::{Backend, BackendKind};
use crate::coords::Rect;
use crate::error::{VgError, VgResult};
use crate::math::{Mat3, Mat4, MatrixMode, MatrixStacks};
use crate::paint::PaintMode;
use crate::path::{CapStyle, FillRule, JoinStyle};
use crate::render::Batch;
use crate::resources::{ImageHandle, PaintHandle, PathHandle, Resources};

use super::camera::CameraStack;
use super::params::{ContextConfig, ImageMode, RenderingQuality};
use super::state::ContextState;

/// Drawing state for one surface: matrix stacks, paint bindings, scalar
/// parameters, the camera stack and the backend commands are sent to.
///
/// Retained objects live in a separate [`Resources`] passed to the calls
/// that need them, so several contexts can share one store.
pub struct Context<B: Backend = Box<dyn Backend>> {
    pub(crate) backend: B,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) state: ContextState,
    pub(crate) matrices: MatrixStacks,
    pub(crate) cameras: CameraStack,
    pub(crate) fill_paint: Option<PaintHandle>,
    pub(crate) stroke_paint: Option<PaintHandle>,
    pub(crate) config: ContextConfig,
    last_error: Option<VgError>,
    /// One-time debug note for paints drawn with their flat fallback color.
    pub(crate) warned_paint_fallback: bool,
    /// Open batch; path draws land here instead of the backend.
    pub(crate) batch: Option<Batch>,
}

impl<B: Backend> Context<B> {
    pub fn new(width: u32, height: u32, backend: B) -> VgResult<Self> {
        Self::with_config(width, height, backend, ContextConfig::default())
    }

    pub fn with_config(width: u32, height: u32, backend: B, config: ContextConfig) -> VgResult<Self> {
        check_surface_size(width, height)?;
        check_config(&config)?;
        let cameras = CameraStack::new(width, height)?;
        log::info!(
            "context created: {width}x{height}, {:?} backend",
            backend.kind()
        );
        Ok(Self {
            backend,
            width,
            height,
            state: ContextState::Created,
            matrices: MatrixStacks::default(),
            cameras,
            fill_paint: None,
            stroke_paint: None,
            config,
            last_error: None,
            warned_paint_fallback: false,
            batch: None,
        })
    }

    // ── accessors ────────────────────────────────────────────────────────

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    #[inline]
    pub fn state(&self) -> ContextState {
        self.state
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Most recent failure reported by any call on this context.
    #[inline]
    pub fn last_error(&self) -> Option<VgError> {
        self.last_error
    }

    /// Returns and clears the recorded error.
    pub fn take_error(&mut self) -> Option<VgError> {
        self.last_error.take()
    }

    /// Records a failed result before handing it back to the caller.
    pub(crate) fn record<T>(&mut self, result: VgResult<T>) -> VgResult<T> {
        if let Err(err) = &result {
            log::warn!("{err}");
            self.last_error = Some(*err);
        }
        result
    }

    pub(crate) fn ensure_alive(&self) -> VgResult<()> {
        if self.state.is_alive() {
            Ok(())
        } else {
            Err(VgError::ContextDestroyed)
        }
    }

    /// Entry check for setup calls.
    fn configure(&mut self) -> VgResult<()> {
        self.ensure_alive()?;
        if self.state == ContextState::Created {
            self.state = ContextState::Configuring;
        }
        Ok(())
    }

    /// Entry check for draw calls; opens a frame when none is open.
    pub(crate) fn enter_drawing(&mut self) -> VgResult<()> {
        self.ensure_alive()?;
        if !self.state.in_frame() {
            log::debug!("draw outside begin_frame, beginning a frame");
            self.backend.begin_frame();
            self.state = ContextState::Drawing;
        }
        Ok(())
    }

    /// Ends the context. Every later call fails with `ContextDestroyed`.
    pub fn destroy(&mut self) -> VgResult<()> {
        let result = self.ensure_alive();
        self.record(result)?;
        if self.state.in_frame() {
            self.backend.end_frame();
        }
        self.cameras.reset();
        self.fill_paint = None;
        self.stroke_paint = None;
        if self.batch.take().is_some() {
            log::debug!("open batch dropped with its context");
        }
        self.state = ContextState::Destroyed;
        log::debug!("context destroyed");
        Ok(())
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) -> VgResult<()> {
        let result = self.configure().and_then(|_| {
            check_surface_size(width, height)?;
            self.cameras.resize(width, height)
        });
        self.record(result)?;
        self.width = width;
        self.height = height;
        self.backend.resize(width, height);
        log::debug!("surface resized to {width}x{height}");
        Ok(())
    }

    // ── frames and cameras ───────────────────────────────────────────────

    pub fn begin_frame(&mut self) -> VgResult<()> {
        let result = self.ensure_alive();
        self.record(result)?;
        if self.state.in_frame() {
            log::debug!("begin_frame with a frame already open");
            return Ok(());
        }
        self.backend.begin_frame();
        self.state = ContextState::Drawing;
        Ok(())
    }

    /// Submits the frame. Cameras left pushed are dropped with a warning.
    pub fn end_frame(&mut self) -> VgResult<()> {
        let result = self.ensure_alive();
        self.record(result)?;
        if self.cameras.depth() > 0 {
            log::warn!(
                "end_frame with {} camera(s) still pushed, resetting",
                self.cameras.depth()
            );
            self.cameras.reset();
        }
        if self.state.in_frame() {
            self.backend.end_frame();
        }
        self.state = ContextState::Configuring;
        Ok(())
    }

    /// Makes an orthographic projection current, saving the previous one.
    pub fn push_ortho_camera(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> VgResult<()> {
        let result = self
            .configure()
            .and_then(|_| self.cameras.push_ortho(left, right, bottom, top, near, far));
        self.record(result)
    }

    pub fn pop_ortho_camera(&mut self) -> VgResult<()> {
        let result = self.configure().and_then(|_| self.cameras.pop());
        if result == Err(VgError::StackUnderflow) {
            log::error!("pop_ortho_camera without a pushed camera");
        }
        self.record(result)
    }

    /// Surface → clip projection used by draws.
    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.cameras.current()
    }

    #[inline]
    pub fn camera_depth(&self) -> usize {
        self.cameras.depth()
    }

    // ── matrices ─────────────────────────────────────────────────────────

    pub fn set_matrix_mode(&mut self, mode: MatrixMode) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.matrices.set_mode(mode);
        Ok(())
    }

    #[inline]
    pub fn matrix_mode(&self) -> MatrixMode {
        self.matrices.mode()
    }

    /// Top of the selected stack.
    #[inline]
    pub fn current_matrix(&self) -> Mat3 {
        self.matrices.current()
    }

    /// Top of the stack for `mode`.
    #[inline]
    pub fn matrix_for(&self, mode: MatrixMode) -> Mat3 {
        self.matrices.top(mode)
    }

    /// Saved entries on the selected stack.
    #[inline]
    pub fn matrix_depth(&self) -> usize {
        self.matrices.stack(self.matrices.mode()).depth()
    }

    pub fn push_matrix(&mut self) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.matrices.push();
        Ok(())
    }

    pub fn pop_matrix(&mut self) -> VgResult<()> {
        let result = self.configure().and_then(|_| self.matrices.pop());
        self.record(result)
    }

    pub fn load_identity(&mut self) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.matrices.load_identity();
        Ok(())
    }

    /// Replaces the selected matrix. Affine modes drop the projective row.
    pub fn load_matrix(&mut self, m: Mat3) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_matrix(m));
        self.record(result)?;
        self.matrices.load(m);
        Ok(())
    }

    /// Post-multiplies the selected matrix by `m`.
    pub fn multiply_matrix(&mut self, m: Mat3) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_matrix(m));
        self.record(result)?;
        self.matrices.multiply(m);
        Ok(())
    }

    pub fn translate(&mut self, dx: f32, dy: f32) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_finite(&[dx, dy]));
        self.record(result)?;
        self.matrices.translate(dx, dy);
        Ok(())
    }

    pub fn scale(&mut self, sx: f32, sy: f32) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_finite(&[sx, sy]));
        self.record(result)?;
        self.matrices.scale(sx, sy);
        Ok(())
    }

    pub fn shear(&mut self, shx: f32, shy: f32) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_finite(&[shx, shy]));
        self.record(result)?;
        self.matrices.shear(shx, shy);
        Ok(())
    }

    /// Counter-clockwise rotation in degrees.
    pub fn rotate(&mut self, degrees: f32) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_finite(&[degrees]));
        self.record(result)?;
        self.matrices.rotate(degrees);
        Ok(())
    }

    // ── paint bindings ───────────────────────────────────────────────────

    /// Binds `paint` for every mode in `modes`. The paint itself is not
    /// touched; the binding is a weak reference.
    pub fn set_paint(&mut self, resources: &Resources, paint: PaintHandle, modes: PaintMode) -> VgResult<()> {
        let result = self.configure().and_then(|_| {
            check_modes(modes)?;
            resources.paint(paint).map(|_| ())
        });
        self.record(result)?;
        if modes.contains(PaintMode::FILL) {
            self.fill_paint = Some(paint);
        }
        if modes.contains(PaintMode::STROKE) {
            self.stroke_paint = Some(paint);
        }
        Ok(())
    }

    /// Unbinds the paints for `modes`.
    pub fn clear_paint(&mut self, modes: PaintMode) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_modes(modes));
        self.record(result)?;
        if modes.contains(PaintMode::FILL) {
            self.fill_paint = None;
        }
        if modes.contains(PaintMode::STROKE) {
            self.stroke_paint = None;
        }
        Ok(())
    }

    /// Paint bound for a single mode.
    pub fn paint(&self, mode: PaintMode) -> VgResult<Option<PaintHandle>> {
        self.ensure_alive()?;
        if mode == PaintMode::FILL {
            Ok(self.fill_paint)
        } else if mode == PaintMode::STROKE {
            Ok(self.stroke_paint)
        } else {
            Err(VgError::IllegalArgument("paint query needs exactly one mode"))
        }
    }

    // ── parameters ───────────────────────────────────────────────────────

    pub fn set_stroke_width(&mut self, width: f32) -> VgResult<()> {
        let result = self.configure().and_then(|_| {
            if width.is_finite() && width >= 0.0 {
                Ok(())
            } else {
                Err(VgError::IllegalArgument("stroke width must be finite and non-negative"))
            }
        });
        self.record(result)?;
        self.config.stroke.width = width;
        Ok(())
    }

    #[inline]
    pub fn stroke_width(&self) -> f32 {
        self.config.stroke.width
    }

    pub fn set_stroke_cap(&mut self, cap: CapStyle) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.config.stroke.cap = cap;
        Ok(())
    }

    pub fn set_stroke_join(&mut self, join: JoinStyle) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.config.stroke.join = join;
        Ok(())
    }

    /// Limits below 1 are raised to 1.
    pub fn set_miter_limit(&mut self, limit: f32) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_finite(&[limit]));
        self.record(result)?;
        self.config.stroke.miter_limit = limit.max(1.0);
        Ok(())
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.config.fill_rule = rule;
        Ok(())
    }

    pub fn set_rendering_quality(&mut self, quality: RenderingQuality) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.config.rendering_quality = quality;
        Ok(())
    }

    pub fn set_image_mode(&mut self, mode: ImageMode) -> VgResult<()> {
        let result = self.configure();
        self.record(result)?;
        self.config.image_mode = mode;
        Ok(())
    }

    /// Flattening tolerance in surface pixels; must be positive.
    pub fn set_tessellation_tolerance(&mut self, tolerance: f32) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_tolerance(tolerance));
        self.record(result)?;
        self.config.tolerance = tolerance;
        Ok(())
    }

    /// Straight RGBA used by `clear` and `clear_image`; channels are clamped.
    pub fn set_clear_color(&mut self, rgba: [f32; 4]) -> VgResult<()> {
        let result = self.configure().and_then(|_| check_finite(&rgba));
        self.record(result)?;
        self.config.clear_color = rgba.map(|c| c.clamp(0.0, 1.0));
        Ok(())
    }

    // ── path and image helpers bound to context state ───────────────────

    /// Appends `src` transformed by the current path-user-to-surface matrix
    /// to `dst`.
    pub fn transform_path(&mut self, resources: &mut Resources, dst: PathHandle, src: PathHandle) -> VgResult<()> {
        let m = self.matrices.top(MatrixMode::PathUserToSurface);
        let result = self
            .ensure_alive()
            .and_then(|_| resources.transform_path(dst, src, m));
        self.record(result)
    }

    /// User-space bounds at the context's tolerance; `None` for an empty path.
    pub fn path_bounds(&mut self, resources: &mut Resources, path: PathHandle) -> VgResult<Option<Rect>> {
        let tolerance = self.config.tolerance;
        let result = self
            .ensure_alive()
            .and_then(|_| resources.path_bounds(path, tolerance));
        self.record(result)
    }

    /// Surface-space bounds under the current path-user-to-surface matrix.
    pub fn path_transformed_bounds(
        &mut self,
        resources: &mut Resources,
        path: PathHandle,
    ) -> VgResult<Option<Rect>> {
        let m = self.matrices.top(MatrixMode::PathUserToSurface);
        let tolerance = self.config.tolerance;
        let result = self
            .ensure_alive()
            .and_then(|_| resources.path_transformed_bounds(path, m, tolerance));
        self.record(result)
    }

    /// Fills an image region with the clear color.
    pub fn clear_image(
        &mut self,
        resources: &mut Resources,
        image: ImageHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> VgResult<()> {
        let rgba = self.config.clear_color;
        let result = self
            .ensure_alive()
            .and_then(|_| resources.clear_image(image, x, y, width, height, rgba));
        self.record(result)
    }
}

fn check_surface_size(width: u32, height: u32) -> VgResult<()> {
    if width == 0 || height == 0 {
        return Err(VgError::IllegalArgument("surface size must be positive"));
    }
    Ok(())
}

fn check_config(config: &ContextConfig) -> VgResult<()> {
    check_tolerance(config.tolerance)?;
    check_finite(&config.clear_color)?;
    let stroke = &config.stroke;
    if !stroke.width.is_finite() || stroke.width < 0.0 || !stroke.miter_limit.is_finite() {
        return Err(VgError::IllegalArgument("invalid stroke parameters"));
    }
    Ok(())
}

fn check_tolerance(tolerance: f32) -> VgResult<()> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(VgError::IllegalArgument("tolerance must be finite and positive"))
    }
}

fn check_finite(values: &[f32]) -> VgResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(VgError::IllegalArgument("non-finite value"))
    }
}

fn check_matrix(m: Mat3) -> VgResult<()> {
    if m.is_finite() {
        Ok(())
    } else {
        Err(VgError::IllegalArgument("non-finite matrix"))
    }
}

pub(crate) fn check_modes(modes: PaintMode) -> VgResult<()> {
    if modes.is_empty() {
        Err(VgError::IllegalArgument("empty paint mode set"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, RecordingBackend};
    use crate::coords::Vec2;

    fn ctx() -> Context<RecordingBackend> {
        Context::new(800, 600, RecordingBackend::new()).unwrap()
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(Context::new(0, 600, RecordingBackend::new()).is_err());
    }

    #[test]
    fn setup_calls_move_to_configuring() {
        let mut ctx = ctx();
        assert_eq!(ctx.state(), ContextState::Created);
        ctx.set_matrix_mode(MatrixMode::ImageUserToSurface).unwrap();
        assert_eq!(ctx.state(), ContextState::Configuring);
        ctx.begin_frame().unwrap();
        assert_eq!(ctx.state(), ContextState::Drawing);
        ctx.translate(1.0, 2.0).unwrap();
        assert_eq!(ctx.state(), ContextState::Drawing);
        ctx.end_frame().unwrap();
        assert_eq!(ctx.state(), ContextState::Configuring);
    }

    #[test]
    fn destroyed_context_rejects_everything() {
        let mut ctx = ctx();
        ctx.destroy().unwrap();
        assert_eq!(ctx.destroy(), Err(VgError::ContextDestroyed));
        assert_eq!(ctx.translate(1.0, 1.0), Err(VgError::ContextDestroyed));
        assert_eq!(ctx.begin_frame(), Err(VgError::ContextDestroyed));
        assert_eq!(ctx.paint(PaintMode::FILL), Err(VgError::ContextDestroyed));
        assert_eq!(ctx.last_error(), Some(VgError::ContextDestroyed));
    }

    #[test]
    fn errors_are_recorded_until_taken() {
        let mut ctx = ctx();
        assert_eq!(ctx.pop_matrix(), Err(VgError::StackUnderflow));
        assert_eq!(ctx.last_error(), Some(VgError::StackUnderflow));
        assert_eq!(ctx.take_error(), Some(VgError::StackUnderflow));
        assert_eq!(ctx.last_error(), None);
    }

    #[test]
    fn matrix_stacks_are_independent_per_mode() {
        let mut ctx = ctx();
        ctx.translate(10.0, 0.0).unwrap();
        ctx.set_matrix_mode(MatrixMode::ImageUserToSurface).unwrap();
        assert_eq!(ctx.current_matrix(), Mat3::identity());
        ctx.scale(2.0, 2.0).unwrap();
        let p = ctx
            .matrix_for(MatrixMode::PathUserToSurface)
            .transform_point(Vec2::new(0.0, 0.0));
        assert_eq!(p, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn push_pop_matrix_round_trips() {
        let mut ctx = ctx();
        ctx.rotate(30.0).unwrap();
        let before = ctx.current_matrix();
        ctx.push_matrix().unwrap();
        ctx.translate(5.0, 5.0).unwrap();
        ctx.shear(0.5, 0.0).unwrap();
        assert_eq!(ctx.matrix_depth(), 1);
        ctx.pop_matrix().unwrap();
        assert_eq!(ctx.current_matrix(), before);
    }

    #[test]
    fn non_finite_transform_is_rejected_without_change() {
        let mut ctx = ctx();
        assert!(ctx.translate(f32::NAN, 0.0).is_err());
        assert_eq!(ctx.current_matrix(), Mat3::identity());
    }

    #[test]
    fn camera_pop_without_push_underflows() {
        let mut ctx = ctx();
        assert_eq!(ctx.pop_ortho_camera(), Err(VgError::StackUnderflow));
        assert_eq!(ctx.take_error(), Some(VgError::StackUnderflow));
    }

    #[test]
    fn end_frame_resets_leftover_cameras() {
        let mut ctx = ctx();
        let base = ctx.projection();
        ctx.begin_frame().unwrap();
        ctx.push_ortho_camera(0.0, 1.0, 0.0, 1.0, -1.0, 1.0).unwrap();
        ctx.end_frame().unwrap();
        assert_eq!(ctx.camera_depth(), 0);
        assert_eq!(ctx.projection(), base);
    }

    #[test]
    fn paint_binding_is_per_mode() {
        let mut res = Resources::new();
        let a = res.create_paint();
        let b = res.create_paint();
        let mut ctx = ctx();
        ctx.set_paint(&res, a, PaintMode::FILL | PaintMode::STROKE).unwrap();
        ctx.set_paint(&res, b, PaintMode::STROKE).unwrap();
        assert_eq!(ctx.paint(PaintMode::FILL), Ok(Some(a)));
        assert_eq!(ctx.paint(PaintMode::STROKE), Ok(Some(b)));
        ctx.clear_paint(PaintMode::FILL).unwrap();
        assert_eq!(ctx.paint(PaintMode::FILL), Ok(None));
        assert!(ctx.paint(PaintMode::FILL | PaintMode::STROKE).is_err());
    }

    #[test]
    fn binding_rejects_empty_modes_and_dead_paints() {
        let mut res = Resources::new();
        let paint = res.create_paint();
        let mut ctx = ctx();
        assert!(matches!(
            ctx.set_paint(&res, paint, PaintMode::empty()),
            Err(VgError::IllegalArgument(_))
        ));
        res.destroy_paint(paint).unwrap();
        assert_eq!(
            ctx.set_paint(&res, paint, PaintMode::FILL),
            Err(VgError::InvalidHandle)
        );
    }

    #[test]
    fn parameters_validate_and_clamp() {
        let mut ctx = ctx();
        assert!(ctx.set_stroke_width(-1.0).is_err());
        ctx.set_stroke_width(3.0).unwrap();
        assert_eq!(ctx.stroke_width(), 3.0);
        ctx.set_miter_limit(0.5).unwrap();
        assert_eq!(ctx.config().stroke.miter_limit, 1.0);
        assert!(ctx.set_tessellation_tolerance(0.0).is_err());
        ctx.set_clear_color([2.0, -1.0, 0.5, 1.0]).unwrap();
        assert_eq!(ctx.config().clear_color, [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn resize_reaches_backend_and_projection() {
        let mut ctx = ctx();
        ctx.resize_surface(100, 50).unwrap();
        assert_eq!(ctx.size(), (100, 50));
        assert_eq!(
            ctx.projection(),
            Mat4::ortho(0.0, 100.0, 0.0, 50.0, -1.0, 1.0).unwrap()
        );
        assert_eq!(
            ctx.backend().commands(),
            &[Command::Resize { width: 100, height: 50 }]
        );
    }

    #[test]
    fn bounds_use_context_matrix() {
        let mut res = Resources::new();
        let path = res.create_path(Default::default()).unwrap();
        crate::path::vgu::rect(res.path_mut(path).unwrap(), 0.0, 0.0, 10.0, 10.0).unwrap();
        let mut ctx = ctx();
        ctx.translate(5.0, 0.0).unwrap();
        let b = ctx.path_transformed_bounds(&mut res, path).unwrap().unwrap();
        assert!(b.approx_eq(Rect::new(5.0, 0.0, 10.0, 10.0), 1e-4));
        let b = ctx.path_bounds(&mut res, path).unwrap().unwrap();
        assert!(b.approx_eq(Rect::new(0.0, 0.0, 10.0, 10.0), 1e-4));
    }
}
