use crate::backend::{Backend, ClearCmd, GradientFill, ImageDraw, MeshDraw, MeshPaint, RasterPass, TextureRef};
use crate::context::{check_modes, Context, ImageMode};
use crate::coords::Vec2;
use crate::error::{VgError, VgResult};
use crate::image::PixelRect;
use crate::math::{Mat3, MatrixMode};
use crate::paint::{Color, ColorRamp, GradientShape, Paint, PaintMode, RAMP_WIDTH};
use crate::path::Mesh;
use crate::resources::{ImageHandle, PaintHandle, PathHandle, Resources};

use super::quality::{effective_quality, sampling_filter, user_tolerance};

/// A bound paint reduced to what the rasterizer needs.
enum ResolvedPaint {
    Solid(Color),
    Gradient { shape: GradientShape, ramp: ColorRamp },
}

impl ResolvedPaint {
    fn color_at(&self, p: Vec2) -> Color {
        match self {
            ResolvedPaint::Solid(color) => *color,
            ResolvedPaint::Gradient { shape, ramp } => ramp.sample(shape.parameter(p)),
        }
    }
}

impl<B: Backend> Context<B> {
    /// Draws `path` with the bound paints: fill first, then stroke.
    ///
    /// A requested pass without a bound paint draws nothing. A bound paint
    /// that has since been destroyed fails the whole call before anything
    /// reaches the backend.
    pub fn draw_path(&mut self, resources: &mut Resources, path: PathHandle, modes: PaintMode) -> VgResult<()> {
        let result = self.draw_path_inner(resources, path, modes);
        self.record(result)
    }

    fn draw_path_inner(&mut self, resources: &mut Resources, path: PathHandle, modes: PaintMode) -> VgResult<()> {
        self.ensure_alive()?;
        check_modes(modes)?;
        resources.path(path)?;

        let fill = if modes.contains(PaintMode::FILL) {
            self.resolve_paint(resources, self.fill_paint)?
        } else {
            None
        };
        let stroke = if modes.contains(PaintMode::STROKE) {
            self.resolve_paint(resources, self.stroke_paint)?
        } else {
            None
        };
        if fill.is_none() && stroke.is_none() {
            log::debug!("draw_path: no paint bound for {modes:?}");
            return Ok(());
        }

        if self.batch.is_none() {
            self.enter_drawing()?;
        }

        let transform = self.matrices.top(MatrixMode::PathUserToSurface);
        let tolerance = user_tolerance(transform, self.config.tolerance);

        if let Some(paint) = fill {
            let rule = self.config.fill_rule;
            let mesh = resources.path_mut(path)?.fill_mesh(rule, tolerance);
            self.emit_mesh(RasterPass::Fill, mesh, transform, &paint, MatrixMode::FillPaintToUser);
        }

        if let Some(paint) = stroke {
            let style = self.config.stroke;
            if !style.is_visible() {
                return Ok(());
            }
            let mesh = resources.path_mut(path)?.stroke_mesh(&style, tolerance);
            self.emit_mesh(RasterPass::Stroke, mesh, transform, &paint, MatrixMode::StrokePaintToUser);
        }
        Ok(())
    }

    /// Sends one pass to the open batch or the backend.
    fn emit_mesh(
        &mut self,
        pass: RasterPass,
        mesh: &Mesh,
        transform: Mat3,
        paint: &ResolvedPaint,
        paint_to_user: MatrixMode,
    ) {
        if mesh.is_empty() {
            return;
        }
        let user_to_paint = match paint {
            ResolvedPaint::Solid(_) => Mat3::identity(),
            ResolvedPaint::Gradient { .. } => match self.matrices.top(paint_to_user).inverse() {
                Some(m) => m,
                None => {
                    log::debug!("{pass:?} pass skipped: {paint_to_user:?} matrix is singular");
                    return;
                }
            },
        };

        if let Some(batch) = self.batch.as_mut() {
            batch.push_mesh(mesh, transform, |p| paint.color_at(user_to_paint.transform_point(p)));
            return;
        }

        let texels: Vec<[u8; 4]>;
        let mesh_paint = match paint {
            ResolvedPaint::Solid(color) => MeshPaint::Solid(*color),
            ResolvedPaint::Gradient { shape, ramp } => {
                texels = ramp.texels(RAMP_WIDTH);
                MeshPaint::Gradient(GradientFill {
                    shape: *shape,
                    spread: ramp.spread,
                    user_to_paint,
                    ramp: &texels,
                })
            }
        };
        self.backend.draw_mesh(&MeshDraw {
            pass,
            mesh,
            transform,
            projection: self.cameras.current(),
            paint: mesh_paint,
        });
    }

    /// What a bound paint renders with, or `None` when nothing is bound.
    fn resolve_paint(&mut self, resources: &Resources, binding: Option<PaintHandle>) -> VgResult<Option<ResolvedPaint>> {
        let Some(handle) = binding else { return Ok(None) };
        let paint = resources.paint(handle)?;
        if let Some(shape) = paint.gradient() {
            return Ok(Some(ResolvedPaint::Gradient {
                shape,
                ramp: paint.ramp.clone(),
            }));
        }
        if !paint.renders_natively() && !self.warned_paint_fallback {
            log::debug!(
                "{:?} paint drawn with its flat fallback color",
                paint.paint_type
            );
            self.warned_paint_fallback = true;
        }
        Ok(Some(ResolvedPaint::Solid(paint.render_color())))
    }

    /// Draws the image as a `width × height` quad in image user space
    /// through the image-user-to-surface matrix.
    pub fn draw_image(&mut self, resources: &Resources, image: ImageHandle) -> VgResult<()> {
        let result = self.draw_image_inner(resources, image);
        self.record(result)
    }

    fn draw_image_inner(&mut self, resources: &Resources, handle: ImageHandle) -> VgResult<()> {
        self.ensure_alive()?;
        let image = resources.image(handle)?;
        if !self.backend.supports_format(image.format()) {
            return Err(VgError::UnsupportedFormat);
        }
        let buffer = resources.image_buffer(image)?;

        let tint = match self.config.image_mode {
            ImageMode::Normal => Color::WHITE,
            ImageMode::Multiply => match self.fill_paint {
                Some(paint) => resources.paint(paint)?.render_color(),
                None => Paint::default().render_color(),
            },
        };
        let quality = effective_quality(
            self.config.rendering_quality.image_quality(),
            image.allowed_quality(),
        );

        self.enter_drawing()?;

        self.backend.draw_image(&ImageDraw {
            texture: TextureRef {
                buffer: image.buffer,
                version: buffer.version(),
                width: buffer.width(),
                height: buffer.height(),
                texels: buffer.as_bytes(),
            },
            region: image.region(),
            transform: self.matrices.top(MatrixMode::ImageUserToSurface),
            projection: self.cameras.current(),
            tint,
            filter: sampling_filter(quality),
        });
        Ok(())
    }

    /// Fills a surface rectangle (pixels, origin bottom-left) with the clear
    /// color, ignoring matrices, cameras and paints. The rectangle is clipped
    /// to the surface.
    pub fn clear(&mut self, x: i32, y: i32, width: i32, height: i32) -> VgResult<()> {
        let result = self.clear_inner(x, y, width, height);
        self.record(result)
    }

    fn clear_inner(&mut self, x: i32, y: i32, width: i32, height: i32) -> VgResult<()> {
        self.ensure_alive()?;
        if width <= 0 || height <= 0 {
            return Err(VgError::IllegalArgument("clear region must have a positive size"));
        }
        let Some(rect) = PixelRect::clipped(x, y, width, height, (self.width, self.height)) else {
            return Ok(());
        };
        self.enter_drawing()?;
        self.backend.clear(&ClearCmd {
            rect,
            color: Color::from_straight_array(self.config.clear_color),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::{Command, ImageFilter, RasterPass, RecordingBackend};
    use crate::context::{Context, ContextState, ImageMode, RenderingQuality};
    use crate::error::VgError;
    use crate::image::{ImageFormat, ImageQuality};
    use crate::math::{Mat3, MatrixMode};
    use crate::paint::{GradientShape, PaintMode, PaintType, SpreadMode, RAMP_WIDTH};
    use crate::path::{vgu, PathDesc};
    use crate::resources::{PathHandle, Resources};

    fn setup() -> (Context<RecordingBackend>, Resources, PathHandle) {
        let ctx = Context::new(800, 600, RecordingBackend::new()).unwrap();
        let mut res = Resources::new();
        let path = res.create_path(PathDesc::default()).unwrap();
        vgu::rect(res.path_mut(path).unwrap(), 0.0, 0.0, 50.0, 50.0).unwrap();
        (ctx, res, path)
    }

    #[test]
    fn no_bound_paint_is_a_no_op() {
        let (mut ctx, mut res, path) = setup();
        ctx.draw_path(&mut res, path, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();
        assert!(ctx.backend().commands().is_empty());
        assert_eq!(ctx.state(), ContextState::Created);
    }

    #[test]
    fn fill_precedes_stroke() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        ctx.set_paint(&res, paint, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();
        ctx.draw_path(&mut res, path, PaintMode::STROKE | PaintMode::FILL)
            .unwrap();
        assert_eq!(
            ctx.backend().mesh_passes(),
            vec![RasterPass::Fill, RasterPass::Stroke]
        );
        assert_eq!(ctx.state(), ContextState::Drawing);
        assert_eq!(ctx.backend().commands()[0], Command::BeginFrame);
    }

    #[test]
    fn only_requested_pass_is_drawn() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        ctx.set_paint(&res, paint, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();
        ctx.draw_path(&mut res, path, PaintMode::STROKE).unwrap();
        assert_eq!(ctx.backend().mesh_passes(), vec![RasterPass::Stroke]);
    }

    #[test]
    fn zero_stroke_width_draws_fill_only() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        ctx.set_paint(&res, paint, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();
        ctx.set_stroke_width(0.0).unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();
        assert_eq!(ctx.backend().mesh_passes(), vec![RasterPass::Fill]);
    }

    #[test]
    fn stale_paint_fails_without_drawing() {
        let (mut ctx, mut res, path) = setup();
        let fill = res.create_paint();
        let stroke = res.create_paint();
        ctx.set_paint(&res, fill, PaintMode::FILL).unwrap();
        ctx.set_paint(&res, stroke, PaintMode::STROKE).unwrap();
        res.destroy_paint(stroke).unwrap();
        assert_eq!(
            ctx.draw_path(&mut res, path, PaintMode::FILL | PaintMode::STROKE),
            Err(VgError::InvalidHandle)
        );
        assert!(ctx.backend().mesh_passes().is_empty());
        assert_eq!(ctx.last_error(), Some(VgError::InvalidHandle));
    }

    #[test]
    fn empty_mode_set_is_illegal() {
        let (mut ctx, mut res, path) = setup();
        assert!(matches!(
            ctx.draw_path(&mut res, path, PaintMode::empty()),
            Err(VgError::IllegalArgument(_))
        ));
    }

    #[test]
    fn destroyed_path_is_invalid() {
        let (mut ctx, mut res, path) = setup();
        res.destroy_path(path).unwrap();
        assert_eq!(
            ctx.draw_path(&mut res, path, PaintMode::FILL),
            Err(VgError::InvalidHandle)
        );
    }

    #[test]
    fn gradient_paint_reaches_the_backend_with_its_ramp() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        res.set_paint_type(paint, PaintType::RadialGradient).unwrap();
        res.set_radial_gradient(paint, [25.0, 25.0, 25.0, 25.0, 25.0]).unwrap();
        res.set_color_ramp_spread_mode(paint, SpreadMode::Reflect).unwrap();
        res.set_color_ramp_stops(paint, &[0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0])
            .unwrap();
        ctx.set_paint(&res, paint, PaintMode::FILL).unwrap();
        ctx.set_matrix_mode(MatrixMode::FillPaintToUser).unwrap();
        ctx.scale(2.0, 2.0).unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL).unwrap();

        let Some(Command::Mesh { color, gradient: Some(g), .. }) = ctx.backend().commands().last() else {
            panic!("expected a gradient mesh");
        };
        assert_eq!(color.to_array(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.spread, SpreadMode::Reflect);
        assert!(matches!(g.shape, GradientShape::Radial(r) if r.radius == 25.0));
        assert_eq!(g.ramp.len(), RAMP_WIDTH);
        assert_eq!(g.ramp[RAMP_WIDTH - 1], [0, 0, 255, 255]);
        assert_eq!(g.user_to_paint, Mat3::scaling(0.5, 0.5));
    }

    #[test]
    fn solid_paint_carries_no_gradient() {
        let (mut ctx, mut res, path) = setup();
        let paint = res.create_paint();
        ctx.set_paint(&res, paint, PaintMode::FILL).unwrap();
        ctx.draw_path(&mut res, path, PaintMode::FILL).unwrap();
        let Some(Command::Mesh { gradient, .. }) = ctx.backend().commands().last() else {
            panic!("expected a mesh");
        };
        assert!(gradient.is_none());
    }

    #[test]
    fn singular_paint_matrix_skips_only_that_pass() {
        let (mut ctx, mut res, path) = setup();
        let gradient = res.create_paint();
        res.set_paint_type(gradient, PaintType::LinearGradient).unwrap();
        let solid = res.create_paint();
        ctx.set_paint(&res, gradient, PaintMode::FILL).unwrap();
        ctx.set_paint(&res, solid, PaintMode::STROKE).unwrap();
        ctx.set_matrix_mode(MatrixMode::FillPaintToUser).unwrap();
        ctx.scale(0.0, 1.0).unwrap();

        ctx.draw_path(&mut res, path, PaintMode::FILL | PaintMode::STROKE)
            .unwrap();
        assert_eq!(ctx.backend().mesh_passes(), vec![RasterPass::Stroke]);
    }

    #[test]
    fn image_format_rejected_by_backend_is_unsupported() {
        let mut ctx = Context::new(64, 64, RecordingBackend::without_formats(&[ImageFormat::SL8]))
            .unwrap();
        let mut res = Resources::new();
        let gray = res
            .create_image(ImageFormat::SL8, 4, 4, ImageQuality::all())
            .unwrap();
        let rgba = res
            .create_image(ImageFormat::SRgba8888, 4, 4, ImageQuality::all())
            .unwrap();

        assert_eq!(ctx.draw_image(&res, gray), Err(VgError::UnsupportedFormat));
        assert_eq!(ctx.last_error(), Some(VgError::UnsupportedFormat));
        assert!(ctx.backend().commands().is_empty());
        assert_eq!(ctx.state(), ContextState::Created);

        ctx.draw_image(&res, rgba).unwrap();
        assert_eq!(ctx.backend().commands().len(), 2);
    }

    #[test]
    fn image_sampling_follows_quality() {
        let (mut ctx, mut res, _) = setup();
        let img = res
            .create_image(ImageFormat::SRgba8888, 4, 4, ImageQuality::all())
            .unwrap();
        let crisp = res
            .create_image(ImageFormat::SRgba8888, 4, 4, ImageQuality::NONANTIALIASED)
            .unwrap();
        ctx.draw_image(&res, img).unwrap();
        ctx.draw_image(&res, crisp).unwrap();
        ctx.set_rendering_quality(RenderingQuality::NonAntialiased)
            .unwrap();
        ctx.draw_image(&res, img).unwrap();

        let filters: Vec<_> = ctx
            .backend()
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Image { filter, .. } => Some(*filter),
                _ => None,
            })
            .collect();
        assert_eq!(
            filters,
            vec![ImageFilter::Linear, ImageFilter::Nearest, ImageFilter::Nearest]
        );
    }

    #[test]
    fn multiply_mode_tints_with_fill_paint() {
        let (mut ctx, mut res, _) = setup();
        let img = res
            .create_image(ImageFormat::SRgba8888, 2, 2, ImageQuality::all())
            .unwrap();
        let paint = res.create_paint();
        res.set_paint_color(paint, [0.0, 1.0, 0.0, 1.0]).unwrap();
        ctx.set_paint(&res, paint, PaintMode::FILL).unwrap();

        ctx.draw_image(&res, img).unwrap();
        ctx.set_image_mode(ImageMode::Multiply).unwrap();
        ctx.draw_image(&res, img).unwrap();

        let tints: Vec<_> = ctx
            .backend()
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Image { tint, .. } => Some(tint.to_array()),
                _ => None,
            })
            .collect();
        assert_eq!(tints, vec![[1.0, 1.0, 1.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
    }

    #[test]
    fn child_image_draws_its_region_of_the_parent_buffer() {
        let (mut ctx, mut res, _) = setup();
        let parent = res
            .create_image(ImageFormat::SRgba8888, 8, 8, ImageQuality::all())
            .unwrap();
        let child = res.child_image(parent, 2, 3, 4, 4).unwrap();
        ctx.draw_image(&res, child).unwrap();
        let Some(Command::Image { region, .. }) = ctx.backend().commands().last() else {
            panic!("expected an image command");
        };
        assert_eq!((region.x, region.y, region.width, region.height), (2, 3, 4, 4));
    }

    #[test]
    fn clear_is_clipped_to_surface() {
        let (mut ctx, _, _) = setup();
        ctx.set_clear_color([1.0, 0.0, 0.0, 1.0]).unwrap();
        ctx.clear(-10, 590, 100, 100).unwrap();
        ctx.clear(900, 0, 10, 10).unwrap();
        let clears: Vec<_> = ctx
            .backend()
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Clear(cmd) => Some(cmd.rect),
                _ => None,
            })
            .collect();
        assert_eq!(clears.len(), 1);
        assert_eq!(
            (clears[0].x, clears[0].y, clears[0].width, clears[0].height),
            (0, 590, 90, 10)
        );
        assert!(ctx.clear(0, 0, 0, 10).is_err());
    }
}
