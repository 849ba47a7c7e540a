use crate::error::{VgError, VgResult};
use crate::paint::{LinearGradient, Paint, PaintType, RadialGradient, SpreadMode, TilingMode};

use super::{ImageHandle, PaintHandle, Resources};

impl Resources {
    /// Creates an opaque black color paint.
    pub fn create_paint(&mut self) -> PaintHandle {
        let handle = self.paints.insert(Paint::new());
        log::debug!("paint created: {handle:?}");
        handle
    }

    /// Destroys a paint. Contexts still bound to it see `InvalidHandle` on
    /// their next draw.
    pub fn destroy_paint(&mut self, handle: PaintHandle) -> VgResult<()> {
        self.paints.remove(handle).ok_or(VgError::InvalidHandle)?;
        log::debug!("paint destroyed: {handle:?}");
        Ok(())
    }

    /// Sets the straight RGBA color; channels are clamped to [0, 1].
    pub fn set_paint_color(&mut self, handle: PaintHandle, rgba: [f32; 4]) -> VgResult<()> {
        self.paint_mut(handle)?.set_color(rgba);
        Ok(())
    }

    pub fn paint_color(&self, handle: PaintHandle) -> VgResult<[f32; 4]> {
        Ok(self.paint(handle)?.color())
    }

    pub fn set_paint_type(&mut self, handle: PaintHandle, paint_type: PaintType) -> VgResult<()> {
        self.paint_mut(handle)?.paint_type = paint_type;
        Ok(())
    }

    pub fn set_linear_gradient(&mut self, handle: PaintHandle, values: [f32; 4]) -> VgResult<()> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(VgError::IllegalArgument("non-finite gradient parameter"));
        }
        self.paint_mut(handle)?.linear = LinearGradient::from_array(values);
        Ok(())
    }

    pub fn set_radial_gradient(&mut self, handle: PaintHandle, values: [f32; 5]) -> VgResult<()> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(VgError::IllegalArgument("non-finite gradient parameter"));
        }
        self.paint_mut(handle)?.radial = RadialGradient::from_array(values);
        Ok(())
    }

    /// Replaces the color ramp from `[offset, r, g, b, a]*` groups.
    pub fn set_color_ramp_stops(&mut self, handle: PaintHandle, values: &[f32]) -> VgResult<()> {
        self.paint_mut(handle)?.ramp.set_stops(values)
    }

    pub fn set_color_ramp_spread_mode(
        &mut self,
        handle: PaintHandle,
        spread: SpreadMode,
    ) -> VgResult<()> {
        self.paint_mut(handle)?.ramp.spread = spread;
        Ok(())
    }

    pub fn set_color_ramp_premultiplied(
        &mut self,
        handle: PaintHandle,
        premultiplied: bool,
    ) -> VgResult<()> {
        self.paint_mut(handle)?.ramp.premultiplied = premultiplied;
        Ok(())
    }

    pub fn set_pattern_tiling_mode(&mut self, handle: PaintHandle, tiling: TilingMode) -> VgResult<()> {
        self.paint_mut(handle)?.tiling = tiling;
        Ok(())
    }

    /// Sets (or with `None`, clears) the pattern image of a paint.
    pub fn paint_pattern(&mut self, handle: PaintHandle, image: Option<ImageHandle>) -> VgResult<()> {
        if let Some(image) = image {
            self.image(image)?;
        }
        self.paint_mut(handle)?.pattern = image;
        Ok(())
    }
}
