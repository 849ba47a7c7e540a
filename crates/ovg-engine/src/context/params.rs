use crate::image::ImageQuality;
use crate::path::{FillRule, StrokeStyle};

/// Default flattening tolerance in surface pixels.
pub const DEFAULT_TOLERANCE: f32 = 0.25;

/// Overall rendering quality; also caps the image resampling quality.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RenderingQuality {
    NonAntialiased,
    Faster,
    #[default]
    Better,
}

impl RenderingQuality {
    /// Image quality requested when drawing images at this level.
    pub fn image_quality(self) -> ImageQuality {
        match self {
            RenderingQuality::NonAntialiased => ImageQuality::NONANTIALIASED,
            RenderingQuality::Faster => ImageQuality::FASTER,
            RenderingQuality::Better => ImageQuality::BETTER,
        }
    }
}

/// How `draw_image` combines texels with paint.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ImageMode {
    /// Texels as-is.
    #[default]
    Normal,
    /// Texels multiplied by the fill paint color.
    Multiply,
}

/// Initial scalar state of a context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    pub stroke: StrokeStyle,
    pub fill_rule: FillRule,
    pub rendering_quality: RenderingQuality,
    pub image_mode: ImageMode,
    /// Maximum distance between a curve and its flattened polyline.
    pub tolerance: f32,
    /// Straight RGBA used by `clear` and `clear_image`.
    pub clear_color: [f32; 4],
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            stroke: StrokeStyle::default(),
            fill_rule: FillRule::NonZero,
            rendering_quality: RenderingQuality::Better,
            image_mode: ImageMode::Normal,
            tolerance: DEFAULT_TOLERANCE,
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}
