use crate::backend::ImageFilter;
use crate::coords::Vec2;
use crate::image::ImageQuality;
use crate::math::Mat3;

/// Best quality level in `allowed` that does not exceed `requested`, falling
/// back to the lowest allowed level.
pub fn effective_quality(requested: ImageQuality, allowed: ImageQuality) -> ImageQuality {
    const LEVELS: [ImageQuality; 3] = [
        ImageQuality::BETTER,
        ImageQuality::FASTER,
        ImageQuality::NONANTIALIASED,
    ];
    LEVELS
        .into_iter()
        .filter(|q| q.bits() <= requested.bits())
        .find(|q| allowed.contains(*q))
        .or_else(|| LEVELS.into_iter().rev().find(|q| allowed.contains(*q)))
        .unwrap_or(ImageQuality::NONANTIALIASED)
}

/// Point sampling for non-antialiased drawing, bilinear otherwise.
#[inline]
pub fn sampling_filter(quality: ImageQuality) -> ImageFilter {
    if quality == ImageQuality::NONANTIALIASED {
        ImageFilter::Nearest
    } else {
        ImageFilter::Linear
    }
}

/// Converts a surface-pixel tolerance into path user units under `transform`.
pub(crate) fn user_tolerance(transform: Mat3, tolerance: f32) -> f32 {
    let ex = transform.transform_vector(Vec2::new(1.0, 0.0));
    let ey = transform.transform_vector(Vec2::new(0.0, 1.0));
    let scale = ex.x.hypot(ex.y).max(ey.x.hypot(ey.y));
    if scale.is_finite() && scale > f32::EPSILON {
        tolerance / scale
    } else {
        tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_is_limited_by_allowed_set() {
        let all = ImageQuality::all();
        assert_eq!(effective_quality(ImageQuality::BETTER, all), ImageQuality::BETTER);
        assert_eq!(
            effective_quality(ImageQuality::BETTER, ImageQuality::NONANTIALIASED),
            ImageQuality::NONANTIALIASED
        );
        assert_eq!(
            effective_quality(ImageQuality::NONANTIALIASED, ImageQuality::FASTER),
            ImageQuality::FASTER
        );
        assert_eq!(
            effective_quality(ImageQuality::FASTER, ImageQuality::empty()),
            ImageQuality::NONANTIALIASED
        );
    }

    #[test]
    fn only_nonantialiased_point_samples() {
        assert_eq!(sampling_filter(ImageQuality::NONANTIALIASED), ImageFilter::Nearest);
        assert_eq!(sampling_filter(ImageQuality::FASTER), ImageFilter::Linear);
        assert_eq!(sampling_filter(ImageQuality::BETTER), ImageFilter::Linear);
    }

    #[test]
    fn tolerance_shrinks_under_magnification() {
        let t = user_tolerance(Mat3::scaling(4.0, 2.0), 1.0);
        assert!((t - 0.25).abs() < 1e-6);
        assert_eq!(user_tolerance(Mat3::scaling(0.0, 0.0), 0.5), 0.5);
    }
}
