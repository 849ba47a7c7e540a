//! Convenience constructors appending common shapes to a path.
//!
//! Each constructor builds its whole segment list first and appends it in
//! one call, so a capability failure leaves the path untouched.

use std::f32::consts::PI;

use crate::coords::Vec2;
use crate::error::{VgError, VgResult};

use super::path::Path;
use super::segment::{Segment, SegmentCommand::*};

/// How [`arc`] closes the curve.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArcType {
    /// Just the curve.
    Open,
    /// Curve closed by a straight chord.
    Chord,
    /// Curve closed through the center.
    Pie,
}

fn positive_extent(width: f32, height: f32) -> VgResult<()> {
    if width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(VgError::IllegalArgument("width and height must be positive"))
    }
}

pub fn line(path: &mut Path, x0: f32, y0: f32, x1: f32, y1: f32) -> VgResult<()> {
    path.append(&[Segment::abs(MoveTo), Segment::abs(LineTo)], &[x0, y0, x1, y1])
}

/// Polyline through `points`, closed back to the first point when `closed`.
pub fn polygon(path: &mut Path, points: &[Vec2], closed: bool) -> VgResult<()> {
    if points.is_empty() {
        return Err(VgError::IllegalArgument("polygon needs at least one point"));
    }

    let mut segments = Vec::with_capacity(points.len() + 1);
    segments.push(Segment::abs(MoveTo));
    segments.resize(points.len(), Segment::abs(LineTo));
    if closed {
        segments.push(Segment::CLOSE);
    }
    let coords: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
    path.append(&segments, &coords)
}

/// Axis-aligned rectangle: move, hline, vline, hline, close.
pub fn rect(path: &mut Path, x: f32, y: f32, width: f32, height: f32) -> VgResult<()> {
    positive_extent(width, height)?;
    path.append(
        &[
            Segment::abs(MoveTo),
            Segment::abs(HLineTo),
            Segment::abs(VLineTo),
            Segment::abs(HLineTo),
            Segment::CLOSE,
        ],
        &[x, y, x + width, y + height, x],
    )
}

/// Rectangle with elliptical corners; arc extents are clamped to the
/// rectangle size.
pub fn round_rect(
    path: &mut Path,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    arc_width: f32,
    arc_height: f32,
) -> VgResult<()> {
    positive_extent(width, height)?;
    let rw = arc_width.clamp(0.0, width) * 0.5;
    let rh = arc_height.clamp(0.0, height) * 0.5;

    #[rustfmt::skip]
    let coords = [
        x + rw, y,
        x + width - rw,
        rw, rh, 0.0, x + width, y + rh,
        y + height - rh,
        rw, rh, 0.0, x + width - rw, y + height,
        x + rw,
        rw, rh, 0.0, x, y + height - rh,
        y + rh,
        rw, rh, 0.0, x + rw, y,
    ];
    path.append(
        &[
            Segment::abs(MoveTo),
            Segment::abs(HLineTo),
            Segment::abs(SmallCcwArcTo),
            Segment::abs(VLineTo),
            Segment::abs(SmallCcwArcTo),
            Segment::abs(HLineTo),
            Segment::abs(SmallCcwArcTo),
            Segment::abs(VLineTo),
            Segment::abs(SmallCcwArcTo),
            Segment::CLOSE,
        ],
        &coords,
    )
}

/// Ellipse centered on `(cx, cy)` spanning `width × height`.
pub fn ellipse(path: &mut Path, cx: f32, cy: f32, width: f32, height: f32) -> VgResult<()> {
    positive_extent(width, height)?;
    let (rx, ry) = (width * 0.5, height * 0.5);
    #[rustfmt::skip]
    let coords = [
        cx + rx, cy,
        rx, ry, 0.0, cx - rx, cy,
        rx, ry, 0.0, cx + rx, cy,
    ];
    path.append(
        &[
            Segment::abs(MoveTo),
            Segment::abs(SmallCcwArcTo),
            Segment::abs(SmallCcwArcTo),
            Segment::CLOSE,
        ],
        &coords,
    )
}

/// Elliptical arc on the ellipse centered at `(x, y)`, from `start_angle`
/// sweeping `angle_extent` degrees (positive is counter-clockwise).
///
/// The sweep is split into half turns so each arc segment is unambiguous.
/// Sweeps beyond a full turn are clamped to one full turn.
#[allow(clippy::too_many_arguments)]
pub fn arc(
    path: &mut Path,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    start_angle: f32,
    angle_extent: f32,
    arc_type: ArcType,
) -> VgResult<()> {
    positive_extent(width, height)?;
    if !start_angle.is_finite() || !angle_extent.is_finite() {
        return Err(VgError::IllegalArgument("arc angles must be finite"));
    }

    let (rx, ry) = (width * 0.5, height * 0.5);
    let extent = angle_extent.clamp(-360.0, 360.0);
    let start = start_angle.to_radians();
    let end = start + extent.to_radians();
    let on_ellipse = |a: f32| [x + rx * a.cos(), y + ry * a.sin()];

    let mut segments = vec![Segment::abs(MoveTo)];
    let mut coords = on_ellipse(start).to_vec();

    let (command, step) = if extent >= 0.0 {
        (SmallCcwArcTo, PI)
    } else {
        (SmallCwArcTo, -PI)
    };
    let mut push_arc = |a: f32| {
        segments.push(Segment::abs(command));
        coords.extend([rx, ry, 0.0]);
        coords.extend(on_ellipse(a));
    };

    let half_turns = (extent.abs() / 180.0).ceil().max(1.0) as usize;
    for i in 1..half_turns {
        push_arc(start + step * i as f32);
    }
    push_arc(end);

    match arc_type {
        ArcType::Open => {}
        ArcType::Chord => segments.push(Segment::CLOSE),
        ArcType::Pie => {
            segments.push(Segment::abs(LineTo));
            coords.extend([x, y]);
            segments.push(Segment::CLOSE);
        }
    }

    path.append(&segments, &coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::path::{PathCapabilities, PathDesc};

    fn new_path() -> Path {
        Path::new(PathDesc::default()).unwrap()
    }

    fn bounds(path: &mut Path) -> Rect {
        path.bounds(0.01).unwrap().unwrap()
    }

    #[test]
    fn rect_expands_to_hv_lines() {
        let mut path = new_path();
        rect(&mut path, 0.0, 0.0, 200.0, 200.0).unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::abs(MoveTo),
                Segment::abs(HLineTo),
                Segment::abs(VLineTo),
                Segment::abs(HLineTo),
                Segment::CLOSE,
            ]
        );
        assert_eq!(path.decoded_coords(), vec![0.0, 0.0, 200.0, 200.0, 0.0]);
        assert_eq!(bounds(&mut path), Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn rect_rejects_non_positive_size() {
        let mut path = new_path();
        assert!(matches!(rect(&mut path, 0.0, 0.0, 0.0, 5.0), Err(VgError::IllegalArgument(_))));
        assert!(rect(&mut path, 0.0, 0.0, 5.0, -1.0).is_err());
        assert!(path.is_empty());
    }

    #[test]
    fn constructor_respects_capabilities() {
        let mut path = Path::new(
            PathDesc::default().with_capabilities(PathCapabilities::PATH_BOUNDS),
        )
        .unwrap();
        assert!(matches!(ellipse(&mut path, 0.0, 0.0, 4.0, 4.0), Err(VgError::CapabilityDenied(_))));
        assert!(path.is_empty());
    }

    #[test]
    fn ellipse_bounds() {
        let mut path = new_path();
        ellipse(&mut path, 50.0, 40.0, 20.0, 10.0).unwrap();
        assert!(bounds(&mut path).approx_eq(Rect::new(40.0, 35.0, 20.0, 10.0), 0.05));
    }

    #[test]
    fn round_rect_clamps_arcs() {
        let mut path = new_path();
        round_rect(&mut path, 0.0, 0.0, 10.0, 10.0, 40.0, 40.0).unwrap();
        assert_eq!(path.num_segments(), 10);
        assert_eq!(path.num_coords(), 26);
        // Fully rounded: a 10×10 circle.
        assert!(bounds(&mut path).approx_eq(Rect::new(0.0, 0.0, 10.0, 10.0), 0.05));
    }

    #[test]
    fn polygon_open_and_closed() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(4.0, 3.0)];
        let mut open = new_path();
        polygon(&mut open, &pts, false).unwrap();
        assert_eq!(open.num_segments(), 3);

        let mut closed = new_path();
        polygon(&mut closed, &pts, true).unwrap();
        assert_eq!(closed.segments().last(), Some(&Segment::CLOSE));
        assert!(polygon(&mut closed, &[], true).is_err());
    }

    #[test]
    fn line_is_move_plus_line() {
        let mut path = new_path();
        line(&mut path, 1.0, 2.0, 3.0, 4.0).unwrap();
        assert_eq!(bounds(&mut path), Rect::new(1.0, 2.0, 2.0, 2.0));
    }

    #[test]
    fn arc_splits_into_half_turns() {
        let mut path = new_path();
        arc(&mut path, 0.0, 0.0, 20.0, 20.0, 0.0, 270.0, ArcType::Open).unwrap();
        // move + arc to 180° + arc to 270°
        assert_eq!(path.num_segments(), 3);
        assert!(bounds(&mut path).approx_eq(Rect::new(-10.0, -10.0, 20.0, 20.0), 0.05));
    }

    #[test]
    fn arc_pie_closes_through_center() {
        let mut path = new_path();
        arc(&mut path, 0.0, 0.0, 20.0, 20.0, 0.0, 90.0, ArcType::Pie).unwrap();
        let segs = path.segments();
        assert_eq!(&segs[segs.len() - 2..], &[Segment::abs(LineTo), Segment::CLOSE]);
        assert!(bounds(&mut path).approx_eq(Rect::new(0.0, 0.0, 10.0, 10.0), 0.05));
    }

    #[test]
    fn arc_sweep_is_clamped_to_a_full_turn() {
        let mut full = new_path();
        arc(&mut full, 0.0, 0.0, 20.0, 20.0, 0.0, 360.0, ArcType::Open).unwrap();
        assert_eq!(full.num_segments(), 3);

        for extent in [1.0e12, -1.0e12, 720.0, f32::MAX] {
            let mut path = new_path();
            arc(&mut path, 0.0, 0.0, 20.0, 20.0, 45.0, extent, ArcType::Open).unwrap();
            assert_eq!(path.num_segments(), 3, "extent {extent}");
            assert!(bounds(&mut path).approx_eq(Rect::new(-10.0, -10.0, 20.0, 20.0), 0.05));
        }
    }

    #[test]
    fn arc_rejects_non_finite_angles() {
        let mut path = new_path();
        assert!(arc(&mut path, 0.0, 0.0, 4.0, 4.0, f32::NAN, 90.0, ArcType::Open).is_err());
        assert!(arc(&mut path, 0.0, 0.0, 4.0, 4.0, 0.0, f32::INFINITY, ArcType::Open).is_err());
        assert!(path.is_empty());
    }

    #[test]
    fn arc_negative_extent_runs_clockwise() {
        let mut path = new_path();
        arc(&mut path, 0.0, 0.0, 20.0, 20.0, 0.0, -90.0, ArcType::Chord).unwrap();
        assert_eq!(path.segments()[1], Segment::abs(SmallCwArcTo));
        assert!(bounds(&mut path).approx_eq(Rect::new(0.0, -10.0, 10.0, 10.0), 0.05));
    }
}
