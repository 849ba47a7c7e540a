//! Segment resolution and outline construction.
//!
//! OpenVG segments may be relative, horizontal/vertical shorthands, smooth
//! curves reflecting the previous control point, or elliptical arcs. They are
//! first resolved to absolute primitives, then turned into lyon path events
//! that the tessellators and bounds code consume.

use lyon::geom::{ArcFlags, QuadraticBezierSegment, SvgArc};
use lyon::math::{point, vector, Angle, Point};
use lyon::path::iterator::PathIterator;
use lyon::path::PathEvent;

use crate::coords::{Rect, Vec2};
use crate::math::Mat3;

use super::segment::{Segment, SegmentCommand};

/// A segment with every coordinate made absolute.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Resolved {
    Close,
    Move(Vec2),
    Line(Vec2),
    Quad(Vec2, Vec2),
    Cubic(Vec2, Vec2, Vec2),
    Arc {
        radii: Vec2,
        rotation: f32, // degrees
        large: bool,
        ccw: bool,
        to: Vec2,
    },
}

/// Walks `segments`, reading decoded coordinates from `values`, and calls
/// `f(current_point, resolved)` for each one.
///
/// `values` must hold exactly the coordinates the segments consume.
pub fn resolve_segments<F>(segments: &[Segment], values: &[f32], mut f: F)
where
    F: FnMut(Vec2, Resolved),
{
    let mut start = Vec2::zero(); // subpath start
    let mut cur = Vec2::zero(); // current point
    let mut ctrl = Vec2::zero(); // last control point, for smooth reflection

    let mut idx = 0usize;
    for seg in segments {
        let n = seg.arity();
        let Some(c) = values.get(idx..idx + n) else { return };
        idx += n;

        let origin = if seg.relative { cur } else { Vec2::zero() };
        let pt = |i: usize| Vec2::new(c[i], c[i + 1]) + origin;

        let resolved = match seg.command {
            SegmentCommand::Close => Resolved::Close,
            SegmentCommand::MoveTo => Resolved::Move(pt(0)),
            SegmentCommand::LineTo => Resolved::Line(pt(0)),
            SegmentCommand::HLineTo => Resolved::Line(Vec2::new(c[0] + origin.x, cur.y)),
            SegmentCommand::VLineTo => Resolved::Line(Vec2::new(cur.x, c[0] + origin.y)),
            SegmentCommand::QuadTo => Resolved::Quad(pt(0), pt(2)),
            SegmentCommand::CubicTo => Resolved::Cubic(pt(0), pt(2), pt(4)),
            SegmentCommand::SmoothQuadTo => Resolved::Quad(reflect(ctrl, cur), pt(0)),
            SegmentCommand::SmoothCubicTo => Resolved::Cubic(reflect(ctrl, cur), pt(0), pt(2)),
            SegmentCommand::SmallCcwArcTo
            | SegmentCommand::SmallCwArcTo
            | SegmentCommand::LargeCcwArcTo
            | SegmentCommand::LargeCwArcTo => Resolved::Arc {
                radii: Vec2::new(c[0].abs(), c[1].abs()),
                rotation: c[2],
                large: matches!(
                    seg.command,
                    SegmentCommand::LargeCcwArcTo | SegmentCommand::LargeCwArcTo
                ),
                ccw: matches!(
                    seg.command,
                    SegmentCommand::SmallCcwArcTo | SegmentCommand::LargeCcwArcTo
                ),
                to: pt(3),
            },
        };

        f(cur, resolved);

        match resolved {
            Resolved::Close => {
                cur = start;
                ctrl = start;
            }
            Resolved::Move(p) => {
                start = p;
                cur = p;
                ctrl = p;
            }
            Resolved::Line(p) | Resolved::Arc { to: p, .. } => {
                cur = p;
                ctrl = p;
            }
            Resolved::Quad(c1, p) | Resolved::Cubic(_, c1, p) => {
                ctrl = c1;
                cur = p;
            }
        }
    }
}

#[inline]
fn reflect(ctrl: Vec2, about: Vec2) -> Vec2 {
    about * 2.0 - ctrl
}

#[inline]
fn lp(v: Vec2) -> Point {
    point(v.x, v.y)
}

/// Builds absolute lyon events (curves kept, arcs as quadratic curves).
pub fn build_events(segments: &[Segment], values: &[f32]) -> Vec<PathEvent> {
    let mut events = Vec::with_capacity(segments.len() + 2);
    let mut first: Option<Point> = None; // open subpath start
    let mut last = point(0.0, 0.0);

    resolve_segments(segments, values, |from, seg| {
        let from = lp(from);

        // Drawing commands without an explicit move start where the pen is.
        let mut ensure_open = |events: &mut Vec<PathEvent>| {
            if first.is_none() {
                events.push(PathEvent::Begin { at: from });
                first = Some(from);
            }
        };

        match seg {
            Resolved::Close => {
                if let Some(f) = first.take() {
                    events.push(PathEvent::End { last, first: f, close: true });
                    last = f;
                }
            }
            Resolved::Move(p) => {
                if let Some(f) = first.take() {
                    events.push(PathEvent::End { last, first: f, close: false });
                }
                let at = lp(p);
                events.push(PathEvent::Begin { at });
                first = Some(at);
                last = at;
            }
            Resolved::Line(p) => {
                ensure_open(&mut events);
                let to = lp(p);
                events.push(PathEvent::Line { from, to });
                last = to;
            }
            Resolved::Quad(c, p) => {
                ensure_open(&mut events);
                let to = lp(p);
                events.push(PathEvent::Quadratic { from, ctrl: lp(c), to });
                last = to;
            }
            Resolved::Cubic(c1, c2, p) => {
                ensure_open(&mut events);
                let to = lp(p);
                events.push(PathEvent::Cubic { from, ctrl1: lp(c1), ctrl2: lp(c2), to });
                last = to;
            }
            Resolved::Arc { radii, rotation, large, ccw, to } => {
                ensure_open(&mut events);
                let to = lp(to);
                if to == from {
                    // Coincident endpoints draw nothing.
                    return;
                }
                let arc = SvgArc {
                    from,
                    to,
                    radii: vector(radii.x, radii.y),
                    x_rotation: Angle::degrees(rotation),
                    flags: ArcFlags { large_arc: large, sweep: ccw },
                };
                if arc.is_straight_line() {
                    events.push(PathEvent::Line { from, to });
                } else {
                    let first_curve = events.len();
                    let mut pen = from;
                    arc.for_each_quadratic_bezier(&mut |q: &QuadraticBezierSegment<f32>| {
                        events.push(PathEvent::Quadratic { from: pen, ctrl: q.ctrl, to: q.to });
                        pen = q.to;
                    });
                    // Snap the last curve onto the exact segment endpoint.
                    if events.len() > first_curve {
                        if let Some(PathEvent::Quadratic { to: end, .. }) = events.last_mut() {
                            *end = to;
                        }
                    }
                }
                last = to;
            }
        }
    });

    if let Some(f) = first {
        events.push(PathEvent::End { last, first: f, close: false });
    }
    events
}

/// Bounds of the flattened outline after applying `m`, or `None` when the
/// outline has no points.
pub fn flattened_bounds(events: &[PathEvent], tolerance: f32, m: Option<Mat3>) -> Option<Rect> {
    let xf = |p: Point| {
        let v = Vec2::new(p.x, p.y);
        match m {
            Some(m) => m.transform_point(v),
            None => v,
        }
    };

    let points = events
        .iter()
        .cloned()
        .flattened(tolerance)
        .filter_map(|e| match e {
            PathEvent::Begin { at } => Some(at),
            PathEvent::Line { to, .. } => Some(to),
            _ => None,
        })
        .map(xf);
    Rect::from_points(points)
}
