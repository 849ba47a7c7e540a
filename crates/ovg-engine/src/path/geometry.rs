//! Fill and stroke tessellation via lyon.
//!
//! Meshes are produced in path user space; the draw pipeline attaches the
//! user-to-surface transform when it submits them.

use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, LineCap, LineJoin, StrokeOptions,
    StrokeTessellator, StrokeVertex, VertexBuffers,
};
use lyon::path::PathEvent;

use super::style::{CapStyle, FillRule, JoinStyle, StrokeStyle};

/// Smallest tolerance handed to lyon.
pub const MIN_TOLERANCE: f32 = 1e-3;

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

impl From<VertexBuffers<[f32; 2], u32>> for Mesh {
    fn from(buffers: VertexBuffers<[f32; 2], u32>) -> Self {
        Self {
            vertices: buffers.vertices,
            indices: buffers.indices,
        }
    }
}

/// Tessellates the interior of `events` under `rule`.
///
/// Self-intersecting outlines are handled by the tessellator. A failure is
/// logged and yields an empty mesh.
pub fn tessellate_fill(events: &[PathEvent], rule: FillRule, tolerance: f32) -> Mesh {
    if events.is_empty() {
        return Mesh::default();
    }

    let options = FillOptions::default()
        .with_tolerance(tolerance.max(MIN_TOLERANCE))
        .with_fill_rule(match rule {
            FillRule::EvenOdd => lyon::lyon_tessellation::FillRule::EvenOdd,
            FillRule::NonZero => lyon::lyon_tessellation::FillRule::NonZero,
        });

    let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let result = FillTessellator::new().tessellate(
        events.iter().cloned(),
        &options,
        &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
            vertex.position().to_array()
        }),
    );

    if let Err(err) = result {
        log::warn!("path fill tessellation failed: {err:?}");
        return Mesh::default();
    }
    geometry.into()
}

/// Expands `events` into a stroke outline of `style.width`.
pub fn tessellate_stroke(events: &[PathEvent], style: &StrokeStyle, tolerance: f32) -> Mesh {
    if events.is_empty() || !style.is_visible() {
        return Mesh::default();
    }

    let options = StrokeOptions::default()
        .with_line_width(style.width)
        .with_tolerance(tolerance.max(MIN_TOLERANCE))
        .with_line_cap(match style.cap {
            CapStyle::Butt => LineCap::Butt,
            CapStyle::Round => LineCap::Round,
            CapStyle::Square => LineCap::Square,
        })
        .with_line_join(match style.join {
            JoinStyle::Miter => LineJoin::Miter,
            JoinStyle::Round => LineJoin::Round,
            JoinStyle::Bevel => LineJoin::Bevel,
        })
        // lyon rejects limits below 1.
        .with_miter_limit(style.miter_limit.max(StrokeOptions::MINIMUM_MITER_LIMIT));

    let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let result = StrokeTessellator::new().tessellate(
        events.iter().cloned(),
        &options,
        &mut BuffersBuilder::new(&mut geometry, |vertex: StrokeVertex| {
            vertex.position().to_array()
        }),
    );

    if let Err(err) = result {
        log::warn!("path stroke tessellation failed: {err:?}");
        return Mesh::default();
    }
    geometry.into()
}

/// Key of a cached fill mesh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct FillKey {
    pub rule: FillRule,
    pub tolerance: f32,
}

/// Key of a cached stroke mesh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct StrokeKey {
    pub style: StrokeStyle,
    pub tolerance: f32,
}

/// Derived geometry of one path, dropped wholesale on mutation.
#[derive(Debug, Clone, Default)]
pub(crate) struct GeometryCache {
    pub outline: Option<Vec<PathEvent>>,
    pub fill: Option<(FillKey, Mesh)>,
    pub stroke: Option<(StrokeKey, Mesh)>,
}

impl GeometryCache {
    pub fn invalidate(&mut self) {
        self.outline = None;
        self.fill = None;
        self.stroke = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::math::point;

    fn square(size: f32) -> Vec<PathEvent> {
        let p = |x: f32, y: f32| point(x, y);
        vec![
            PathEvent::Begin { at: p(0.0, 0.0) },
            PathEvent::Line { from: p(0.0, 0.0), to: p(size, 0.0) },
            PathEvent::Line { from: p(size, 0.0), to: p(size, size) },
            PathEvent::Line { from: p(size, size), to: p(0.0, size) },
            PathEvent::End { last: p(0.0, size), first: p(0.0, 0.0), close: true },
        ]
    }

    fn bowtie() -> Vec<PathEvent> {
        let p = |x: f32, y: f32| point(x, y);
        vec![
            PathEvent::Begin { at: p(0.0, 0.0) },
            PathEvent::Line { from: p(0.0, 0.0), to: p(10.0, 10.0) },
            PathEvent::Line { from: p(10.0, 10.0), to: p(10.0, 0.0) },
            PathEvent::Line { from: p(10.0, 0.0), to: p(0.0, 10.0) },
            PathEvent::End { last: p(0.0, 10.0), first: p(0.0, 0.0), close: true },
        ]
    }

    fn area(mesh: &Mesh) -> f32 {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let [a, b, c] = [t[0], t[1], t[2]].map(|i| mesh.vertices[i as usize]);
                ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs() * 0.5
            })
            .sum()
    }

    #[test]
    fn fill_square_covers_its_area() {
        let mesh = tessellate_fill(&square(200.0), FillRule::NonZero, 0.25);
        assert!(!mesh.is_empty());
        assert!((area(&mesh) - 40_000.0).abs() < 1.0);
    }

    #[test]
    fn fill_handles_self_intersection() {
        let mesh = tessellate_fill(&bowtie(), FillRule::EvenOdd, 0.25);
        // Two triangles of 25 each.
        assert!((area(&mesh) - 50.0).abs() < 0.1);
    }

    #[test]
    fn fill_of_nothing_is_empty() {
        assert!(tessellate_fill(&[], FillRule::NonZero, 0.25).is_empty());
    }

    #[test]
    fn stroke_extends_half_width_outside() {
        let style = StrokeStyle { width: 4.0, ..StrokeStyle::default() };
        let mesh = tessellate_stroke(&square(10.0), &style, 0.25);
        let min_x = mesh.vertices.iter().map(|v| v[0]).fold(f32::INFINITY, f32::min);
        let max_x = mesh.vertices.iter().map(|v| v[0]).fold(f32::NEG_INFINITY, f32::max);
        assert!((min_x + 2.0).abs() < 1e-3, "{min_x}");
        assert!((max_x - 12.0).abs() < 1e-3, "{max_x}");
    }

    #[test]
    fn zero_width_stroke_is_empty() {
        let style = StrokeStyle { width: 0.0, ..StrokeStyle::default() };
        assert!(tessellate_stroke(&square(10.0), &style, 0.25).is_empty());
    }

    #[test]
    fn cache_invalidate_drops_everything() {
        let mut cache = GeometryCache::default();
        cache.outline = Some(square(1.0));
        cache.fill = Some((FillKey { rule: FillRule::NonZero, tolerance: 0.25 }, Mesh::default()));
        cache.invalidate();
        assert!(cache.outline.is_none() && cache.fill.is_none() && cache.stroke.is_none());
    }
}
