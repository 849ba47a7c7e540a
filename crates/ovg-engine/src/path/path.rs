use crate::coords::Rect;
use crate::error::{VgError, VgResult};
use crate::math::Mat3;

use super::capabilities::PathCapabilities;
use super::datatype::{CoordBuffer, PathDatatype};
use super::geometry::{
    tessellate_fill, tessellate_stroke, FillKey, GeometryCache, Mesh, StrokeKey,
};
use super::outline::{build_events, flattened_bounds, resolve_segments, Resolved};
use super::segment::{coord_count, Segment, SegmentCommand};
use super::style::{FillRule, StrokeStyle};

/// The only path format the engine understands.
pub const PATH_FORMAT_STANDARD: i32 = 0;

/// Creation parameters for a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathDesc {
    pub format: i32,
    pub datatype: PathDatatype,
    pub scale: f32,
    pub bias: f32,
    pub segment_capacity_hint: usize,
    pub coord_capacity_hint: usize,
    pub capabilities: PathCapabilities,
}

impl Default for PathDesc {
    fn default() -> Self {
        Self {
            format: PATH_FORMAT_STANDARD,
            datatype: PathDatatype::F32,
            scale: 1.0,
            bias: 0.0,
            segment_capacity_hint: 0,
            coord_capacity_hint: 0,
            capabilities: PathCapabilities::all(),
        }
    }
}

impl PathDesc {
    #[inline]
    pub fn with_capabilities(mut self, capabilities: PathCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[inline]
    pub fn with_datatype(mut self, datatype: PathDatatype, scale: f32, bias: f32) -> Self {
        self.datatype = datatype;
        self.scale = scale;
        self.bias = bias;
        self
    }
}

/// Retained outline: segments plus coordinates in the declared datatype.
///
/// Invariant: `coords.len() == coord_count(&segments)`. Every mutation
/// either keeps it or fails without touching the path.
#[derive(Debug, Clone)]
pub struct Path {
    format: i32,
    scale: f32,
    bias: f32,
    capabilities: PathCapabilities,
    segments: Vec<Segment>,
    coords: CoordBuffer,
    cache: GeometryCache,
}

impl Path {
    pub fn new(desc: PathDesc) -> VgResult<Self> {
        if desc.format != PATH_FORMAT_STANDARD {
            return Err(VgError::UnsupportedFormat);
        }
        if !desc.scale.is_finite() || desc.scale == 0.0 || !desc.bias.is_finite() {
            return Err(VgError::IllegalArgument("path scale must be finite and non-zero"));
        }

        Ok(Self {
            format: desc.format,
            scale: desc.scale,
            bias: desc.bias,
            capabilities: desc.capabilities,
            segments: Vec::with_capacity(desc.segment_capacity_hint),
            coords: CoordBuffer::with_capacity(desc.datatype, desc.coord_capacity_hint),
            cache: GeometryCache::default(),
        })
    }

    // ── parameters ────────────────────────────────────────────────────────

    #[inline]
    pub fn format(&self) -> i32 {
        self.format
    }

    #[inline]
    pub fn datatype(&self) -> PathDatatype {
        self.coords.datatype()
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    #[inline]
    pub fn capabilities(&self) -> PathCapabilities {
        self.capabilities
    }

    #[inline]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn num_coords(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All coordinates decoded to user space.
    pub fn decoded_coords(&self) -> Vec<f32> {
        (0..self.coords.len())
            .map(|i| self.coords.value(i, self.scale, self.bias))
            .collect()
    }

    fn require(&self, caps: PathCapabilities, what: &'static str) -> VgResult<()> {
        if self.capabilities.contains(caps) {
            Ok(())
        } else {
            Err(VgError::CapabilityDenied(what))
        }
    }

    // ── mutation ──────────────────────────────────────────────────────────

    /// Appends `segments`, encoding `coords` into the path datatype.
    pub fn append(&mut self, segments: &[Segment], coords: &[f32]) -> VgResult<()> {
        self.require(PathCapabilities::APPEND_TO, "append to path")?;
        if coord_count(segments) != coords.len() {
            return Err(VgError::IllegalArgument("coordinate count does not match segments"));
        }
        if coords.iter().any(|v| !v.is_finite()) {
            return Err(VgError::IllegalArgument("non-finite path coordinate"));
        }

        self.segments.extend_from_slice(segments);
        for &v in coords {
            self.coords.push_value(v, self.scale, self.bias);
        }
        self.cache.invalidate();
        Ok(())
    }

    /// Appends `segments` with raw little-endian coordinate bytes already in
    /// the path datatype.
    pub fn append_raw(&mut self, segments: &[Segment], data: &[u8]) -> VgResult<()> {
        self.require(PathCapabilities::APPEND_TO, "append to path")?;
        let decoded = CoordBuffer::from_le_bytes(self.coords.datatype(), data, coord_count(segments))?;
        if !decoded.all_finite(self.scale, self.bias) {
            return Err(VgError::IllegalArgument("non-finite path coordinate"));
        }

        self.coords.append(decoded)?;
        self.segments.extend_from_slice(segments);
        self.cache.invalidate();
        Ok(())
    }

    /// Appends the decoded contents of `src`, re-encoded into this path's
    /// datatype.
    pub fn append_path(&mut self, src: &Path) -> VgResult<()> {
        src.require(PathCapabilities::APPEND_FROM, "append from path")?;
        self.append(&src.segments, &src.decoded_coords())
    }

    /// Overwrites the coordinates of `count` segments starting at
    /// `start_segment`.
    pub fn modify_coords(
        &mut self,
        start_segment: usize,
        count: usize,
        coords: &[f32],
    ) -> VgResult<()> {
        self.require(PathCapabilities::MODIFY, "modify path")?;
        let end = start_segment
            .checked_add(count)
            .filter(|&e| e <= self.segments.len())
            .ok_or(VgError::IllegalArgument("segment range outside path"))?;

        let first = coord_count(&self.segments[..start_segment]);
        let n = coord_count(&self.segments[start_segment..end]);
        if coords.len() != n {
            return Err(VgError::IllegalArgument("coordinate count does not match segments"));
        }
        if coords.iter().any(|v| !v.is_finite()) {
            return Err(VgError::IllegalArgument("non-finite path coordinate"));
        }

        for (i, &v) in coords.iter().enumerate() {
            self.coords.set_value(first + i, v, self.scale, self.bias);
        }
        self.cache.invalidate();
        Ok(())
    }

    /// Drops all segment data and replaces the capability mask.
    pub fn clear(&mut self, capabilities: PathCapabilities) {
        self.segments.clear();
        self.coords.clear();
        self.capabilities = capabilities;
        self.cache.invalidate();
    }

    pub fn remove_capabilities(&mut self, capabilities: PathCapabilities) {
        self.capabilities.remove(capabilities);
    }

    /// Appends `src` transformed by `m`.
    ///
    /// Output segments are absolute: shorthand lines become lines, smooth
    /// curves become explicit curves and arcs get transformed radii and
    /// rotation (swapping direction under a reflection).
    pub fn append_transformed(&mut self, src: &Path, m: Mat3) -> VgResult<()> {
        src.require(PathCapabilities::TRANSFORM_FROM, "transform from path")?;
        self.require(PathCapabilities::TRANSFORM_TO, "transform to path")?;

        let mut segments = Vec::with_capacity(src.segments.len());
        let mut coords = Vec::with_capacity(src.coords.len());
        let xf = |p| m.transform_point(p);

        resolve_segments(&src.segments, &src.decoded_coords(), |_, seg| match seg {
            Resolved::Close => segments.push(Segment::CLOSE),
            Resolved::Move(p) => {
                segments.push(Segment::abs(SegmentCommand::MoveTo));
                coords.extend(xf(p).to_array());
            }
            Resolved::Line(p) => {
                segments.push(Segment::abs(SegmentCommand::LineTo));
                coords.extend(xf(p).to_array());
            }
            Resolved::Quad(c, p) => {
                segments.push(Segment::abs(SegmentCommand::QuadTo));
                coords.extend(xf(c).to_array());
                coords.extend(xf(p).to_array());
            }
            Resolved::Cubic(c1, c2, p) => {
                segments.push(Segment::abs(SegmentCommand::CubicTo));
                coords.extend(xf(c1).to_array());
                coords.extend(xf(c2).to_array());
                coords.extend(xf(p).to_array());
            }
            Resolved::Arc { radii, rotation, large, ccw, to } => {
                let (rh, rv, rot, flipped) = transform_ellipse(m, radii, rotation);
                let ccw = ccw != flipped;
                let command = match (large, ccw) {
                    (false, true) => SegmentCommand::SmallCcwArcTo,
                    (false, false) => SegmentCommand::SmallCwArcTo,
                    (true, true) => SegmentCommand::LargeCcwArcTo,
                    (true, false) => SegmentCommand::LargeCwArcTo,
                };
                segments.push(Segment::abs(command));
                coords.extend([rh, rv, rot]);
                coords.extend(xf(to).to_array());
            }
        });

        self.append(&segments, &coords)
    }

    // ── geometry ──────────────────────────────────────────────────────────

    fn outline(&mut self) -> &[lyon::path::PathEvent] {
        if self.cache.outline.is_none() {
            let events = build_events(&self.segments, &self.decoded_coords());
            self.cache.outline = Some(events);
        }
        self.cache.outline.as_deref().unwrap_or_default()
    }

    /// Fill mesh in user space, tessellated on first use per key.
    pub fn fill_mesh(&mut self, rule: FillRule, tolerance: f32) -> &Mesh {
        let key = FillKey { rule, tolerance };
        if self.cache.fill.as_ref().is_none_or(|(k, _)| *k != key) {
            let mesh = tessellate_fill(self.outline(), rule, tolerance);
            log::debug!(
                "path fill tessellated: {} vertices, {} triangles",
                mesh.vertices.len(),
                mesh.indices.len() / 3
            );
            return &self.cache.fill.insert((key, mesh)).1;
        }
        &self.cache.fill.get_or_insert_with(|| (key, Mesh::default())).1
    }

    /// Stroke mesh in user space, tessellated on first use per key.
    pub fn stroke_mesh(&mut self, style: &StrokeStyle, tolerance: f32) -> &Mesh {
        let key = StrokeKey { style: *style, tolerance };
        if self.cache.stroke.as_ref().is_none_or(|(k, _)| *k != key) {
            let mesh = tessellate_stroke(self.outline(), style, tolerance);
            return &self.cache.stroke.insert((key, mesh)).1;
        }
        &self.cache.stroke.get_or_insert_with(|| (key, Mesh::default())).1
    }

    /// Bounds of the fill outline in user space; `None` for an empty path.
    pub fn bounds(&mut self, tolerance: f32) -> VgResult<Option<Rect>> {
        self.require(PathCapabilities::PATH_BOUNDS, "path bounds")?;
        Ok(flattened_bounds(self.outline(), tolerance, None))
    }

    /// Bounds of the fill outline after applying `m`.
    pub fn transformed_bounds(&mut self, m: Mat3, tolerance: f32) -> VgResult<Option<Rect>> {
        self.require(PathCapabilities::PATH_TRANSFORMED_BOUNDS, "path transformed bounds")?;
        Ok(flattened_bounds(self.outline(), tolerance, Some(m)))
    }
}

/// Maps the ellipse `R(rotation) · S(radii)` through the linear part of `m`.
///
/// Returns the new radii, rotation in degrees, and whether `m` reverses
/// orientation.
fn transform_ellipse(m: Mat3, radii: crate::coords::Vec2, rotation: f32) -> (f32, f32, f32, bool) {
    let (s, c) = rotation.to_radians().sin_cos();
    // A = L · R · S, as a 2×2 [[a, b], [cc, d]].
    let l = m.m;
    let r = [[c * radii.x, -s * radii.y], [s * radii.x, c * radii.y]];
    let a = l[0][0] * r[0][0] + l[0][1] * r[1][0];
    let b = l[0][0] * r[0][1] + l[0][1] * r[1][1];
    let cc = l[1][0] * r[0][0] + l[1][1] * r[1][0];
    let d = l[1][0] * r[0][1] + l[1][1] * r[1][1];

    // Polar decomposition into rotation(phi) · scale(sx, sy) · rotation(theta).
    let e = (a + d) * 0.5;
    let f = (a - d) * 0.5;
    let g = (cc + b) * 0.5;
    let h = (cc - b) * 0.5;
    let q = (e * e + h * h).sqrt();
    let rr = (f * f + g * g).sqrt();
    let sx = q + rr;
    let sy = q - rr;
    let a1 = g.atan2(f);
    let a2 = h.atan2(e);
    let phi = (a2 + a1) * 0.5;

    let det = l[0][0] * l[1][1] - l[0][1] * l[1][0];
    (sx.abs(), sy.abs(), phi.to_degrees(), det < 0.0)
}
