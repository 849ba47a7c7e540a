//! Path store: retained outlines and their derived geometry.
//!
//! A [`Path`] keeps OpenVG-style segments with coordinates encoded in its
//! datatype. Fill and stroke meshes are tessellated on demand with lyon and
//! cached until the next mutation.

mod capabilities;
mod datatype;
mod geometry;
mod outline;
mod path;
mod segment;
mod style;
pub mod vgu;

pub use capabilities::PathCapabilities;
pub use datatype::{CoordBuffer, PathDatatype};
pub use geometry::{tessellate_fill, tessellate_stroke, Mesh};
pub use path::{Path, PathDesc, PATH_FORMAT_STANDARD};
pub use segment::{coord_count, Segment, SegmentCommand};
pub use style::{CapStyle, FillRule, JoinStyle, StrokeStyle};
