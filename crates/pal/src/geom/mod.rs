//! 2D geometry for label placement.
//!
//! Purpose
//! - Provide the point-set representation behind every feature part, plus
//!   the geometry-engine capabilities the generators rely on: convex hull,
//!   oriented bounding boxes, concave polygon splitting, ring buffering,
//!   prepared containment/intersection predicates, point-on-surface, line
//!   merge and the touches predicate.
//! - Keep everything eps-aware through `GeomCfg`; no external geometry engine.
//!
//! Code cross-refs: `PointSet`, `PreparedGeometry`, `OrientedBox`, `GeomCfg`.

pub mod buffer;
pub mod merge;
pub mod pointset;
pub mod prepared;
pub mod split;
mod types;
mod util;

pub use buffer::offset_ring;
pub use merge::line_merge;
pub use pointset::{LineMeasure, PointSet};
pub use prepared::PreparedGeometry;
pub use split::split_polygons;
pub use types::{BBox, GeomCfg, GeometryType, OrientedBox, Vec2};
pub use util::normalized_angle;
pub(crate) use util::{line_circle_intersection, wrap_angle};
