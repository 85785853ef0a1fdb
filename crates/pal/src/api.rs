//! Curated internal API for the CLI and benches (UNSTABLE).
//!
//! Important
//! - Not a stable public API. It is a convenience surface for workspace
//!   crates; breaking changes are allowed.
//! - Prefer these re-exports over reaching into submodules.

// Engine context and cancellation
pub use crate::engine::Pal;
pub use crate::feedback::{CancelFlag, Feedback, NoFeedback};
// Geometry
pub use crate::error::GeometryError;
pub use crate::geom::{BBox, GeomCfg, GeometryType, PointSet, PreparedGeometry, Vec2};
// Label metadata and candidates
pub use crate::label::{
    Arrangement, LabelFeature, LabelInfo, LabelPosition, LayerSettings, LineAnchorType, LinePlacementFlags,
    Margins, OffsetType, PalSettings, PolygonPlacementFlags, PredefinedPointPosition, Quadrant, Size,
    UpsideDownLabels,
};
// Feature parts and cost tables
pub use crate::part::{costs, FeaturePart};
// Synthetic scenes
pub use crate::synth::{
    draw_point, draw_polygon_radial, draw_polyline, draw_scene, ReplayToken as SynthReplay, SynthCfg,
    SynthGeometry,
};
