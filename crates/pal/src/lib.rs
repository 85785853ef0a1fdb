//! Label candidate generation.
//!
//! Purpose
//! - Turn map features (points, lines, polygons) plus their label metadata
//!   into scored candidate placements for a downstream placement optimizer.
//! - The crate stops at candidates: choosing among them is the optimizer's
//!   job and lives elsewhere.
//!
//! Layout
//! - `geom`: point sets and the geometry-engine capabilities the generators need.
//! - `label`: settings, per-feature metadata, `LabelPosition` candidates.
//! - `part`: `FeaturePart` and the generator families, plus named cost tables.
//! - `engine`, `feedback`: per-pass densities and cooperative cancellation.
//! - `synth`: seeded synthetic features.
//!
//! API Policy
//! - This crate is workspace-internal. There is no stable public API;
//!   `api` is the curated surface for the CLI.

pub mod api;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod geom;
pub mod label;
pub mod part;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::GeometryError;
pub use geom::Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::engine::Pal;
    pub use crate::feedback::{CancelFlag, Feedback};
    pub use crate::geom::{BBox, GeometryType, Vec2};
    pub use crate::label::{Arrangement, LabelFeature, LabelPosition, LayerSettings, PalSettings, Quadrant, Size};
    pub use crate::part::FeaturePart;
}
