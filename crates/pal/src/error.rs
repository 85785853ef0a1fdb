//! Error type for geometry construction and geometry-engine operations.
//!
//! Generators never surface these to callers: they log and produce no
//! candidate for the failing operation. Only construction (`FeaturePart::new`)
//! and `FeaturePart::merge_with` hand them back.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("geometry needs at least {needed} points, got {got}")]
    TooFewPoints { needed: usize, got: usize },
    #[error("coordinate {index} is not finite")]
    NonFinite { index: usize },
    #[error("convex hull is degenerate")]
    DegenerateHull,
    #[error("geometry has zero length")]
    ZeroLength,
    #[error("ring is empty")]
    EmptyRing,
    #[error("operation requires a line geometry")]
    NotALine,
    #[error("lines do not merge into a single simple line")]
    NotMergeable,
}
