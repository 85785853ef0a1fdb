//! Line merging: join two lines sharing an endpoint into one simple line.

use super::pointset::PointSet;
use super::types::{GeomCfg, GeometryType, Vec2};
use crate::error::GeometryError;

/// Merge two lines that share an endpoint.
///
/// Tried in order: end of `a` to start of `b`, end to end, start to end,
/// start to start. Lines without a shared endpoint give `NotMergeable`.
pub fn line_merge(a: &PointSet, b: &PointSet, cfg: GeomCfg) -> Result<PointSet, GeometryError> {
    if a.kind() != GeometryType::Line || b.kind() != GeometryType::Line {
        return Err(GeometryError::NotALine);
    }
    let (pa, pb) = (a.pts(), b.pts());
    let (a0, a1) = (pa[0], pa[pa.len() - 1]);
    let (b0, b1) = (pb[0], pb[pb.len() - 1]);
    let joined: Vec<Vec2> = if cfg.near_pt(a1, b0) {
        pa.iter().chain(pb.iter().skip(1)).copied().collect()
    } else if cfg.near_pt(a1, b1) {
        pa.iter().chain(pb.iter().rev().skip(1)).copied().collect()
    } else if cfg.near_pt(a0, b1) {
        pb.iter().chain(pa.iter().skip(1)).copied().collect()
    } else if cfg.near_pt(a0, b0) {
        pa.iter().rev().chain(pb.iter().skip(1)).copied().collect()
    } else {
        return Err(GeometryError::NotMergeable);
    };
    PointSet::new(GeometryType::Line, joined)
}
