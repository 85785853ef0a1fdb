//! Outward ring offsetting.
//!
//! Convex corners get round joins approximated with `quadrant_segments`
//! segments per quarter turn; reflex corners get a miter point. The offset
//! is only used to sample anchor points around small polygons, so rings
//! that self-intersect after a large offset are not repaired.

use std::f64::consts::FRAC_PI_2;

use super::pointset::PointSet;
use super::types::{GeometryType, Vec2};
use super::util::{open_ring, signed_area};
use crate::error::GeometryError;

/// Offset `ring` outward by `distance`. The result is CCW and closed.
pub fn offset_ring(ring: &[Vec2], distance: f64, quadrant_segments: usize) -> Result<PointSet, GeometryError> {
    let mut pts: Vec<Vec2> = open_ring(ring).to_vec();
    pts.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
    if pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() < 1e-12 {
        pts.pop();
    }
    if pts.len() < 3 {
        return Err(GeometryError::EmptyRing);
    }
    if signed_area(&pts) < 0.0 {
        pts.reverse();
    }
    if distance <= 0.0 {
        return PointSet::new(GeometryType::Polygon, pts);
    }
    let qs = quadrant_segments.max(1);
    let step = FRAC_PI_2 / qs as f64;
    let n = pts.len();
    let mut out = Vec::with_capacity(n * (qs + 2));
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let cur = pts[i];
        let next = pts[(i + 1) % n];
        let n1 = outward_normal(prev, cur);
        let n2 = outward_normal(cur, next);
        let turn = (cur - prev).perp(&(next - cur));
        if turn > 0.0 {
            // convex: arc from n1 to n2 turning counter-clockwise
            let a1 = n1.y.atan2(n1.x);
            let mut sweep = n2.y.atan2(n2.x) - a1;
            while sweep < 0.0 {
                sweep += 2.0 * std::f64::consts::PI;
            }
            let steps = (sweep / step).ceil().max(1.0) as usize;
            for s in 0..=steps {
                let a = a1 + sweep * s as f64 / steps as f64;
                out.push(cur + Vec2::new(a.cos(), a.sin()) * distance);
            }
        } else {
            let denom = 1.0 + n1.dot(&n2);
            if denom < 1e-6 {
                out.push(cur + n1 * distance);
                out.push(cur + n2 * distance);
            } else {
                out.push(cur + (n1 + n2) * (distance / denom));
            }
        }
    }
    PointSet::new(GeometryType::Polygon, out)
}

#[inline]
fn outward_normal(a: Vec2, b: Vec2) -> Vec2 {
    let d = b - a;
    let len = d.norm();
    if len <= 0.0 {
        return Vec2::zeros();
    }
    Vec2::new(d.y, -d.x) / len
}
