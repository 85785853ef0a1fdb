//! Point sets: the coordinate sequence behind every feature part.
//!
//! A `PointSet` is a single point, an open or closed line, or a polygon ring.
//! Polygon rings are stored closed (first vertex repeated at the end) so that
//! ring length and closed-line checks behave the same as for closed lines.
//!
//! Invariant: `bbox` always reflects `pts`; every mutation goes through a
//! constructor that recomputes it.

use super::types::{BBox, GeomCfg, GeometryType, OrientedBox, Vec2};
use super::util::{convex_hull_indices, dist, normalized_angle, open_ring, ring_contains, signed_area};
use crate::error::GeometryError;

#[derive(Clone, Debug)]
pub struct PointSet {
    kind: GeometryType,
    pts: Vec<Vec2>,
    bbox: BBox,
}

/// Cumulative measures along a line: per-segment lengths and the distance
/// from the first vertex to every vertex.
#[derive(Clone, Debug)]
pub struct LineMeasure {
    pub segment_lengths: Vec<f64>,
    pub distance_to_vertex: Vec<f64>,
    pub total: f64,
}

impl PointSet {
    /// Build a point set, validating coordinates and point counts.
    ///
    /// Polygon rings are closed if the caller passed an open ring.
    pub fn new(kind: GeometryType, mut pts: Vec<Vec2>) -> Result<Self, GeometryError> {
        if let Some(index) = pts.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(GeometryError::NonFinite { index });
        }
        let needed = match kind {
            GeometryType::Point => 1,
            GeometryType::Line => 2,
            GeometryType::Polygon => 3,
        };
        if kind == GeometryType::Polygon && !pts.is_empty() && pts[0] != pts[pts.len() - 1] {
            pts.push(pts[0]);
        }
        let got = match kind {
            GeometryType::Polygon => pts.len().saturating_sub(1),
            _ => pts.len(),
        };
        if got < needed {
            return Err(GeometryError::TooFewPoints { needed, got });
        }
        Ok(Self::from_parts(kind, pts))
    }

    pub(crate) fn from_parts(kind: GeometryType, pts: Vec<Vec2>) -> Self {
        let bbox = BBox::from_points(&pts);
        Self { kind, pts, bbox }
    }

    #[inline]
    pub fn kind(&self) -> GeometryType {
        self.kind
    }

    #[inline]
    pub fn pts(&self) -> &[Vec2] {
        &self.pts
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// First and last vertex coincide.
    pub fn is_closed(&self, cfg: GeomCfg) -> bool {
        self.pts.len() > 2 && cfg.near_pt(self.pts[0], self.pts[self.pts.len() - 1])
    }

    /// Line length, or ring perimeter for polygons; zero for points.
    pub fn length(&self) -> f64 {
        self.pts.windows(2).map(|w| dist(w[0], w[1])).sum()
    }

    /// Unsigned ring area (zero unless this is a polygon ring).
    pub fn ring_area(&self) -> f64 {
        match self.kind {
            GeometryType::Polygon => signed_area(&self.pts).abs(),
            _ => 0.0,
        }
    }

    #[inline]
    pub(crate) fn signed_ring_area(&self) -> f64 {
        signed_area(&self.pts)
    }

    /// Area centroid for rings, length-weighted centroid for lines.
    pub fn centroid(&self) -> Vec2 {
        match self.kind {
            GeometryType::Point => self.pts[0],
            GeometryType::Line => line_centroid(&self.pts),
            GeometryType::Polygon => ring_centroid(&self.pts).unwrap_or_else(|| line_centroid(&self.pts)),
        }
    }

    /// Point-in-polygon test against the ring (holes are handled by the owner).
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.kind == GeometryType::Polygon && ring_contains(&self.pts, p)
    }

    pub fn measure(&self) -> LineMeasure {
        let n = self.pts.len();
        let mut segment_lengths = Vec::with_capacity(n.saturating_sub(1));
        let mut distance_to_vertex = Vec::with_capacity(n);
        let mut total = 0.0;
        distance_to_vertex.push(0.0);
        for w in self.pts.windows(2) {
            let l = dist(w[0], w[1]);
            segment_lengths.push(l);
            total += l;
            distance_to_vertex.push(total);
        }
        LineMeasure {
            segment_lengths,
            distance_to_vertex,
            total,
        }
    }

    /// Point at distance `d` along the line.
    ///
    /// Negative distances extrapolate before the first vertex along the
    /// end-to-end chord; distances past the end clamp to the last vertex.
    pub fn point_by_distance(&self, m: &LineMeasure, d: f64) -> Vec2 {
        let n = self.pts.len();
        let mut i = 0usize;
        if d >= 0.0 {
            while i < n && m.distance_to_vertex[i] <= d {
                i += 1;
            }
            i = i.saturating_sub(1);
        }
        if i + 1 < n {
            let (delta, ratio) = if d < 0.0 {
                let chord = self.pts[n - 1] - self.pts[0];
                let len = chord.norm();
                if len <= 0.0 {
                    return self.pts[0];
                }
                (chord, d / len)
            } else {
                let seg = m.segment_lengths[i];
                if seg <= 0.0 {
                    return self.pts[i];
                }
                (self.pts[i + 1] - self.pts[i], (d - m.distance_to_vertex[i]) / seg)
            };
            self.pts[i] + delta * ratio
        } else {
            self.pts[i]
        }
    }

    /// Extend a line at both ends along its end directions.
    ///
    /// With `smooth > 0` the direction at each end is taken from the point
    /// `smooth` units along the line instead of the adjacent vertex.
    pub fn extend_line_by_distance(&self, start: f64, end: f64, smooth: f64) -> PointSet {
        if self.pts.len() < 2 {
            return self.clone();
        }
        let mut pts = self.pts.clone();
        let new_start = if start > 0.0 {
            extension_point(&self.pts, start, smooth)
        } else {
            None
        };
        let new_end = if end > 0.0 {
            let rev: Vec<Vec2> = self.pts.iter().rev().copied().collect();
            extension_point(&rev, end, smooth)
        } else {
            None
        };
        if let Some(p) = new_start {
            pts.insert(0, p);
        }
        if let Some(p) = new_end {
            pts.push(p);
        }
        PointSet::from_parts(self.kind, pts)
    }

    pub fn convex_hull(&self) -> Vec<Vec2> {
        let pts = open_ring(&self.pts);
        convex_hull_indices(pts).into_iter().map(|i| pts[i]).collect()
    }

    /// Minimum-area oriented rectangle around the convex hull.
    ///
    /// The box angle is normalized into [0, π/2); on ties the first hull edge wins.
    pub fn oriented_bounding_box(&self) -> Result<OrientedBox, GeometryError> {
        let hull = self.convex_hull();
        if hull.len() < 3 {
            return Err(GeometryError::DegenerateHull);
        }
        let quarter = std::f64::consts::FRAC_PI_2;
        let mut best: Option<OrientedBox> = None;
        for k in 0..hull.len() {
            let e = hull[(k + 1) % hull.len()] - hull[k];
            if e.norm() < 1e-12 {
                continue;
            }
            let theta = normalized_angle(e.y.atan2(e.x)) % quarter;
            let u = Vec2::new(theta.cos(), theta.sin());
            let v = Vec2::new(-theta.sin(), theta.cos());
            let (mut umin, mut umax, mut vmin, mut vmax) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
            for p in &hull {
                let pu = p.dot(&u);
                let pv = p.dot(&v);
                umin = umin.min(pu);
                umax = umax.max(pu);
                vmin = vmin.min(pv);
                vmax = vmax.max(pv);
            }
            let width = umax - umin;
            let length = vmax - vmin;
            if best.as_ref().map_or(true, |b| width * length < b.area()) {
                best = Some(OrientedBox {
                    corners: [
                        u * umin + v * vmax,
                        u * umax + v * vmax,
                        u * umax + v * vmin,
                        u * umin + v * vmin,
                    ],
                    alpha: theta,
                    width,
                    length,
                });
            }
        }
        best.ok_or(GeometryError::DegenerateHull)
    }

    /// Same ring in the opposite vertex order.
    pub(crate) fn reversed(&self) -> PointSet {
        let pts: Vec<Vec2> = self.pts.iter().rev().copied().collect();
        PointSet::from_parts(self.kind, pts)
    }
}

fn extension_point(pts: &[Vec2], distance: f64, smooth: f64) -> Option<Vec2> {
    let p0 = pts[0];
    let mut p1 = pts[1];
    if smooth > 0.0 {
        let mut consumed = 0.0;
        for w in pts.windows(2) {
            let seg = dist(w[0], w[1]);
            if seg > 0.0 && consumed + seg >= smooth {
                let t = (smooth - consumed) / seg;
                p1 = w[0] + (w[1] - w[0]) * t;
                break;
            }
            consumed += seg;
            p1 = w[1];
        }
    }
    let dir = p0 - p1;
    let len = dir.norm();
    if len <= 0.0 {
        return None;
    }
    Some(p0 + dir * (distance / len))
}

fn line_centroid(pts: &[Vec2]) -> Vec2 {
    let mut acc = Vec2::zeros();
    let mut total = 0.0;
    for w in pts.windows(2) {
        let l = dist(w[0], w[1]);
        acc += (w[0] + w[1]) * 0.5 * l;
        total += l;
    }
    if total > 0.0 {
        acc / total
    } else {
        pts[0]
    }
}

/// Area centroid of a ring; `None` for zero-area rings.
pub(crate) fn ring_centroid(ring: &[Vec2]) -> Option<Vec2> {
    let ring = open_ring(ring);
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let origin = ring[0];
    let mut a = 0.0;
    let mut c = Vec2::zeros();
    for i in 0..n {
        let p = ring[i] - origin;
        let q = ring[(i + 1) % n] - origin;
        let f = p.x * q.y - q.x * p.y;
        a += f;
        c += (p + q) * f;
    }
    if a.abs() < 1e-15 {
        return None;
    }
    Some(origin + c / (3.0 * a))
}
