//! Low-level 2D helpers: orientation, hulls, ring predicates, segment distances.
//!
//! Rings passed here are open (no repeated closing vertex) unless a function
//! says otherwise; `open_ring` strips the closing vertex of a closed ring.

use std::cmp::Ordering;
use std::f64::consts::PI;

use super::types::Vec2;

#[inline]
pub(crate) fn cross(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

#[inline]
pub(crate) fn dist(a: Vec2, b: Vec2) -> f64 {
    (b - a).norm()
}

/// Normalize an angle (radians) into [0, 2π).
#[inline]
pub fn normalized_angle(a: f64) -> f64 {
    let mut x = a % (2.0 * PI);
    if x < 0.0 {
        x += 2.0 * PI;
    }
    if x >= 2.0 * PI {
        x -= 2.0 * PI;
    }
    x
}

/// Wrap an angle (radians) into (-π, π].
#[inline]
pub(crate) fn wrap_angle(a: f64) -> f64 {
    let mut x = a;
    while x <= -PI {
        x += 2.0 * PI;
    }
    while x > PI {
        x -= 2.0 * PI;
    }
    x
}

/// Strip the repeated closing vertex of a closed ring.
#[inline]
pub(crate) fn open_ring(pts: &[Vec2]) -> &[Vec2] {
    if pts.len() > 1 && pts[0] == pts[pts.len() - 1] {
        &pts[..pts.len() - 1]
    } else {
        pts
    }
}

/// Shoelace signed area (positive for CCW), open or closed ring.
pub(crate) fn signed_area(ring: &[Vec2]) -> f64 {
    let ring = open_ring(ring);
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut s = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        s += p.x * q.y - q.x * p.y;
    }
    0.5 * s
}

/// Andrew's monotone chain convex hull over point indices (CCW, no collinear points).
pub(crate) fn convex_hull_indices(points: &[Vec2]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..points.len()).collect();
    if idx.len() < 3 {
        return idx;
    }
    idx.sort_by(|&a, &b| {
        let (pa, pb) = (points[a], points[b]);
        match pa.x.partial_cmp(&pb.x).unwrap_or(Ordering::Equal) {
            Ordering::Equal => pa.y.partial_cmp(&pb.y).unwrap_or(Ordering::Equal),
            o => o,
        }
    });
    idx.dedup_by(|a, b| (points[*a] - points[*b]).norm() < 1e-12);
    if idx.len() < 3 {
        return idx;
    }
    let mut lower: Vec<usize> = Vec::with_capacity(idx.len());
    for &i in &idx {
        while lower.len() >= 2
            && cross(
                points[lower[lower.len() - 2]],
                points[lower[lower.len() - 1]],
                points[i],
            ) <= 0.0
        {
            lower.pop();
        }
        lower.push(i);
    }
    let mut upper: Vec<usize> = Vec::with_capacity(idx.len());
    for &i in idx.iter().rev() {
        while upper.len() >= 2
            && cross(
                points[upper[upper.len() - 2]],
                points[upper[upper.len() - 1]],
                points[i],
            ) <= 0.0
        {
            upper.pop();
        }
        upper.push(i);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Even-odd point-in-ring test. Points on the boundary may land either side.
pub(crate) fn ring_contains(ring: &[Vec2], p: Vec2) -> bool {
    let ring = open_ring(ring);
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Euclidean distance from `p` to segment `ab`.
pub(crate) fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= 0.0 {
        return dist(p, a);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    dist(p, a + ab * t)
}

/// True if segments `ab` and `cd` share at least one point (touching counts).
pub(crate) fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
    {
        return true;
    }
    point_segment_distance(a, c, d) <= eps
        || point_segment_distance(b, c, d) <= eps
        || point_segment_distance(c, a, b) <= eps
        || point_segment_distance(d, a, b) <= eps
}

/// True if segments cross at a single point interior to both.
pub(crate) fn segments_cross_properly(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

/// Minimum distance between segments `ab` and `cd` (0 when they intersect).
pub(crate) fn segment_segment_distance(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> f64 {
    if segments_cross_properly(a, b, c, d, 0.0) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

/// Intersection point of segments `ab` and `cd` when they are not parallel.
pub(crate) fn segment_intersection_point(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Vec2> {
    let r = b - a;
    let s = d - c;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-15 {
        return None;
    }
    let qp = c - a;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    if (-1e-12..=1.0 + 1e-12).contains(&t) && (-1e-12..=1.0 + 1e-12).contains(&u) {
        Some(a + r * t)
    } else {
        None
    }
}

/// Intersection of the circle centered at `c` (radius `r`) with segment `ab`,
/// taking the root furthest along the segment.
pub(crate) fn line_circle_intersection(c: Vec2, r: f64, a: Vec2, b: Vec2) -> Vec2 {
    let d = b - a;
    let f = a - c;
    let qa = d.dot(&d);
    let qb = 2.0 * f.dot(&d);
    let qc = f.dot(&f) - r * r;
    let det = qb * qb - 4.0 * qa * qc;
    if qa <= 0.0 || det < 0.0 {
        return b;
    }
    let t = (-qb + det.sqrt()) / (2.0 * qa);
    a + d * t
}
