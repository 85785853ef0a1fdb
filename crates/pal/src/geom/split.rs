//! Polygon splitting into placement-friendly pieces.
//!
//! Purpose
//! - Reduce a concave ring into near-convex pieces before fitting oriented
//!   boxes, so that interior grids are not wasted on deep concavities.
//!
//! Approach
//! - Compare the ring with its convex hull. Every run of ring vertices between
//!   two consecutive hull vertices is a pocket. The largest pocket, if its
//!   area exceeds the label area, is cut at its deepest vertex by casting a
//!   ray along the inward normal of the hull edge that bounds the pocket.
//! - Pieces are pushed back on the work queue until no pocket is large
//!   enough or the iteration limit is hit.

use tracing::debug;

use super::pointset::PointSet;
use super::types::{GeometryType, Vec2};
use super::util::{convex_hull_indices, open_ring, point_segment_distance, signed_area};

const MAX_SPLITS: usize = 64;

/// Split a polygon ring for a label of size `label_w` x `label_h`.
///
/// Always returns at least the input ring (as a CCW piece) when it is valid.
pub fn split_polygons(ring: &PointSet, label_w: f64, label_h: f64) -> Vec<PointSet> {
    let mut first: Vec<Vec2> = open_ring(ring.pts()).to_vec();
    if first.len() < 3 {
        return Vec::new();
    }
    if signed_area(&first) < 0.0 {
        first.reverse();
    }
    let label_area = label_w * label_h;
    let mut queue = vec![first];
    let mut out: Vec<PointSet> = Vec::new();
    let mut splits = 0usize;
    while let Some(shape) = queue.pop() {
        let cut = if splits < MAX_SPLITS {
            find_cut(&shape, label_area)
        } else {
            None
        };
        match cut.and_then(|c| cut_ring(&shape, c)) {
            Some((a, b)) => {
                splits += 1;
                queue.push(a);
                queue.push(b);
            }
            None => out.push(close(shape)),
        }
    }
    debug!(pieces = out.len(), splits, "split polygon");
    out
}

#[derive(Clone, Copy, Debug)]
struct Cut {
    vertex: usize,
    dir: Vec2,
}

fn find_cut(ring: &[Vec2], label_area: f64) -> Option<Cut> {
    let n = ring.len();
    let mut hull = convex_hull_indices(ring);
    if hull.len() < 3 || hull.len() == n {
        return None;
    }
    hull.sort_unstable();
    let mut best: Option<(f64, Cut)> = None;
    for k in 0..hull.len() {
        let h0 = hull[k];
        let h1 = hull[(k + 1) % hull.len()];
        let gap = (h1 + n - h0) % n;
        if gap <= 1 {
            continue;
        }
        let (a, b) = (ring[h0], ring[h1]);
        let edge = b - a;
        let len = edge.norm();
        if len <= 0.0 {
            continue;
        }
        let pocket: Vec<Vec2> = (0..=gap).map(|s| ring[(h0 + s) % n]).collect();
        let area = signed_area(&pocket).abs();
        let mut deepest = None;
        let mut depth = 0.0;
        for s in 1..gap {
            let idx = (h0 + s) % n;
            let d = point_segment_distance(ring[idx], a, b);
            if d > depth {
                depth = d;
                deepest = Some(idx);
            }
        }
        let Some(vertex) = deepest else { continue };
        if depth < 1e-9 {
            continue;
        }
        if best.as_ref().map_or(true, |(ba, _)| area > *ba) {
            let dir = Vec2::new(-edge.y, edge.x) / len;
            best = Some((area, Cut { vertex, dir }));
        }
    }
    match best {
        Some((area, cut)) if area > label_area => Some(cut),
        _ => None,
    }
}

/// Cast the cut ray and split the ring at the first boundary hit.
fn cut_ring(ring: &[Vec2], cut: Cut) -> Option<(Vec<Vec2>, Vec<Vec2>)> {
    let n = ring.len();
    let k = cut.vertex;
    let origin = ring[k];
    let mut hit: Option<(f64, usize, Vec2)> = None;
    for j in 0..n {
        let j1 = (j + 1) % n;
        if j == k || j1 == k {
            continue;
        }
        if let Some(t) = ray_segment(origin, cut.dir, ring[j], ring[j1]) {
            if t > 1e-9 && hit.as_ref().map_or(true, |(bt, _, _)| t < *bt) {
                hit = Some((t, j, origin + cut.dir * t));
            }
        }
    }
    let (_, j, p) = hit?;
    let mut a = Vec::new();
    let mut i = k;
    loop {
        a.push(ring[i]);
        if i == j {
            break;
        }
        i = (i + 1) % n;
    }
    a.push(p);
    let mut b = vec![p];
    let mut i = (j + 1) % n;
    loop {
        b.push(ring[i]);
        if i == k {
            break;
        }
        i = (i + 1) % n;
    }
    dedup_ring(&mut a);
    dedup_ring(&mut b);
    let valid = |r: &Vec<Vec2>| r.len() >= 3 && signed_area(r) > 1e-12;
    if valid(&a) && valid(&b) {
        Some((a, b))
    } else {
        None
    }
}

fn ray_segment(o: Vec2, d: Vec2, a: Vec2, b: Vec2) -> Option<f64> {
    let s = b - a;
    let denom = d.perp(&s);
    if denom.abs() < 1e-15 {
        return None;
    }
    let qa = a - o;
    let t = qa.perp(&s) / denom;
    let u = qa.perp(&d) / denom;
    if (-1e-12..=1.0 + 1e-12).contains(&u) {
        Some(t)
    } else {
        None
    }
}

fn dedup_ring(r: &mut Vec<Vec2>) {
    r.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
    while r.len() > 1 && (r[0] - r[r.len() - 1]).norm() < 1e-12 {
        r.pop();
    }
}

fn close(mut ring: Vec<Vec2>) -> PointSet {
    if let Some(&p) = ring.first() {
        ring.push(p);
    }
    PointSet::from_parts(GeometryType::Polygon, ring)
}
