//! Prepared geometry: the predicate engine behind a feature part.
//!
//! A `PreparedGeometry` flattens a point set and its holes into segment
//! lists once, then answers the queries the generators need:
//! containment (`contains_point`, `contains_candidate`), distances to a
//! candidate rectangle, `touches`, `point_on_surface` and the area
//! centroid with holes.
//!
//! Boundary conventions
//! - `contains_point` uses the even-odd rule; boundary points may land on
//!   either side.
//! - `contains_candidate` treats a rectangle touching the zone boundary from
//!   the inside as contained.

use super::pointset::{ring_centroid, PointSet};
use super::types::{BBox, GeomCfg, GeometryType, Vec2};
use super::util::{
    open_ring, point_segment_distance, ring_contains, segment_intersection_point,
    segment_segment_distance, segments_cross_properly, segments_intersect, signed_area,
};
use crate::error::GeometryError;

#[derive(Clone, Debug)]
pub struct PreparedGeometry {
    kind: GeometryType,
    exterior: Vec<Vec2>,
    holes: Vec<Vec<Vec2>>,
    bbox: BBox,
    cfg: GeomCfg,
}

impl PreparedGeometry {
    pub fn new(shape: &PointSet, holes: &[&PointSet], cfg: GeomCfg) -> Result<Self, GeometryError> {
        if shape.is_empty() {
            return Err(GeometryError::EmptyRing);
        }
        let holes = holes
            .iter()
            .filter(|h| h.len() >= 4)
            .map(|h| h.pts().to_vec())
            .collect();
        Ok(Self {
            kind: shape.kind(),
            exterior: shape.pts().to_vec(),
            holes,
            bbox: shape.bbox(),
            cfg,
        })
    }

    #[inline]
    pub fn kind(&self) -> GeometryType {
        self.kind
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    #[inline]
    pub fn exterior(&self) -> &[Vec2] {
        &self.exterior
    }

    fn rings(&self) -> impl Iterator<Item = &[Vec2]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }

    fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.rings().flat_map(|r| r.windows(2).map(|w| (w[0], w[1])))
    }

    /// Point inside the polygon and outside all holes.
    pub fn contains_point(&self, p: Vec2) -> bool {
        if self.kind != GeometryType::Polygon {
            return false;
        }
        if p.x < self.bbox.xmin || p.x > self.bbox.xmax || p.y < self.bbox.ymin || p.y > self.bbox.ymax {
            return false;
        }
        ring_contains(&self.exterior, p) && !self.holes.iter().any(|h| ring_contains(h, p))
    }

    /// Distance from `p` to the boundary (exterior and holes).
    pub fn boundary_distance(&self, p: Vec2) -> f64 {
        self.segments()
            .map(|(a, b)| point_segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// True if the rectangle with the given corners lies fully inside.
    ///
    /// Every corner must be covered (inside or on the boundary), no boundary
    /// edge may cross a rectangle edge, and no boundary vertex may sit
    /// strictly inside the rectangle.
    pub fn contains_candidate(&self, corners: &[Vec2; 4]) -> bool {
        if self.kind != GeometryType::Polygon {
            return false;
        }
        let eps = self.cfg.eps.max(1e-9);
        for c in corners {
            if !(self.contains_point(*c) || self.boundary_distance(*c) <= eps) {
                return false;
            }
        }
        for (a, b) in self.segments() {
            for i in 0..4 {
                if segments_cross_properly(a, b, corners[i], corners[(i + 1) % 4], eps) {
                    return false;
                }
            }
        }
        let rect = closed_rect(corners);
        self.rings()
            .flat_map(|r| open_ring(r).iter())
            .all(|v| !(ring_contains(&rect, *v) && rect_boundary_distance(corners, *v) > eps))
    }

    /// Distance from the polygon (exterior only) to the rectangle; 0 when they overlap.
    pub fn distance_to_rect(&self, corners: &[Vec2; 4]) -> f64 {
        let rect = closed_rect(corners);
        if corners.iter().any(|c| ring_contains(&self.exterior, *c))
            || open_ring(&self.exterior).iter().any(|v| ring_contains(&rect, *v))
        {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for w in self.exterior.windows(2) {
            for i in 0..4 {
                let d = segment_segment_distance(w[0], w[1], corners[i], corners[(i + 1) % 4]);
                best = best.min(d);
            }
        }
        best
    }

    /// Rectangle intersects this polygon buffered by `radius`.
    #[inline]
    pub fn rect_within_distance(&self, corners: &[Vec2; 4], radius: f64) -> bool {
        self.distance_to_rect(corners) <= radius
    }

    /// Area centroid with holes subtracted; length-weighted for lines.
    pub fn centroid(&self) -> Vec2 {
        match self.kind {
            GeometryType::Polygon => {
                let outer_area = signed_area(&self.exterior).abs();
                let outer = ring_centroid(&self.exterior);
                let Some(outer) = outer else {
                    return self.exterior[0];
                };
                let mut acc = outer * outer_area;
                let mut area = outer_area;
                for h in &self.holes {
                    let ha = signed_area(h).abs();
                    if let Some(hc) = ring_centroid(h) {
                        acc -= hc * ha;
                        area -= ha;
                    }
                }
                if area > 0.0 {
                    acc / area
                } else {
                    outer
                }
            }
            GeometryType::Line => {
                PointSet::from_parts(GeometryType::Line, self.exterior.clone()).centroid()
            }
            GeometryType::Point => self.exterior[0],
        }
    }

    /// A point guaranteed to lie on the geometry.
    ///
    /// Polygons use a horizontal scanline through the middle of the bounding
    /// box and return the midpoint of the widest interior interval.
    pub fn point_on_surface(&self) -> Result<Vec2, GeometryError> {
        match self.kind {
            GeometryType::Point => Ok(self.exterior[0]),
            GeometryType::Line => {
                let c = self.centroid();
                self.exterior
                    .iter()
                    .copied()
                    .min_by(|a, b| (a - c).norm().total_cmp(&(b - c).norm()))
                    .ok_or(GeometryError::EmptyRing)
            }
            GeometryType::Polygon => {
                let mut y = 0.5 * (self.bbox.ymin + self.bbox.ymax);
                // avoid scanning exactly through a vertex
                let h = self.bbox.height().max(1.0);
                for k in 0..8 {
                    if !self.rings().any(|r| r.iter().any(|v| (v.y - y).abs() < 1e-9)) {
                        break;
                    }
                    y += h * 1e-4 * (k + 1) as f64;
                }
                let mut xs: Vec<f64> = Vec::new();
                for (a, b) in self.segments() {
                    if (a.y > y) != (b.y > y) {
                        xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
                    }
                }
                xs.sort_by(f64::total_cmp);
                xs.chunks_exact(2)
                    .map(|c| (c[0], c[1]))
                    .max_by(|a, b| (a.1 - a.0).total_cmp(&(b.1 - b.0)))
                    .map(|(x0, x1)| Vec2::new(0.5 * (x0 + x1), y))
                    .ok_or(GeometryError::EmptyRing)
            }
        }
    }

    /// Topological touch: the geometries meet but their interiors do not.
    pub fn touches(&self, other: &PreparedGeometry) -> bool {
        if !self.bbox.intersects(&other.bbox) {
            return false;
        }
        use GeometryType::*;
        match (self.kind, other.kind) {
            (Point, Point) => false,
            (Point, _) => other.point_touches(self.exterior[0]),
            (_, Point) => self.point_touches(other.exterior[0]),
            (Line, Line) => self.lines_touch(other),
            (Line, Polygon) => other.polygon_touches_line(self),
            (Polygon, Line) => self.polygon_touches_line(other),
            (Polygon, Polygon) => self.polygons_touch(other),
        }
    }

    fn endpoints(&self) -> Vec<Vec2> {
        let n = self.exterior.len();
        if self.kind != GeometryType::Line || self.cfg.near_pt(self.exterior[0], self.exterior[n - 1]) {
            return Vec::new();
        }
        vec![self.exterior[0], self.exterior[n - 1]]
    }

    fn point_touches(&self, p: Vec2) -> bool {
        let eps = self.cfg.eps;
        match self.kind {
            GeometryType::Point => false,
            GeometryType::Line => self.endpoints().iter().any(|e| self.cfg.near_pt(*e, p)),
            GeometryType::Polygon => self.boundary_distance(p) <= eps,
        }
    }

    fn lines_touch(&self, other: &PreparedGeometry) -> bool {
        let eps = self.cfg.eps;
        let ends: Vec<Vec2> = self.endpoints().into_iter().chain(other.endpoints()).collect();
        let mut met = false;
        for (a, b) in self.segments() {
            for (c, d) in other.segments() {
                if !segments_intersect(a, b, c, d, eps) {
                    continue;
                }
                if segments_cross_properly(a, b, c, d, eps) || collinear_overlap(a, b, c, d, eps) > eps {
                    return false;
                }
                let contact = segment_intersection_point(a, b, c, d).or_else(|| {
                    [a, b, c, d].into_iter().find(|p| {
                        point_segment_distance(*p, a, b) <= eps && point_segment_distance(*p, c, d) <= eps
                    })
                });
                let Some(p) = contact else { continue };
                if !ends.iter().any(|e| self.cfg.near_pt(*e, p)) {
                    return false;
                }
                met = true;
            }
        }
        met
    }

    fn polygon_touches_line(&self, line: &PreparedGeometry) -> bool {
        let eps = self.cfg.eps;
        let mut met = false;
        for w in line.exterior.windows(2) {
            let probes = [w[0], w[1], (w[0] + w[1]) * 0.5];
            for p in probes {
                let d = self.boundary_distance(p);
                if d > eps && self.contains_point(p) {
                    return false;
                }
                met |= d <= eps;
            }
            for (a, b) in self.segments() {
                if segments_cross_properly(a, b, w[0], w[1], eps) {
                    return false;
                }
                met |= segments_intersect(a, b, w[0], w[1], eps);
            }
        }
        met
    }

    fn polygons_touch(&self, other: &PreparedGeometry) -> bool {
        let eps = self.cfg.eps;
        let mut met = false;
        for (a, b) in self.segments() {
            for (c, d) in other.segments() {
                if segments_cross_properly(a, b, c, d, eps) {
                    return false;
                }
                met |= segments_intersect(a, b, c, d, eps);
            }
        }
        if !met {
            return false;
        }
        let strictly_inside = |g: &PreparedGeometry, p: Vec2| g.contains_point(p) && g.boundary_distance(p) > eps;
        let probes = |g: &PreparedGeometry| -> Vec<Vec2> {
            g.segments().flat_map(|(a, b)| [a, (a + b) * 0.5]).collect()
        };
        !probes(self).into_iter().any(|p| strictly_inside(other, p))
            && !probes(other).into_iter().any(|p| strictly_inside(self, p))
    }
}

fn closed_rect(corners: &[Vec2; 4]) -> Vec<Vec2> {
    vec![corners[0], corners[1], corners[2], corners[3], corners[0]]
}

/// Length of the shared stretch of two collinear segments (0 if not collinear).
fn collinear_overlap(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64) -> f64 {
    let ab = b - a;
    let len = ab.norm();
    if len <= 0.0 || point_line_offset(c, a, ab, len) > eps || point_line_offset(d, a, ab, len) > eps {
        return 0.0;
    }
    let u = ab / len;
    let (t0, t1) = ((c - a).dot(&u), (d - a).dot(&u));
    let (lo, hi) = (t0.min(t1).max(0.0), t0.max(t1).min(len));
    (hi - lo).max(0.0)
}

#[inline]
fn point_line_offset(p: Vec2, a: Vec2, dir: Vec2, len: f64) -> f64 {
    dir.perp(&(p - a)).abs() / len
}

fn rect_boundary_distance(corners: &[Vec2; 4], p: Vec2) -> f64 {
    (0..4)
        .map(|i| point_segment_distance(p, corners[i], corners[(i + 1) % 4]))
        .fold(f64::INFINITY, f64::min)
}
