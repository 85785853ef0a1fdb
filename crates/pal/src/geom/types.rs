//! Basic 2D types and tolerances shared by the point-set routines.
//!
//! - `GeomCfg`: centralizes the near-equality epsilon.
//! - `GeometryType`: tag for the three supported feature geometries.
//! - `BBox`: axis-aligned bounding box.
//! - `OrientedBox`: minimum-area rectangle around a convex hull.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub type Vec2 = Vector2<f64>;

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    pub eps: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self { eps: 1e-9 }
    }
}

impl GeomCfg {
    #[inline]
    pub fn near(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[inline]
    pub fn near_pt(&self, a: Vec2, b: Vec2) -> bool {
        self.near(a.x, b.x) && self.near(a.y, b.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    Line,
    Polygon,
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BBox {
    /// Empty box (inverted bounds); any `expand` makes it valid.
    pub fn empty() -> Self {
        Self {
            xmin: f64::MAX,
            ymin: f64::MAX,
            xmax: f64::MIN,
            ymax: f64::MIN,
        }
    }

    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn from_points(pts: &[Vec2]) -> Self {
        let mut b = Self::empty();
        for p in pts {
            b.expand(*p);
        }
        b
    }

    #[inline]
    pub fn expand(&mut self, p: Vec2) {
        self.xmin = self.xmin.min(p.x);
        self.ymin = self.ymin.min(p.y);
        self.xmax = self.xmax.max(p.x);
        self.ymax = self.ymax.max(p.y);
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax
    }

    #[inline]
    pub fn intersects(&self, other: &BBox) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }
}

/// Minimum-area rectangle around a convex hull.
///
/// Corner 0 sits at the start of both grid axes: the box spans `width` along
/// direction `alpha` and `length` along direction `alpha - π/2`. Corners 0
/// and 2 are opposite, so their midpoint is the box center.
#[derive(Clone, Copy, Debug)]
pub struct OrientedBox {
    pub corners: [Vec2; 4],
    pub alpha: f64,
    pub width: f64,
    pub length: f64,
}

impl OrientedBox {
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.corners[0] + self.corners[2]) * 0.5
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    /// Map grid coordinates `(px, py)` (box frame) to world coordinates.
    #[inline]
    pub fn grid_point(&self, px: f64, py: f64) -> Vec2 {
        let a = self.alpha;
        let b = a - std::f64::consts::FRAC_PI_2;
        self.corners[0] + Vec2::new(a.cos() * px + b.cos() * py, a.sin() * px + b.sin() * py)
    }
}
