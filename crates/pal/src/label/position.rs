//! Scored label candidates.
//!
//! A `LabelPosition` is a rectangle anchored at its lower-left corner
//! `(x, y)` and rotated by `alpha` around that corner. Curved labels are a
//! head glyph plus the remaining glyphs in `next_parts`, in reading order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{PreparedGeometry, Vec2};
use crate::part::FeaturePart;

/// Direction of a candidate relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    AboveLeft,
    Above,
    AboveRight,
    Left,
    Over,
    Right,
    BelowLeft,
    Below,
    BelowRight,
}

impl Quadrant {
    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::AboveLeft => "above_left",
            Quadrant::Above => "above",
            Quadrant::AboveRight => "above_right",
            Quadrant::Left => "left",
            Quadrant::Over => "over",
            Quadrant::Right => "right",
            Quadrant::BelowLeft => "below_left",
            Quadrant::Below => "below",
            Quadrant::BelowRight => "below_right",
        }
    }
}

#[derive(Clone)]
pub struct LabelPosition<'a> {
    id: usize,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    alpha: f64,
    cost: f64,
    feature: &'a FeaturePart,
    reversed: bool,
    quadrant: Quadrant,
    part_id: Option<usize>,
    upside_down_char_count: usize,
    next_parts: Vec<LabelPosition<'a>>,
}

impl<'a> LabelPosition<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: f64,
        cost: f64,
        feature: &'a FeaturePart,
        reversed: bool,
        quadrant: Quadrant,
    ) -> Self {
        Self {
            id: 0,
            x,
            y,
            width,
            height,
            alpha,
            cost: cost.max(0.0),
            feature,
            reversed,
            quadrant,
            part_id: None,
            upside_down_char_count: 0,
            next_parts: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Rotation in radians, counter-clockwise.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Overwrite the cost; negative values clamp to zero.
    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost.max(0.0);
    }

    /// Add a non-negative penalty.
    pub fn add_cost(&mut self, penalty: f64) {
        if penalty > 0.0 {
            self.cost += penalty;
        }
    }

    #[inline]
    pub fn feature(&self) -> &'a FeaturePart {
        self.feature
    }

    /// Right-to-left direction (line candidates) or flipped glyph order (curved).
    #[inline]
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub(crate) fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    #[inline]
    pub fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    /// Glyph index of a curved-label part.
    #[inline]
    pub fn part_id(&self) -> Option<usize> {
        self.part_id
    }

    pub(crate) fn set_part_id(&mut self, part_id: usize) {
        self.part_id = Some(part_id);
    }

    #[inline]
    pub fn upside_down_char_count(&self) -> usize {
        self.upside_down_char_count
    }

    pub(crate) fn increment_upside_down_char_count(&mut self) {
        self.upside_down_char_count += 1;
    }

    /// Parts after the head, in reading order.
    #[inline]
    pub fn next_parts(&self) -> &[LabelPosition<'a>] {
        &self.next_parts
    }

    pub(crate) fn push_part(&mut self, part: LabelPosition<'a>) {
        self.next_parts.push(part);
    }

    /// The head followed by every further part.
    pub fn parts(&self) -> impl Iterator<Item = &LabelPosition<'a>> {
        std::iter::once(self).chain(self.next_parts.iter())
    }

    /// Total number of parts including the head.
    #[inline]
    pub fn part_count(&self) -> usize {
        1 + self.next_parts.len()
    }

    /// Shift this candidate and all of its parts.
    pub fn offset_position(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        for p in &mut self.next_parts {
            p.offset_position(dx, dy);
        }
    }

    /// Corners counter-clockwise from the anchor (lower-left) corner.
    pub fn corners(&self) -> [Vec2; 4] {
        rect_corners(self.x, self.y, self.width, self.height, self.alpha)
    }

    pub fn center(&self) -> Vec2 {
        let c = self.corners();
        (c[0] + c[2]) * 0.5
    }

    /// Distance from `p` to the nearest point of the head rectangle (0 inside).
    pub fn distance_to_point(&self, p: Vec2) -> f64 {
        let (sin, cos) = self.alpha.sin_cos();
        let d = p - Vec2::new(self.x, self.y);
        // into the label frame
        let u = d.x * cos + d.y * sin;
        let v = -d.x * sin + d.y * cos;
        let du = if u < 0.0 {
            -u
        } else if u > self.width {
            u - self.width
        } else {
            0.0
        };
        let dv = if v < 0.0 {
            -v
        } else if v > self.height {
            v - self.height
        } else {
            0.0
        };
        du.hypot(dv)
    }

    /// Every part lies fully inside `zone`.
    pub fn within(&self, zone: &PreparedGeometry) -> bool {
        self.parts().all(|p| zone.contains_candidate(&p.corners()))
    }
}

impl fmt::Debug for LabelPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelPosition")
            .field("id", &self.id)
            .field("feature", &self.feature.feature().id)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("alpha", &self.alpha)
            .field("cost", &self.cost)
            .field("quadrant", &self.quadrant)
            .field("reversed", &self.reversed)
            .field("parts", &self.part_count())
            .finish()
    }
}

/// Corners of a rectangle anchored at its lower-left corner and rotated by `alpha`.
pub fn rect_corners(x: f64, y: f64, width: f64, height: f64, alpha: f64) -> [Vec2; 4] {
    let (sin, cos) = alpha.sin_cos();
    let o = Vec2::new(x, y);
    let u = Vec2::new(cos, sin);
    let v = Vec2::new(-sin, cos);
    [o, o + u * width, o + u * width + v * height, o + v * height]
}
