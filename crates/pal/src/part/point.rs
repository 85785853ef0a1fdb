//! Point generators: centered, over-point, ordered positions, radial sweep.
//!
//! All four share the same contract: candidates are appended to `out`, the
//! return value counts the appended candidates, and a permissible zone (when
//! set) rejects candidates whose footprint leaves it.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, PI};

use super::costs::point as cost;
use super::FeaturePart;
use crate::geom::Vec2;
use crate::label::{LabelPosition, Margins, OffsetType, PredefinedPointPosition, Quadrant};

impl FeaturePart {
    /// One candidate centered on `p`.
    pub fn create_candidate_centered_over_point<'a>(
        &'a self,
        p: Vec2,
        out: &mut Vec<LabelPosition<'a>>,
        angle: f64,
    ) -> usize {
        let w = self.label_width(angle);
        let h = self.label_height(angle);
        let lx = p.x - w / 2.0;
        let ly = p.y - h / 2.0;
        if !self.zone_allows(lx, ly, w, h, angle) {
            return 0;
        }
        out.push(LabelPosition::new(lx, ly, w, h, angle, cost::CENTERED, self, false, Quadrant::Over));
        1
    }

    /// One candidate over `p`, shifted by the quadrant offset.
    ///
    /// In around-point arrangement the label distance moves the box away from
    /// the point along the quadrant direction; otherwise the fixed position
    /// offset applies.
    pub fn create_candidates_over_point<'a>(&'a self, p: Vec2, out: &mut Vec<LabelPosition<'a>>, angle: f64) -> usize {
        use crate::label::Arrangement;
        let lf = self.feature();
        let w = self.label_width(angle);
        let h = self.label_height(angle);
        let q = lf.quad_offset;

        let mut dx = -w / 2.0;
        let mut dy = -h / 2.0;
        if !self.cfg.near(q.x, 0.0) {
            dx += w / 2.0 * q.x;
        }
        if !self.cfg.near(q.y, 0.0) {
            dy += h / 2.0 * q.y;
        }
        if !lf.has_fixed_position() && !self.cfg.near(angle, 0.0) {
            let (sin, cos) = angle.sin_cos();
            (dx, dy) = (dx * cos - dy * sin, dx * sin + dy * cos);
        }

        if lf.layer.arrangement == Arrangement::AroundPoint {
            let d = lf.dist_label;
            if self.cfg.near(q.x, 0.0) {
                dy += q.y * d;
            } else if self.cfg.near(q.y, 0.0) {
                dx += q.x * d;
            } else {
                dx += q.x * FRAC_1_SQRT_2 * d;
                dy += q.y * FRAC_1_SQRT_2 * d;
            }
        } else {
            dx += lf.position_offset.x;
            dy += lf.position_offset.y;
        }

        let lx = p.x + dx;
        let ly = p.y + dy;
        if !self.zone_allows(lx, ly, w, h, angle) {
            return 0;
        }
        out.push(LabelPosition::new(
            lx,
            ly,
            w,
            h,
            angle,
            cost::OVER_POINT,
            self,
            false,
            quadrant_from_offset(q),
        ));
        1
    }

    /// Candidates at the feature's ordered predefined positions.
    ///
    /// Cost grows by a fixed step per accepted candidate so that the caller's
    /// order acts as the tie-break. Stops at the layer's point maximum.
    pub fn create_candidates_at_ordered_positions_over_point<'a>(
        &'a self,
        p: Vec2,
        out: &mut Vec<LabelPosition<'a>>,
        angle: f64,
    ) -> usize {
        let lf = self.feature();
        let w = self.label_width(angle);
        let h = self.label_height(angle);
        let symbol_offset = match lf.offset_type {
            OffsetType::FromSymbolBounds => Vec2::new(lf.symbol_size.width / 2.0, lf.symbol_size.height / 2.0),
            OffsetType::FromPoint => Vec2::zeros(),
        };
        let max = self.max_point_candidates();

        let mut c = cost::ORDERED_BASE;
        let mut created = 0;
        for &position in &lf.predefined_positions {
            let (anchor, quadrant) =
                ordered_position_anchor(p, w, h, position, lf.dist_label, &lf.visual_margin, symbol_offset);
            if !self.zone_allows(anchor.x, anchor.y, w, h, angle) {
                continue;
            }
            out.push(LabelPosition::new(anchor.x, anchor.y, w, h, angle, c, self, false, quadrant));
            created += 1;
            c += cost::ORDERED_STEP;
            if max > 0 && created >= max {
                break;
            }
        }
        created
    }

    /// Radial sweep of `max_point_candidates` (default 16) candidates
    /// starting at 45° and stepping counter-clockwise.
    ///
    /// Cost follows a triangular sequence over the accepted candidates: the
    /// first is cheapest, the one opposite it most expensive.
    pub fn create_candidates_around_point<'a>(&'a self, p: Vec2, out: &mut Vec<LabelPosition<'a>>, angle: f64) -> usize {
        let w = self.label_width(angle);
        let h = self.label_height(angle);
        let d = self.feature().dist_label;
        let n = match self.max_point_candidates() {
            0 => cost::AROUND_DEFAULT_COUNT,
            n => n,
        };

        let a90 = FRAC_PI_2;
        let a180 = PI;
        let a270 = a180 + a90;
        let a360 = 2.0 * PI;
        let wedge_cap = a90 / 3.0;

        let (gamma1, gamma2) = if d > 0.0 {
            ((h / 2.0).atan2(d + w / 2.0), (w / 2.0).atan2(d + h / 2.0))
        } else {
            (wedge_cap, wedge_cap)
        };
        let gamma1 = gamma1.min(wedge_cap);
        let gamma2 = gamma2.min(wedge_cap);

        let step = a360 / n as f64;
        let mut icost: i64 = 0;
        let mut inc: i64 = 2;
        let mut created = 0;
        let mut bearing = FRAC_PI_4;

        for i in 0..n {
            if i > 0 {
                bearing += step;
            }
            if bearing > a360 {
                bearing -= a360;
            }
            let (sin, cos) = bearing.sin_cos();
            let mut lx = p.x;
            let mut ly = p.y;
            let quadrant;

            if bearing < gamma1 || bearing > a360 - gamma1 {
                lx += d;
                let mut iota = bearing + gamma1;
                if iota > a360 - gamma1 {
                    iota -= a360;
                }
                ly += -h + h * iota / (2.0 * gamma1);
                quadrant = Quadrant::Right;
            } else if bearing < a90 - gamma2 {
                lx += d * cos;
                ly += d * sin;
                quadrant = Quadrant::AboveRight;
            } else if bearing < a90 + gamma2 {
                lx += -w * (bearing - a90 + gamma2) / (2.0 * gamma2);
                ly += d;
                quadrant = Quadrant::Above;
            } else if bearing < a180 - gamma1 {
                lx += d * cos - w;
                ly += d * sin;
                quadrant = Quadrant::AboveLeft;
            } else if bearing < a180 + gamma1 {
                lx += -d - w;
                ly += -(bearing - a180 + gamma1) * h / (2.0 * gamma1);
                quadrant = Quadrant::Left;
            } else if bearing < a270 - gamma2 {
                lx += d * cos - w;
                ly += d * sin - h;
                quadrant = Quadrant::BelowLeft;
            } else if bearing < a270 + gamma2 {
                ly += -d - h;
                lx += -w + (bearing - a270 + gamma2) * w / (2.0 * gamma2);
                quadrant = Quadrant::Below;
            } else {
                lx += d * cos;
                ly += d * sin - h;
                quadrant = Quadrant::BelowRight;
            }

            let c = if n == 1 {
                cost::AROUND_BASE
            } else {
                cost::AROUND_BASE + cost::AROUND_SPAN * icost as f64 / (n - 1) as f64
            };

            if !self.zone_allows(lx, ly, w, h, angle) {
                continue;
            }
            out.push(LabelPosition::new(lx, ly, w, h, angle, c, self, false, quadrant));
            created += 1;

            icost += inc;
            let n = n as i64;
            if icost == n {
                icost = n - 1;
                inc = -2;
            } else if icost > n {
                icost = n - 2;
                inc = -2;
            }
        }
        created
    }
}

/// Quadrant named by the signs of a quadrant offset (negative y is above).
pub(crate) fn quadrant_from_offset(q: Vec2) -> Quadrant {
    use std::cmp::Ordering::{Equal, Greater, Less};
    let sign = |v: f64| v.partial_cmp(&0.0).unwrap_or(Equal);
    match (sign(q.x), sign(q.y)) {
        (Less, Less) => Quadrant::AboveLeft,
        (Less, Greater) => Quadrant::BelowLeft,
        (Less, Equal) => Quadrant::Left,
        (Greater, Less) => Quadrant::AboveRight,
        (Greater, Greater) => Quadrant::BelowRight,
        (Greater, Equal) => Quadrant::Right,
        (Equal, Less) => Quadrant::Above,
        (Equal, Greater) => Quadrant::Below,
        (Equal, Equal) => Quadrant::Over,
    }
}

/// Lower-left anchor and quadrant of a label at a predefined position.
///
/// The reference point sits `distance` away from `p` along the position's
/// bearing; the label box is then aligned against it, pulled in by the
/// visual margins and pushed out by half the symbol size.
pub(crate) fn ordered_position_anchor(
    p: Vec2,
    w: f64,
    h: f64,
    position: PredefinedPointPosition,
    distance: f64,
    margin: &Margins,
    symbol_offset: Vec2,
) -> (Vec2, Quadrant) {
    use PredefinedPointPosition as P;
    let (sw, sh) = (symbol_offset.x, symbol_offset.y);
    let top = -margin.bottom + sh;
    let bottom = -h + margin.top - sh;
    let (quadrant, bearing, dx, dy) = match position {
        P::TopLeft => (Quadrant::AboveLeft, 3.0 * FRAC_PI_4, -w + margin.right - sw, top),
        // right quadrant, so the text stays left-aligned
        P::TopSlightlyLeft => (Quadrant::AboveRight, FRAC_PI_2, -w / 4.0 - margin.left, top),
        P::TopMiddle => (Quadrant::Above, FRAC_PI_2, -w / 2.0, top),
        P::TopSlightlyRight => (Quadrant::AboveLeft, FRAC_PI_2, -w * 3.0 / 4.0 + margin.right, top),
        P::TopRight => (Quadrant::AboveRight, FRAC_PI_4, -margin.left + sw, top),
        P::MiddleLeft => (Quadrant::Left, PI, -w + margin.right - sw, -h / 2.0),
        P::MiddleRight => (Quadrant::Right, 0.0, -margin.left + sw, -h / 2.0),
        P::BottomLeft => (Quadrant::BelowLeft, 5.0 * FRAC_PI_4, -w + margin.right - sw, bottom),
        P::BottomSlightlyLeft => (Quadrant::BelowRight, 3.0 * FRAC_PI_2, -w / 4.0 - margin.left, bottom),
        P::BottomMiddle => (Quadrant::Below, 3.0 * FRAC_PI_2, -w / 2.0, bottom),
        P::BottomSlightlyRight => (Quadrant::BelowLeft, 3.0 * FRAC_PI_2, -w * 3.0 / 4.0 + margin.right, bottom),
        P::BottomRight => (Quadrant::BelowRight, 7.0 * FRAC_PI_4, -margin.left + sw, bottom),
    };
    let (sin, cos) = bearing.sin_cos();
    let reference = p + Vec2::new(cos * distance, sin * distance);
    (reference + Vec2::new(dx, dy), quadrant)
}
