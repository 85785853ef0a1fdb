//! Straight line generators.
//!
//! Candidates slide a label-width window along the line. The window chord
//! gives the candidate angle and a jaggedness cost; the window position
//! gives anchor-distance costs. Straight runs between hard breaks are tried
//! first; the midpoint pass over the whole line fills up to the target count.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use super::costs::line as cost;
use super::FeaturePart;
use crate::engine::Pal;
use crate::geom::{normalized_angle, PointSet, Vec2};
use crate::label::{Arrangement, LabelPosition, LineAnchorType, Quadrant};

impl FeaturePart {
    /// Rotated candidates along `shape`.
    ///
    /// With `allow_overrun`, lines too short for the label even after the
    /// overrun allowance are skipped outright. Only the `Line` arrangement
    /// produces rotated candidates.
    pub fn create_candidates_along_line<'a>(
        &'a self,
        out: &mut Vec<LabelPosition<'a>>,
        shape: &PointSet,
        allow_overrun: bool,
        pal: &Pal,
    ) -> usize {
        let lf = self.feature();
        if lf.layer.arrangement != Arrangement::Line {
            debug!(feature = lf.id, arrangement = ?lf.layer.arrangement, "no line candidates for arrangement");
            return 0;
        }
        if allow_overrun {
            let l = shape.length();
            let w = self.label_width(0.0);
            if self.total_repeats() > 1 && l < w {
                return 0;
            }
            if l < w - 2.0 * w.min(lf.overrun_distance) {
                return 0;
            }
        }

        let mut created = 0;
        if lf.line_anchor_type == LineAnchorType::HintOnly {
            created = self.create_candidates_along_line_near_straight_segments(out, shape, pal);
        }
        let target = self.max_line_candidates(pal);
        if created < target {
            let initial = if created > 0 { cost::MIDPOINT_FALLBACK } else { 0.0 };
            created += self.create_candidates_along_line_near_midpoint(out, shape, initial, pal);
        }
        created
    }

    /// Axis-aligned candidates centered at evenly spaced points of `shape`.
    pub fn create_horizontal_candidates_along_line<'a>(
        &'a self,
        out: &mut Vec<LabelPosition<'a>>,
        shape: &PointSet,
        pal: &Pal,
    ) -> usize {
        let lf = self.feature();
        let w = self.label_width(0.0);
        let h = self.label_height(0.0);
        let m = shape.measure();
        let total = m.total;
        if total <= 0.0 {
            return 0;
        }
        let anchor = total * lf.line_anchor_percent;
        let (mut cur, step) = match lf.line_anchor_type {
            LineAnchorType::HintOnly => (0.0, total / (self.max_line_candidates(pal) + 1) as f64),
            LineAnchorType::Strict => (anchor, -1.0),
        };

        let mut created = 0;
        while cur <= total {
            if pal.is_canceled() {
                return created;
            }
            let c = shape.point_by_distance(&m, cur);
            let candidate_cost = (anchor - cur).abs() / total / cost::ANCHOR_DIVISOR;
            out.push(LabelPosition::new(
                c.x - w / 2.0,
                c.y - h / 2.0,
                w,
                h,
                0.0,
                candidate_cost,
                self,
                false,
                Quadrant::Over,
            ));
            created += 1;
            if step <= 0.0 {
                break;
            }
            cur += step;
        }
        created
    }

    /// Candidates confined to straight runs between hard breaks.
    ///
    /// Yields nothing when the line has no hard break or is shorter than the
    /// label; the midpoint pass covers those lines.
    pub fn create_candidates_along_line_near_straight_segments<'a>(
        &'a self,
        out: &mut Vec<LabelPosition<'a>>,
        shape: &PointSet,
        pal: &Pal,
    ) -> usize {
        let lf = self.feature();
        let pts = shape.pts();
        let n = pts.len();
        if n < 2 {
            return 0;
        }
        let w = self.label_width(0.0);
        let h = self.label_height(0.0);
        let closed = self.cfg.near_pt(pts[0], pts[n - 1]);

        let mut breaks = hard_breaks(pts, closed, |a, b| self.cfg.near_pt(a, b));
        if breaks.is_empty() {
            return 0;
        }
        if breaks.last() != Some(&(n - 1)) {
            breaks.push(n - 1);
        }

        let m = shape.measure();
        let total = m.total;
        let mut run_lengths = Vec::with_capacity(breaks.len());
        let mut run_angles = Vec::with_capacity(breaks.len());
        let mut longest: f64 = 0.0;
        let mut run = 0.0;
        let mut run_start = pts[0];
        for i in 0..n - 1 {
            if i > 0 && breaks.contains(&i) {
                run_lengths.push(run);
                run_angles.push(bearing(run_start, pts[i]));
                longest = longest.max(run);
                run = 0.0;
                run_start = pts[i];
            }
            run += m.segment_lengths[i];
        }
        run_lengths.push(run);
        run_angles.push(bearing(run_start, pts[n - 1]));
        longest = longest.max(run);

        if total < w {
            return 0;
        }
        let anchor = total * lf.line_anchor_percent;
        let target = self.max_line_candidates(pal);
        let step = h.min(w).min((total - w) / target as f64);
        if step <= 0.0 {
            return 0;
        }
        let flexible = lf.line_anchor_percent > cost::FLEXIBLE_MIN && lf.line_anchor_percent < cost::FLEXIBLE_MAX;

        let mut created = 0;
        let mut end_d = 0.0;
        for (k, (&run_len, &run_angle)) in run_lengths.iter().zip(&run_angles).enumerate() {
            let start_d = end_d;
            end_d = m.distance_to_vertex[breaks[k]];
            if run_len < w {
                continue;
            }
            let span = end_d - start_d;
            let run_center = 0.5 * (start_d + end_d);
            let length_cost = 1.0 - span / longest;
            let angle_cost = 1.0 - ((run_angle % PI) - FRAC_PI_2).abs() / FRAC_PI_2;

            let mut cur = start_d;
            while cur + w < end_d {
                if pal.is_canceled() {
                    return created;
                }
                let s = shape.point_by_distance(&m, cur);
                let e = shape.point_by_distance(&m, cur + w);
                let mut c = jag_cost((e - s).norm() / w);
                let label_center = cur + w / 2.0;
                if flexible {
                    c += 2.0 * (label_center - run_center).abs() / span * cost::SEGMENT_CENTER_WEIGHT;
                }
                if !closed {
                    c += 2.0 * (label_center - anchor).abs() / total * cost::LINE_ANCHOR_WEIGHT;
                }
                if flexible {
                    c += length_cost * cost::SEGMENT_LENGTH_WEIGHT;
                    c += angle_cost * cost::SEGMENT_ANGLE_WEIGHT;
                }
                created += self.push_line_placements(out, s, self.window_angle(s, e), c, BELOW_FIRST);
                cur += step;
            }
        }
        debug!(feature = lf.id, runs = run_lengths.len(), created, "straight segment candidates");
        created
    }

    /// Candidates along the whole line, biased towards the line anchor.
    ///
    /// An open line shorter than the label gets one candidate centered on the
    /// line's midpoint; a closed one gets none unless the anchor is strict.
    pub fn create_candidates_along_line_near_midpoint<'a>(
        &'a self,
        out: &mut Vec<LabelPosition<'a>>,
        shape: &PointSet,
        initial_cost: f64,
        pal: &Pal,
    ) -> usize {
        let lf = self.feature();
        let pts = shape.pts();
        let n = pts.len();
        if n < 2 {
            return 0;
        }
        let w = self.label_width(0.0);
        let h = self.label_height(0.0);
        let m = shape.measure();
        let mut total = m.total;

        let mut step = total - w;
        let mut cur = 0.0;
        if total > w {
            step = h.min(w).min(step / self.max_line_candidates(pal) as f64);
        } else if !shape.is_closed(self.cfg) {
            cur = -(w - total) / 2.0;
            step = -1.0;
            total = w;
        } else {
            cur = f64::MAX;
        }

        let anchor = total * lf.line_anchor_percent.min(0.99);
        let strict = lf.line_anchor_type == LineAnchorType::Strict;
        if strict {
            cur = anchor.min(total * 0.99 - w);
            step = -1.0;
        }

        let mut created = 0;
        while cur <= total - w || strict {
            if pal.is_canceled() {
                return created;
            }
            let s = shape.point_by_distance(&m, cur);
            let e = shape.point_by_distance(&m, cur + w);
            let chord = if cur < 0.0 {
                (pts[n - 1] - pts[0]).norm()
            } else {
                (e - s).norm()
            };
            let mut c = jag_cost(chord / w);
            c += (anchor - (cur + w / 2.0)).abs() / total / cost::ANCHOR_DIVISOR;
            c += initial_cost;
            created += self.push_line_placements(out, s, self.window_angle(s, e), c, ABOVE_FIRST);
            if step <= 0.0 {
                break;
            }
            cur += step;
        }
        created
    }

    fn window_angle(&self, s: Vec2, e: Vec2) -> f64 {
        if self.cfg.near_pt(s, e) {
            0.0
        } else {
            (e.y - s.y).atan2(e.x - s.x)
        }
    }

    /// Above, below and on-line placements for a window starting at `start`,
    /// in `order` with on-line last.
    fn push_line_placements<'a>(
        &'a self,
        out: &mut Vec<LabelPosition<'a>>,
        start: Vec2,
        angle: f64,
        c: f64,
        order: [Side; 2],
    ) -> usize {
        let lf = self.feature();
        if lf.layer.arrangement != Arrangement::Line {
            return 0;
        }
        let w = self.label_width(angle);
        let h = self.label_height(angle);

        let flags = lf.line_flags.effective();
        let d = lf.dist_label;
        let (sin_b, cos_b) = (angle + FRAC_PI_2).sin_cos();
        let normal = Vec2::new(cos_b, sin_b);
        let right_to_left = angle > FRAC_PI_2 || angle <= -FRAC_PI_2;
        let reversed = flags.map_orientation && right_to_left;
        let above = (!reversed && flags.above_line) || (reversed && flags.below_line);
        let below = (!reversed && flags.below_line) || (reversed && flags.above_line);

        let mut placements: Vec<(Vec2, f64)> = Vec::with_capacity(3);
        for side in order {
            match side {
                Side::Above if above => {
                    placements.push((start + normal * d, if reversed { cost::BELOW } else { 0.0 }));
                }
                Side::Below if below => {
                    placements.push((start - normal * (d + h), if reversed { 0.0 } else { cost::BELOW }));
                }
                _ => {}
            }
        }
        if flags.on_line {
            placements.push((start - normal * (h / 2.0), cost::ON_LINE));
        }

        let mut created = 0;
        for (anchor, extra) in placements {
            if !self.zone_allows(anchor.x, anchor.y, w, h, angle) {
                continue;
            }
            out.push(LabelPosition::new(
                anchor.x,
                anchor.y,
                w,
                h,
                angle,
                c + extra,
                self,
                right_to_left,
                Quadrant::Over,
            ));
            created += 1;
        }
        created
    }
}

#[derive(Clone, Copy)]
enum Side {
    Above,
    Below,
}

const ABOVE_FIRST: [Side; 2] = [Side::Above, Side::Below];
/// Straight runs emit the below-line placement first.
const BELOW_FIRST: [Side; 2] = [Side::Below, Side::Above];

/// Vertices whose turn angle falls outside the straight-ish range.
///
/// Closed lines also test the closing vertex, wrapping to the second vertex.
fn hard_breaks(pts: &[Vec2], closed: bool, near: impl Fn(Vec2, Vec2) -> bool) -> Vec<usize> {
    let n = pts.len();
    let last = if closed { n - 1 } else { n.saturating_sub(2) };
    let min = cost::HARD_BREAK_MIN_DEG.to_radians();
    let max = cost::HARD_BREAK_MAX_DEG.to_radians();
    let mut out = Vec::new();
    for i in 1..=last {
        let p1 = pts[i - 1];
        let p2 = pts[i];
        let p3 = if i == n - 1 { pts[1] } else { pts[i + 1] };
        if near(p2, p3) || near(p1, p2) {
            continue;
        }
        let turn = (p3.y - p2.y).atan2(p3.x - p2.x) - (p2.y - p1.y).atan2(p2.x - p1.x);
        let vertex_angle = normalized_angle(PI - turn);
        if vertex_angle < min || vertex_angle > max {
            out.push(i);
        }
    }
    out
}

#[inline]
fn bearing(a: Vec2, b: Vec2) -> f64 {
    normalized_angle((b.y - a.y).atan2(b.x - a.x))
}

/// Straight windows cost a flat minimum; jagged ones grow with the shortfall.
#[inline]
fn jag_cost(ratio: f64) -> f64 {
    if ratio > cost::STRAIGHT_RATIO {
        cost::STRAIGHT
    } else {
        (1.0 - ratio) / cost::JAGGED_DIVISOR
    }
}
