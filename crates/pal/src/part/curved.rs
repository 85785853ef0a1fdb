//! Curved (glyph by glyph) placement along lines.
//!
//! A placement walks the glyph widths along the path from a start offset.
//! Each glyph becomes one part of the candidate; the head carries the cost
//! and the upside-down glyph count. Orientation `1` reads along the path,
//! `-1` against it, `0` lets the first glyph run decide.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use super::costs::curved as cost;
use super::FeaturePart;
use crate::engine::Pal;
use crate::geom::{line_circle_intersection, normalized_angle, wrap_angle, PointSet, Vec2};
use crate::label::{LabelInfo, LabelPosition, LineAnchorType, Quadrant};

/// Mutable state threaded through one placement attempt.
#[derive(Clone, Copy, Debug, Default)]
struct Walk {
    orientation: i32,
    reversed: bool,
    flip: bool,
}

impl FeaturePart {
    /// Curved candidates along `shape`, spaced by the line candidate target.
    ///
    /// Canceling mid-pass keeps the candidates already produced.
    pub fn create_curved_candidates_along_line<'a>(
        &'a self,
        out: &mut Vec<LabelPosition<'a>>,
        shape: &PointSet,
        allow_overrun: bool,
        pal: &Pal,
    ) -> usize {
        let lf = self.feature();
        let Some(info) = lf.label_info.as_ref().filter(|li| li.char_num() > 0) else {
            return 0;
        };

        let total_char_width = info.total_width();
        let allow_overrun = allow_overrun && self.total_repeats() <= 1;
        let overrun = lf.overrun_distance.min(total_char_width * cost::MAX_OVERRUN_SHARE);
        let shape_length = shape.length();
        if total_char_width > shape_length && (!allow_overrun || shape_length < total_char_width - 2.0 * overrun) {
            return 0;
        }

        let expanded;
        let path = if allow_overrun && overrun > 0.0 {
            expanded = shape.extend_line_by_distance(overrun, overrun, lf.overrun_smooth_distance);
            &expanded
        } else {
            shape
        };

        // length of the segment ending at each vertex
        let mut path_distances = Vec::with_capacity(path.len());
        path_distances.push(0.0);
        path_distances.extend(path.pts().windows(2).map(|w| (w[1] - w[0]).norm()));
        let total: f64 = path_distances.iter().sum();
        if self.cfg.near(total, 0.0) {
            return 0;
        }
        if pal.is_canceled() {
            return 0;
        }

        let anchor = total * lf.line_anchor_percent;
        let label_width = self.label_width(0.0);
        let delta = (info.label_height / 6.0).max(total / self.max_line_candidates(pal) as f64);
        let flags = lf.line_flags.effective();
        let single = lf.line_anchor_type == LineAnchorType::Strict;
        let mut start = if single {
            anchor.min(total * 0.99 - label_width)
        } else {
            0.0
        };
        let flexible = !single && lf.line_anchor_percent > 0.1 && lf.line_anchor_percent < 0.9;
        let initial_orientation = if flags.map_orientation { 0 } else { 1 };

        let mut created = 0;
        while start <= total {
            if pal.is_canceled() {
                debug!(feature = lf.id, created, "curved generation canceled");
                return created;
            }
            let offset = start;
            start += delta;

            let mut walk = Walk {
                orientation: initial_orientation,
                ..Walk::default()
            };
            let mut slp = self.curved_placement_at_offset(path, &path_distances, info, &mut walk, offset, !single);
            if let Some(head) = &slp {
                if head.upside_down_char_count() as f64 >= info.char_num() as f64 / 2.0
                    && self.show_upright_labels()
                    && !walk.flip
                {
                    walk.orientation = -walk.orientation;
                    slp = self.curved_placement_at_offset(path, &path_distances, info, &mut walk, offset, !single);
                }
            }
            // a strict anchor keeps advancing until one chain fits
            let Some(mut slp) = slp else {
                continue;
            };

            let (angle_diff, sin_sum, cos_sum) = glyph_angle_stats(&slp);
            let n = info.char_num() as f64;
            let angle_diff_avg = if info.char_num() > 1 { angle_diff / (n - 1.0) } else { 0.0 };
            let mut c = (angle_diff_avg / cost::ANGLE_DIVISOR).max(cost::MIN);
            let label_center = offset + label_width / 2.0;
            let divisor = if flexible {
                cost::ANCHOR_DIVISOR_FLEXIBLE
            } else {
                cost::ANCHOR_DIVISOR_PINNED
            };
            c += (anchor - label_center).abs() / total / divisor;
            slp.set_cost(c);

            let angle_avg = (sin_sum / n).atan2(cos_sum / n);
            let local_reversed = if walk.flip { !walk.reversed } else { walk.reversed };
            let h = info.label_height;
            let d = lf.dist_label;
            let mut shifted: Vec<(f64, f64)> = Vec::with_capacity(3);
            if (!local_reversed && flags.above_line) || (local_reversed && flags.below_line) {
                shifted.push((d + h / 2.0, 0.0));
            }
            if flags.on_line {
                shifted.push((0.0, cost::ON_LINE));
            }
            if (!local_reversed && flags.below_line) || (local_reversed && flags.above_line) {
                shifted.push((-h / 2.0 - d, cost::BELOW));
            }
            for (dist, extra) in shifted {
                let mut p = slp.clone();
                let (sin, cos) = (angle_avg + FRAC_PI_2).sin_cos();
                p.offset_position(dist * cos, dist * sin);
                p.add_cost(extra);
                if let Some(zone) = lf.permissible_zone() {
                    if !p.within(zone) {
                        continue;
                    }
                }
                out.push(p);
                created += 1;
            }
            if single {
                break;
            }
        }
        created
    }

    /// One glyph chain starting `offset` along `path`, or `None` when the
    /// glyphs run off the path, hit a zero-length segment or bend too far.
    fn curved_placement_at_offset<'a>(
        &'a self,
        path: &PointSet,
        path_distances: &[f64],
        info: &LabelInfo,
        walk: &mut Walk,
        offset: f64,
        apply_angle_constraints: bool,
    ) -> Option<LabelPosition<'a>> {
        let pts = path.pts();
        let n = pts.len();
        let mut along = offset;
        let mut index = 1;
        while index < n && along > path_distances[index] {
            along -= path_distances[index];
            index += 1;
        }
        if index >= n || self.cfg.near(path_distances[index], 0.0) {
            return None;
        }

        if walk.orientation == 0 {
            let mut d = along;
            let mut end_index = index;
            let mut first: Option<Vec2> = None;
            let mut last = Vec2::zeros();
            for ci in &info.char_info {
                let (s, e) =
                    self.next_char_position(ci.width, path_distances[end_index], pts, &mut end_index, &mut d)?;
                first.get_or_insert(s);
                last = e;
            }
            let s = first?;
            let line_angle = (-(last.y - s.y)).atan2(last.x - s.x).to_degrees();
            let right_to_left = !(-90.0..=90.0).contains(&line_angle);
            walk.reversed = right_to_left;
            walk.orientation = if right_to_left { -1 } else { 1 };
        }

        if !self.show_upright_labels() && walk.orientation < 0 {
            walk.flip = true;
            walk.reversed = !walk.reversed;
            walk.orientation = 1;
        }

        let seg = pts[index] - pts[index - 1];
        let mut angle = (-seg.y).atan2(seg.x);
        let height = info.label_height;
        let max_inside = info.max_char_angle_inside.to_radians();
        let max_outside = info.max_char_angle_outside.to_radians();
        let char_num = info.char_num();
        let mut head: Option<LabelPosition<'a>> = None;

        for i in 0..char_num {
            let last_angle = angle;
            let glyph = if walk.orientation > 0 { i } else { char_num - i - 1 };
            let width = info.char_info[glyph].width;
            if self.cfg.near(width, 0.0) {
                continue;
            }
            let (s, e) = self.next_char_position(width, path_distances[index], pts, &mut index, &mut along)?;
            angle = (s.y - e.y).atan2(e.x - s.x);

            let bend = wrap_angle(last_angle - angle);
            if apply_angle_constraints
                && ((info.max_char_angle_inside > 0.0 && bend > 0.0 && bend > max_inside)
                    || (info.max_char_angle_outside < 0.0 && bend < 0.0 && bend < max_outside))
            {
                return None;
            }

            // baseline to mean line
            let mut dist = cost::BASELINE_SHIFT * height / 2.0;
            if walk.orientation < 0 {
                dist = -dist;
                walk.flip = true;
            }
            let (sin_n, cos_n) = (angle + FRAC_PI_2).sin_cos();
            let mut render = Vec2::new(s.x + dist * cos_n, s.y - dist * sin_n);
            let mut render_angle = angle;
            if walk.orientation < 0 {
                render.x += width * render_angle.cos();
                render.y -= width * render_angle.sin();
                render_angle += PI;
            }

            let mut part = LabelPosition::new(
                render.x,
                render.y,
                width,
                height,
                -render_angle,
                cost::GLYPH,
                self,
                false,
                Quadrant::Over,
            );
            part.set_part_id(glyph);
            match head.as_mut() {
                Some(h) => h.push_part(part),
                None => head = Some(part),
            }
            let upright_angle = normalized_angle(render_angle);
            if upright_angle > FRAC_PI_2 && upright_angle < 1.5 * PI {
                if let Some(h) = head.as_mut() {
                    h.increment_upside_down_char_count();
                }
            }
        }
        if let Some(h) = head.as_mut() {
            h.set_reversed(walk.reversed);
        }
        head
    }

    /// Start and end of the next glyph of width `char_width`.
    ///
    /// Advances `index` and `along` (distance into segment `index`) past the
    /// glyph. When the glyph does not fit in the rest of the segment, its end
    /// is where a circle of radius `char_width` around its start leaves the
    /// path.
    fn next_char_position(
        &self,
        char_width: f64,
        segment_length: f64,
        pts: &[Vec2],
        index: &mut usize,
        along: &mut f64,
    ) -> Option<(Vec2, Vec2)> {
        if self.cfg.near(segment_length, 0.0) {
            return None;
        }
        let mut seg_start = pts[*index - 1];
        let mut seg_end = pts[*index];
        let seg = seg_end - seg_start;
        let start = seg_start + seg * (*along / segment_length);

        if segment_length - *along >= char_width {
            *along += char_width;
            return Some((start, seg_start + seg * (*along / segment_length)));
        }
        loop {
            seg_start = seg_end;
            *index += 1;
            if *index >= pts.len() {
                return None;
            }
            seg_end = pts[*index];
            if (start - seg_end).norm() >= char_width {
                break;
            }
        }
        let end = line_circle_intersection(start, char_width, seg_start, seg_end);
        *along = (seg_start - end).norm();
        Some((start, end))
    }
}

/// Summed absolute angle change between consecutive parts, plus the sine and
/// cosine sums of all part angles.
fn glyph_angle_stats(slp: &LabelPosition<'_>) -> (f64, f64, f64) {
    let mut diff_sum = 0.0;
    let mut sin_sum = 0.0;
    let mut cos_sum = 0.0;
    let mut last: Option<f64> = None;
    for p in slp.parts() {
        let a = p.alpha();
        if let Some(prev) = last {
            let mut diff = (a - prev).abs();
            if diff > 2.0 * PI {
                diff -= 2.0 * PI;
            }
            diff_sum += diff.min(2.0 * PI - diff);
        }
        sin_sum += a.sin();
        cos_sum += a.cos();
        last = Some(a);
    }
    (diff_sum, sin_sum, cos_sum)
}
