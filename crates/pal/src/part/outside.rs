//! Exterior polygon placement.
//!
//! Anchor points are sampled at regular distances along the polygon
//! buffered by half the label distance. The direction of the buffered ring
//! at each sample picks the predefined positions facing away from the
//! polygon; the other half of the label distance is applied when the label
//! box is placed. Labels are always horizontal.

use std::f64::consts::PI;

use tracing::{debug, warn};

use super::costs::polygon as cost;
use super::point::ordered_position_anchor;
use super::FeaturePart;
use crate::engine::Pal;
use crate::geom::{offset_ring, Vec2};
use crate::label::{rect_corners, LabelPosition, PredefinedPointPosition};

/// Buffer approximation of round corners, segments per quarter turn.
const BUFFER_QUADRANT_SEGMENTS: usize = 1;

impl FeaturePart {
    /// Horizontal candidates around the outside of the polygon.
    ///
    /// Candidates closer to the polygon than half the label distance are
    /// dropped. Cost is the distance from the centroid to the nearest point
    /// of the label, normalized by a bound on that distance.
    pub fn create_candidates_outside_polygon<'a>(&'a self, out: &mut Vec<LabelPosition<'a>>, pal: &Pal) -> usize {
        let lf = self.feature();
        let w = self.label_width(0.0);
        let h = self.label_height(0.0);
        let d = lf.dist_label;

        let part = match self.prepared() {
            Ok(p) => p,
            Err(err) => {
                warn!(feature = lf.id, %err, "exterior candidates skipped");
                return 0;
            }
        };
        let centroid = self.centroid(false);
        let ring = match offset_ring(part.exterior(), d * 0.5, BUFFER_QUADRANT_SEGMENTS) {
            Ok(r) => r.reversed(),
            Err(err) => {
                warn!(feature = lf.id, %err, "buffer failed");
                return 0;
            }
        };

        let m = ring.measure();
        let ring_length = m.total;
        if ring_length <= 0.0 {
            return 0;
        }
        let circle_area = ring_length * ring_length / (4.0 * PI);
        let for_area = (pal.settings.polygon_candidates_per_map_unit_squared * circle_area).ceil() as usize;
        let max = lf.layer.max_polygon_candidates;
        let target = cost::EXTERIOR_MIN_COUNT.max(if max > 0 { max.min(for_area) } else { for_area });
        let delta = ring_length / target as f64;

        let bbox = self.bbox();
        let reach_x = (bbox.xmax - centroid.x).max(centroid.x - bbox.xmin) + d;
        let reach_y = (bbox.ymax - centroid.y).max(centroid.y - bbox.ymin) + d;
        let max_distance = reach_x.hypot(reach_y);

        let pts = ring.pts();
        let mut created = 0;
        let mut seg = 0;
        for k in 1..=target {
            let along = (k as f64 * delta).min(ring_length);
            while seg + 2 < pts.len() && m.distance_to_vertex[seg + 1] < along {
                seg += 1;
            }
            let a = pts[seg];
            let b = pts[seg + 1];
            let t = if m.segment_lengths[seg] > 0.0 {
                (along - m.distance_to_vertex[seg]) / m.segment_lengths[seg]
            } else {
                0.0
            };
            let p = a + (b - a) * t;
            let mut heading = (b.y - a.y).atan2(b.x - a.x).to_degrees();
            if heading < 0.0 {
                heading += 360.0;
            }

            for &position in positions_for_heading(heading) {
                let (anchor, quadrant) =
                    ordered_position_anchor(p, w, h, position, d * 0.5, &lf.visual_margin, Vec2::zeros());
                if part.rect_within_distance(&rect_corners(anchor.x, anchor.y, w, h, 0.0), d * 0.5) {
                    continue;
                }
                let mut candidate = LabelPosition::new(anchor.x, anchor.y, w, h, 0.0, 0.0, self, false, quadrant);
                candidate.set_cost(candidate.distance_to_point(centroid) / max_distance);
                out.push(candidate);
                created += 1;
            }
            if pal.is_canceled() {
                break;
            }
        }
        debug!(feature = lf.id, target, created, "exterior candidates");
        created
    }
}

/// Positions facing away from a clockwise ring heading `heading` degrees.
fn positions_for_heading(heading: f64) -> &'static [PredefinedPointPosition] {
    use PredefinedPointPosition as P;
    match heading {
        a if a <= 5.0 => &[P::TopMiddle, P::TopLeft],
        a if a <= 85.0 => &[P::TopLeft],
        a if a <= 90.0 => &[P::TopLeft, P::MiddleLeft],
        a if a <= 95.0 => &[P::MiddleLeft, P::BottomLeft],
        a if a <= 175.0 => &[P::BottomLeft],
        a if a <= 180.0 => &[P::BottomLeft, P::BottomMiddle],
        a if a <= 185.0 => &[P::BottomMiddle, P::BottomRight],
        a if a <= 265.0 => &[P::BottomRight],
        a if a <= 270.0 => &[P::BottomRight, P::MiddleRight],
        a if a <= 275.0 => &[P::MiddleRight, P::TopRight],
        a if a <= 355.0 => &[P::TopRight],
        _ => &[P::TopRight, P::TopMiddle],
    }
}
