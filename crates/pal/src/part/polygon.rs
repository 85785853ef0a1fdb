//! Interior polygon placement on oriented grids.
//!
//! The part is split into near-convex pieces, each piece gets its minimum
//! oriented bounding box, and candidates are laid out on a regular grid in
//! every box. When a maximum is configured and the grids fall short of the
//! target, the spacing is halved and the grids are rebuilt.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::{debug, warn};

use super::costs::polygon as cost;
use super::FeaturePart;
use crate::engine::Pal;
use crate::geom::{split_polygons, OrientedBox, Vec2};
use crate::label::{rect_corners, Arrangement, LabelPosition, Quadrant};

impl FeaturePart {
    /// Grid candidates inside the polygon.
    ///
    /// Without a permissible zone a candidate is kept when its center lies
    /// in the part (holes excluded); with a zone its whole footprint must lie
    /// in the zone.
    pub fn create_candidates_for_polygon<'a>(&'a self, out: &mut Vec<LabelPosition<'a>>, pal: &Pal) -> usize {
        let lf = self.feature();
        let w = self.label_width(0.0);
        let h = self.label_height(0.0);
        let per_area = pal.settings.polygon_candidates_per_map_unit_squared;
        if per_area <= 0.0 {
            return 0;
        }

        let total_area = self.area();
        let max = lf.layer.max_polygon_candidates;
        let target = if max > 0 {
            max.min((per_area * total_area).ceil() as usize)
        } else {
            0
        };
        if pal.is_canceled() {
            return 0;
        }

        let boxes: Vec<OrientedBox> = split_polygons(&self.shape, w, h)
            .iter()
            .filter_map(|piece| match piece.oriented_bounding_box() {
                Ok(b) => Some(b),
                Err(err) => {
                    debug!(feature = lf.id, %err, "skipping piece without oriented box");
                    None
                }
            })
            .collect();
        if boxes.is_empty() || pal.is_canceled() {
            return 0;
        }
        let part = match self.prepared() {
            Ok(p) => p,
            Err(err) => {
                warn!(feature = lf.id, %err, "polygon candidates skipped");
                return 0;
            }
        };
        let zone = lf.permissible_zone();
        let max_try = if zone.is_some() {
            cost::MAX_TRY_WITH_ZONE
        } else {
            cost::MAX_TRY
        };
        let bbox_area = self.bbox().area();
        let diago = (w * w / 4.0 + h * h / 4.0).sqrt();

        let first = out.len();
        let mut spacing = 1.0 / per_area.sqrt();
        let mut num_try = 0;
        loop {
            for b in &boxes {
                let mut d = spacing;
                if num_try == 0 && max > 0 {
                    let max_this_box = target as f64 * b.area() / total_area;
                    d = d.max((b.area() / max_this_box).sqrt() * cost::FIRST_TRY_SPACING);
                }
                if pal.is_canceled() {
                    return out.len() - first;
                }
                if b.area() > bbox_area * cost::OVERSIZED_BOX {
                    continue;
                }
                if let (Arrangement::Horizontal, Some(z)) = (lf.layer.arrangement, zone) {
                    if z.bbox().width() < w || z.bbox().height() < h {
                        continue;
                    }
                }

                let alpha = self.grid_angle(b, w, h, |p| part.contains_point(p));
                let beta = h.atan2(w) + alpha;
                let to_corner = Vec2::new(beta.cos() * diago, beta.sin() * diago);

                let px0 = b.width / 2.0 - (b.width / 2.0 / d).ceil() * d;
                let py0 = b.length / 2.0 - (b.length / 2.0 / d).ceil() * d;
                let mut px = px0;
                while px <= b.width {
                    if pal.is_canceled() {
                        break;
                    }
                    let mut py = py0;
                    while py <= b.length {
                        let center = b.grid_point(px, py);
                        let anchor = center - to_corner;
                        let keep = match zone {
                            Some(z) => z.contains_candidate(&rect_corners(anchor.x, anchor.y, w, h, alpha)),
                            None => part.contains_point(center),
                        };
                        if keep {
                            out.push(LabelPosition::new(
                                anchor.x,
                                anchor.y,
                                w,
                                h,
                                alpha,
                                cost::INTERIOR,
                                self,
                                false,
                                Quadrant::Over,
                            ));
                        }
                        py += d;
                    }
                    px += d;
                }
            }

            let generated = out.len() - first;
            if max > 0 && generated < target && num_try + 1 < max_try {
                debug!(feature = lf.id, generated, target, num_try, "halving polygon grid spacing");
                out.truncate(first);
                spacing /= 2.0;
                num_try += 1;
            } else {
                break;
            }
        }
        out.len() - first
    }

    /// Label angle for the grid in box `b`.
    ///
    /// Horizontal arrangement, and free arrangement when a label at twice its
    /// size fits flat around the box center, keep the label at 0. Otherwise
    /// the label follows the box, turned to run along its longer side.
    fn grid_angle(&self, b: &OrientedBox, w: f64, h: f64, inside: impl Fn(Vec2) -> bool) -> f64 {
        let arrangement = self.feature().layer.arrangement;
        let fits_flat = arrangement == Arrangement::Free && {
            let c = b.center();
            let origin = c - Vec2::new(w, h);
            [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (2.0, 2.0)]
                .iter()
                .all(|&(i, j)| inside(origin + Vec2::new(i * w, j * h)))
        };
        if arrangement == Arrangement::Horizontal || fits_flat {
            0.0
        } else if b.length > 1.5 * w && b.width > 1.5 * w {
            if b.alpha <= FRAC_PI_4 {
                b.alpha
            } else {
                b.alpha - FRAC_PI_2
            }
        } else if b.length > b.width {
            b.alpha - FRAC_PI_2
        } else {
            b.alpha
        }
    }
}
