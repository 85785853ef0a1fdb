//! Feature parts and candidate generation.
//!
//! Purpose
//! - `FeaturePart` owns one connected piece of a feature's geometry (plus
//!   its holes), exposes measures and topology queries, and generates scored
//!   `LabelPosition` candidates for the downstream optimizer.
//! - Generation is split per placement family: `point`, `line`, `curved`,
//!   `polygon` (interior grid) and `outside` (polygon exterior). Each
//!   family extends `FeaturePart` with its own `impl` block.
//!
//! Caches
//! - The prepared geometry and the memoized candidate limits live in
//!   `OnceCell`s. They are filled on first use and dropped on merge or clone;
//!   a part is therefore `Send` but not `Sync`. Parallel callers hand whole
//!   parts to worker threads.
//!
//! Errors
//! - Construction and `merge_with` return `GeometryError`. Generators never
//!   fail: geometry errors are logged and yield no candidates.

pub mod costs;
mod curved;
mod line;
mod outside;
mod point;
mod polygon;

use std::cell::OnceCell;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::Pal;
use crate::error::GeometryError;
use crate::geom::{line_merge, BBox, GeomCfg, GeometryType, PointSet, PreparedGeometry, Vec2};
use crate::label::{rect_corners, LabelFeature, LabelPosition, Quadrant, UpsideDownLabels};

pub struct FeaturePart {
    lf: Arc<LabelFeature>,
    shape: PointSet,
    holes: Vec<FeaturePart>,
    is_hole: bool,
    total_repeats: usize,
    cfg: GeomCfg,
    prepared: OnceCell<PreparedGeometry>,
    max_line_candidates: OnceCell<usize>,
    max_polygon_candidates: OnceCell<usize>,
}

impl FeaturePart {
    /// Build a part from raw coordinates.
    pub fn new(lf: Arc<LabelFeature>, kind: GeometryType, pts: Vec<Vec2>) -> Result<Self, GeometryError> {
        let shape = PointSet::new(kind, pts)?;
        Ok(Self::from_shape(lf, shape, false))
    }

    /// Build a polygon part with holes.
    pub fn with_holes(
        lf: Arc<LabelFeature>,
        exterior: Vec<Vec2>,
        holes: Vec<Vec<Vec2>>,
    ) -> Result<Self, GeometryError> {
        let mut part = Self::new(lf.clone(), GeometryType::Polygon, exterior)?;
        for ring in holes {
            let shape = PointSet::new(GeometryType::Polygon, ring)?;
            part.holes.push(Self::from_shape(lf.clone(), shape, true));
        }
        Ok(part)
    }

    fn from_shape(lf: Arc<LabelFeature>, shape: PointSet, is_hole: bool) -> Self {
        Self {
            lf,
            shape,
            holes: Vec::new(),
            is_hole,
            total_repeats: 0,
            cfg: GeomCfg::default(),
            prepared: OnceCell::new(),
            max_line_candidates: OnceCell::new(),
            max_polygon_candidates: OnceCell::new(),
        }
    }

    #[inline]
    pub fn feature(&self) -> &LabelFeature {
        &self.lf
    }

    #[inline]
    pub fn label_feature(&self) -> &Arc<LabelFeature> {
        &self.lf
    }

    #[inline]
    pub fn feature_id(&self) -> i64 {
        self.lf.id
    }

    #[inline]
    pub fn geometry_type(&self) -> GeometryType {
        self.shape.kind()
    }

    #[inline]
    pub fn shape(&self) -> &PointSet {
        &self.shape
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        self.shape.bbox()
    }

    /// Holes owned by this part; each reports `is_hole() == true`.
    #[inline]
    pub fn holes(&self) -> &[FeaturePart] {
        &self.holes
    }

    #[inline]
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    #[inline]
    pub fn total_repeats(&self) -> usize {
        self.total_repeats
    }

    pub fn set_total_repeats(&mut self, total_repeats: usize) {
        self.total_repeats = total_repeats;
    }

    /// Line length (ring perimeter for polygons).
    pub fn length(&self) -> f64 {
        self.shape.length()
    }

    /// Polygon area with holes subtracted; zero for points and lines.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| h.shape.ring_area()).sum();
        (self.shape.ring_area() - holes).max(0.0)
    }

    /// Lazily built predicate engine for this part (holes included).
    pub fn prepared(&self) -> Result<&PreparedGeometry, GeometryError> {
        if let Some(p) = self.prepared.get() {
            return Ok(p);
        }
        let holes: Vec<&PointSet> = self.holes.iter().map(|h| &h.shape).collect();
        let built = PreparedGeometry::new(&self.shape, &holes, self.cfg)?;
        Ok(self.prepared.get_or_init(|| built))
    }

    /// Drop the cached predicate engine; the next query rebuilds it.
    pub fn invalidate_prepared(&mut self) {
        self.prepared.take();
    }

    /// Centroid of the part; with `force_inside`, a point on the surface
    /// replaces a centroid that falls outside the polygon.
    pub fn centroid(&self, force_inside: bool) -> Vec2 {
        let prepared = match self.prepared() {
            Ok(p) => p,
            Err(err) => {
                warn!(feature = self.lf.id, %err, "centroid fallback to point set");
                return self.shape.centroid();
            }
        };
        let c = prepared.centroid();
        if force_inside && self.geometry_type() == GeometryType::Polygon && !prepared.contains_point(c) {
            match prepared.point_on_surface() {
                Ok(p) => return p,
                Err(err) => warn!(feature = self.lf.id, %err, "point on surface failed"),
            }
        }
        c
    }

    /// Memoized line candidate target: `ceil(density * length)` capped by the
    /// layer maximum, 1 for zero-length parts.
    pub fn max_line_candidates(&self, pal: &Pal) -> usize {
        *self.max_line_candidates.get_or_init(|| {
            let l = self.length();
            if l > 0.0 {
                let for_length = (pal.settings.line_candidates_per_map_unit * l).ceil() as usize;
                cap(for_length, self.lf.layer.max_line_candidates)
            } else {
                1
            }
        })
    }

    /// Memoized polygon candidate target, analogous to `max_line_candidates`.
    pub fn max_polygon_candidates(&self, pal: &Pal) -> usize {
        *self.max_polygon_candidates.get_or_init(|| {
            let a = self.area();
            if a > 0.0 {
                let for_area = (pal.settings.polygon_candidates_per_map_unit_squared * a).ceil() as usize;
                cap(for_area, self.lf.layer.max_polygon_candidates)
            } else {
                1
            }
        })
    }

    #[inline]
    pub fn max_point_candidates(&self) -> usize {
        self.lf.layer.max_point_candidates
    }

    /// Same layer, and either the same feature or the same connected feature.
    pub fn has_same_label_feature_as(&self, other: &FeaturePart) -> bool {
        if self.lf.layer.name != other.lf.layer.name {
            return false;
        }
        if self.lf.id == other.lf.id {
            return true;
        }
        let connected = self.lf.layer.connected_feature_id(self.lf.id);
        connected >= 0 && connected == self.lf.layer.connected_feature_id(other.lf.id)
    }

    /// Geometries touch: shared boundary, no shared interior.
    pub fn is_connected(&self, other: &FeaturePart) -> bool {
        match (self.prepared(), other.prepared()) {
            (Ok(a), Ok(b)) => a.touches(b),
            (Err(err), _) | (_, Err(err)) => {
                warn!(feature = self.lf.id, %err, "touches test failed");
                false
            }
        }
    }

    /// Merge another line part into this one.
    ///
    /// On failure `self` is left untouched. On success the coordinates are
    /// replaced, holes are dropped and all caches are reset.
    pub fn merge_with(&mut self, other: &FeaturePart) -> Result<(), GeometryError> {
        let merged = line_merge(&self.shape, &other.shape, self.cfg)?;
        self.shape = merged;
        self.holes.clear();
        self.invalidate_prepared();
        self.max_line_candidates.take();
        self.max_polygon_candidates.take();
        debug!(feature = self.lf.id, points = self.shape.len(), "merged line parts");
        Ok(())
    }

    /// Priority consumed by the optimizer.
    pub fn calculate_priority(&self) -> f64 {
        if self.lf.always_show {
            return costs::penalty::ALWAYS_SHOW_PRIORITY;
        }
        if self.lf.priority >= 0.0 {
            self.lf.priority
        } else {
            self.lf.layer.priority
        }
    }

    /// Whether generated labels must be kept upright.
    pub fn show_upright_labels(&self) -> bool {
        match self.lf.layer.upside_down_labels {
            UpsideDownLabels::Upright => true,
            UpsideDownLabels::ShowDefined => {
                !self.lf.has_fixed_rotation()
                    || (!self.lf.has_fixed_position() && self.lf.fixed_angle.unwrap_or(0.0) == 0.0)
            }
            UpsideDownLabels::ShowAll => false,
        }
    }

    #[inline]
    pub(crate) fn label_width(&self, angle: f64) -> f64 {
        self.lf.label_width(angle)
    }

    #[inline]
    pub(crate) fn label_height(&self, angle: f64) -> f64 {
        self.lf.label_height(angle)
    }

    /// Zero-cost candidate at a point on the part's surface.
    pub fn candidate_point_on_surface(&self) -> Option<LabelPosition<'_>> {
        let p = match self.prepared().and_then(|g| g.point_on_surface()) {
            Ok(p) => p,
            Err(err) => {
                warn!(feature = self.lf.id, %err, "point on surface failed");
                return None;
            }
        };
        Some(LabelPosition::new(
            p.x,
            p.y,
            self.label_width(0.0),
            self.label_height(0.0),
            0.0,
            0.0,
            self,
            false,
            Quadrant::Over,
        ))
    }

    /// Generate all candidates for this part.
    ///
    /// A fixed position short-circuits to a single zero-cost candidate.
    /// Otherwise the geometry type selects one generation function.
    /// Candidate ids are their index in the returned vector.
    pub fn create_candidates(&self, pal: &Pal) -> Vec<LabelPosition<'_>> {
        let angle = self.lf.fixed_angle.unwrap_or(0.0);
        let mut out = Vec::new();
        if let Some(p) = self.lf.fixed_position {
            out.push(LabelPosition::new(
                p.x,
                p.y,
                self.label_width(angle),
                self.label_height(angle),
                angle,
                0.0,
                self,
                false,
                Quadrant::Over,
            ));
        } else {
            match self.geometry_type() {
                GeometryType::Point => self.point_candidates(&mut out, angle),
                GeometryType::Line => self.line_candidates(&mut out, pal),
                GeometryType::Polygon => self.polygon_candidates(&mut out, angle, pal),
            }
        }
        for (i, c) in out.iter_mut().enumerate() {
            c.set_id(i);
        }
        debug!(feature = self.lf.id, kind = ?self.geometry_type(), count = out.len(), "created candidates");
        out
    }

    fn point_candidates<'a>(&'a self, out: &mut Vec<LabelPosition<'a>>, angle: f64) {
        use crate::label::Arrangement;
        let p = self.shape.pts()[0];
        match self.lf.layer.arrangement {
            Arrangement::OrderedPositionsAroundPoint => {
                self.create_candidates_at_ordered_positions_over_point(p, out, angle);
            }
            Arrangement::OverPoint => {
                self.create_candidates_over_point(p, out, angle);
            }
            _ if self.lf.fixed_quadrant => {
                self.create_candidates_over_point(p, out, angle);
            }
            _ => {
                self.create_candidates_around_point(p, out, angle);
            }
        }
    }

    fn line_candidates<'a>(&'a self, out: &mut Vec<LabelPosition<'a>>, pal: &Pal) {
        use crate::label::Arrangement;
        if self.lf.layer.arrangement == Arrangement::Horizontal {
            self.create_horizontal_candidates_along_line(out, &self.shape, pal);
        } else if self.lf.layer.is_curved() {
            self.create_curved_candidates_along_line(out, &self.shape, true, pal);
        } else {
            self.create_candidates_along_line(out, &self.shape, true, pal);
        }
    }

    fn polygon_candidates<'a>(&'a self, out: &mut Vec<LabelPosition<'a>>, angle: f64, pal: &Pal) {
        use crate::label::Arrangement;
        let lw = self.label_width(0.0);
        let lh = self.label_height(0.0);
        let flags = self.lf.polygon_flags;
        let arrangement = self.lf.layer.arrangement;
        let bbox = self.bbox();

        if (flags.allow_outside && !flags.allow_inside) || arrangement == Arrangement::OutsidePolygons {
            self.create_candidates_outside_polygon(out, pal);
            return;
        }
        if flags.allow_outside && (bbox.width() < lw || bbox.height() < lh) {
            self.create_candidates_outside_polygon(out, pal);
            return;
        }
        let mut created = 0;
        if flags.allow_inside {
            created = match arrangement {
                Arrangement::AroundPoint => {
                    let c = self.centroid(self.lf.layer.centroid_inside);
                    let mut n = 0;
                    if self.cfg.near(self.lf.dist_label, 0.0) {
                        n += self.create_candidate_centered_over_point(c, out, angle);
                    }
                    n + self.create_candidates_around_point(c, out, angle)
                }
                Arrangement::OverPoint => {
                    let c = self.centroid(self.lf.layer.centroid_inside);
                    self.create_candidates_over_point(c, out, angle)
                }
                Arrangement::Line => self.create_candidates_along_line(out, &self.shape, false, pal),
                Arrangement::PerimeterCurved => {
                    self.create_curved_candidates_along_line(out, &self.shape, false, pal)
                }
                _ => self.create_candidates_for_polygon(out, pal),
            };
        }
        if flags.allow_outside {
            let outside = self.create_candidates_outside_polygon(out, pal);
            debug!(feature = self.lf.id, inside = created, outside, "polygon exterior fallback");
        }
    }

    /// Add the size penalty for small lines and polygons relative to `extent`.
    pub fn add_size_penalty(&self, candidates: &mut [LabelPosition<'_>], extent: BBox) {
        use costs::penalty::{LINE_EXTENT_FRACTION, POLYGON_EXTENT_FRACTION, SIZE_DIVISOR};
        let size_cost = match self.geometry_type() {
            GeometryType::Line => {
                let l = self.length();
                if l <= 0.0 {
                    return;
                }
                let reference = extent.width().max(extent.height()) / LINE_EXTENT_FRACTION;
                if l >= reference {
                    return;
                }
                1.0 - l / reference
            }
            GeometryType::Polygon => {
                let a = self.area();
                if a <= 0.0 {
                    return;
                }
                let reference = extent.area() / POLYGON_EXTENT_FRACTION;
                if a >= reference {
                    return;
                }
                1.0 - a / reference
            }
            GeometryType::Point => return,
        };
        for c in candidates.iter_mut() {
            c.add_cost(size_cost / SIZE_DIVISOR);
        }
    }

    /// Zone check shared by the generators: no zone means everything passes.
    pub(crate) fn zone_allows(&self, x: f64, y: f64, w: f64, h: f64, alpha: f64) -> bool {
        match self.lf.permissible_zone() {
            Some(zone) => zone.contains_candidate(&rect_corners(x, y, w, h, alpha)),
            None => true,
        }
    }
}

impl Clone for FeaturePart {
    /// Deep copy: holes are cloned, caches start empty.
    fn clone(&self) -> Self {
        Self {
            lf: self.lf.clone(),
            shape: self.shape.clone(),
            holes: self.holes.clone(),
            is_hole: self.is_hole,
            total_repeats: self.total_repeats,
            cfg: self.cfg,
            prepared: OnceCell::new(),
            max_line_candidates: OnceCell::new(),
            max_polygon_candidates: OnceCell::new(),
        }
    }
}

impl std::fmt::Debug for FeaturePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturePart")
            .field("feature", &self.lf.id)
            .field("kind", &self.geometry_type())
            .field("points", &self.shape.len())
            .field("holes", &self.holes.len())
            .finish()
    }
}

#[inline]
fn cap(n: usize, max: usize) -> usize {
    if max == 0 {
        n
    } else {
        n.min(max)
    }
}

#[cfg(test)]
mod tests;
