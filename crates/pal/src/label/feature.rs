//! Per-feature label metadata consumed by the generators.

use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::settings::{
    LayerSettings, LineAnchorType, LinePlacementFlags, Margins, OffsetType, PolygonPlacementFlags,
    PredefinedPointPosition, Size,
};
use crate::error::GeometryError;
use crate::geom::{GeomCfg, GeometryType, PointSet, PreparedGeometry, Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub width: f64,
}

/// Glyph metrics for curved labels. Immutable during generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelInfo {
    pub char_info: Vec<CharacterInfo>,
    pub label_height: f64,
    /// Largest bend towards the inside of a curve, degrees (> 0 enables the check).
    pub max_char_angle_inside: f64,
    /// Largest bend towards the outside of a curve, degrees (< 0 enables the check).
    pub max_char_angle_outside: f64,
}

impl Default for LabelInfo {
    fn default() -> Self {
        Self {
            char_info: Vec::new(),
            label_height: 0.0,
            max_char_angle_inside: 20.0,
            max_char_angle_outside: -20.0,
        }
    }
}

impl LabelInfo {
    /// Outside limits are stored negative regardless of the sign passed in.
    pub fn new(widths: &[f64], label_height: f64, max_inside: f64, max_outside: f64) -> Self {
        Self {
            char_info: widths.iter().map(|&width| CharacterInfo { width }).collect(),
            label_height,
            max_char_angle_inside: max_inside,
            max_char_angle_outside: if max_outside > 0.0 { -max_outside } else { max_outside },
        }
    }

    #[inline]
    pub fn char_num(&self) -> usize {
        self.char_info.len()
    }

    pub fn total_width(&self) -> f64 {
        self.char_info.iter().map(|c| c.width).sum()
    }
}

/// Label metadata of one map feature, shared by all of its parts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelFeature {
    pub id: i64,
    #[serde(skip)]
    pub layer: Arc<LayerSettings>,
    pub size: Size,
    /// Size used when the label is rotated by roughly a quarter turn.
    pub rotated_size: Option<Size>,
    pub fixed_position: Option<Vec2>,
    /// Fixed rotation in radians.
    pub fixed_angle: Option<f64>,
    pub fixed_quadrant: bool,
    /// Quadrant offset, each axis in [-1, 1]; negative y means above.
    pub quad_offset: Vec2,
    pub position_offset: Vec2,
    pub dist_label: f64,
    pub offset_type: OffsetType,
    pub symbol_size: Size,
    pub visual_margin: Margins,
    pub predefined_positions: Vec<PredefinedPointPosition>,
    pub label_info: Option<LabelInfo>,
    pub overrun_distance: f64,
    pub overrun_smooth_distance: f64,
    pub line_anchor_type: LineAnchorType,
    pub line_anchor_percent: f64,
    pub line_flags: LinePlacementFlags,
    pub polygon_flags: PolygonPlacementFlags,
    /// Negative means "use the layer priority".
    pub priority: f64,
    pub always_show: bool,
    #[serde(skip)]
    permissible_zone: Option<PreparedGeometry>,
}

impl Default for LabelFeature {
    fn default() -> Self {
        Self {
            id: 0,
            layer: Arc::default(),
            size: Size::default(),
            rotated_size: None,
            fixed_position: None,
            fixed_angle: None,
            fixed_quadrant: false,
            quad_offset: Vec2::zeros(),
            position_offset: Vec2::zeros(),
            dist_label: 0.0,
            offset_type: OffsetType::default(),
            symbol_size: Size::default(),
            visual_margin: Margins::default(),
            predefined_positions: PredefinedPointPosition::ALL.to_vec(),
            label_info: None,
            overrun_distance: 0.0,
            overrun_smooth_distance: 0.0,
            line_anchor_type: LineAnchorType::default(),
            line_anchor_percent: 0.5,
            line_flags: LinePlacementFlags::default(),
            polygon_flags: PolygonPlacementFlags::default(),
            priority: -1.0,
            always_show: false,
            permissible_zone: None,
        }
    }
}

impl LabelFeature {
    pub fn new(id: i64, layer: Arc<LayerSettings>, size: Size) -> Self {
        Self {
            id,
            layer,
            size,
            ..Self::default()
        }
    }

    /// Restrict candidates to a polygon zone (exterior ring only).
    pub fn with_permissible_zone(mut self, ring: Vec<Vec2>) -> Result<Self, GeometryError> {
        let shape = PointSet::new(GeometryType::Polygon, ring)?;
        self.permissible_zone = Some(PreparedGeometry::new(&shape, &[], GeomCfg::default())?);
        Ok(self)
    }

    #[inline]
    pub fn permissible_zone(&self) -> Option<&PreparedGeometry> {
        self.permissible_zone.as_ref()
    }

    #[inline]
    pub fn has_fixed_position(&self) -> bool {
        self.fixed_position.is_some()
    }

    #[inline]
    pub fn has_fixed_rotation(&self) -> bool {
        self.fixed_angle.is_some()
    }

    /// Label size at `angle` (radians): the rotated size applies within
    /// [45°, 135°] and [225°, 315°].
    pub fn size_at(&self, angle: f64) -> Size {
        let Some(rotated) = self.rotated_size else {
            return self.size;
        };
        let deg = crate::geom::normalized_angle(angle) * 180.0 / PI;
        if (45.0..=135.0).contains(&deg) || (225.0..=315.0).contains(&deg) {
            rotated
        } else {
            self.size
        }
    }

    #[inline]
    pub fn label_width(&self, angle: f64) -> f64 {
        self.size_at(angle).width
    }

    #[inline]
    pub fn label_height(&self, angle: f64) -> f64 {
        self.size_at(angle).height
    }
}
