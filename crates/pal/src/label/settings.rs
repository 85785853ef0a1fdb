//! Engine-wide and per-layer placement settings.
//!
//! All types deserialize with `#[serde(default)]` so scene files only need to
//! name the fields they change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placement arrangement selected per layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arrangement {
    /// Radial sweep around points (and polygon centroids).
    #[default]
    AroundPoint,
    /// Single candidate over the point, shifted by the quadrant offset.
    OverPoint,
    /// Rotated candidates along lines (and polygon perimeters).
    Line,
    /// Character-by-character placement along lines.
    Curved,
    /// Axis-aligned candidates along lines or inside polygons.
    Horizontal,
    /// Polygon interior grid, rotated to the box unless the label fits flat.
    Free,
    /// Caller-ordered list of predefined positions around points.
    OrderedPositionsAroundPoint,
    /// Curved placement along polygon perimeters.
    PerimeterCurved,
    /// Polygon labels outside the polygon only.
    OutsidePolygons,
}

/// Which sides of a line candidates may use.
///
/// With no side flag set, candidates are placed on the line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePlacementFlags {
    pub on_line: bool,
    pub above_line: bool,
    pub below_line: bool,
    /// Above/below follow the map rather than the line direction.
    pub map_orientation: bool,
}

impl LinePlacementFlags {
    pub const ON_LINE: Self = Self {
        on_line: true,
        above_line: false,
        below_line: false,
        map_orientation: false,
    };

    /// Flags with the empty set replaced by `on_line`.
    pub fn effective(self) -> Self {
        if self.on_line || self.above_line || self.below_line {
            self
        } else {
            Self {
                on_line: true,
                ..self
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonPlacementFlags {
    pub allow_inside: bool,
    pub allow_outside: bool,
}

impl Default for PolygonPlacementFlags {
    fn default() -> Self {
        Self {
            allow_inside: true,
            allow_outside: false,
        }
    }
}

/// Policy for labels whose characters would render upside down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsideDownLabels {
    /// Always keep labels upright.
    #[default]
    Upright,
    /// Keep upright only labels without a defined rotation.
    ShowDefined,
    /// Never correct.
    ShowAll,
}

/// The twelve predefined positions around a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredefinedPointPosition {
    TopLeft,
    TopSlightlyLeft,
    TopMiddle,
    TopSlightlyRight,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomSlightlyLeft,
    BottomMiddle,
    BottomSlightlyRight,
    BottomRight,
}

impl PredefinedPointPosition {
    pub const ALL: [PredefinedPointPosition; 12] = [
        Self::TopLeft,
        Self::TopSlightlyLeft,
        Self::TopMiddle,
        Self::TopSlightlyRight,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomSlightlyLeft,
        Self::BottomMiddle,
        Self::BottomSlightlyRight,
        Self::BottomRight,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineAnchorType {
    /// The anchor biases cost only.
    #[default]
    HintOnly,
    /// A single candidate pinned at the anchor.
    Strict,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetType {
    #[default]
    FromPoint,
    FromSymbolBounds,
}

/// Visual margins around the label text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Engine-wide candidate densities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalSettings {
    pub line_candidates_per_map_unit: f64,
    pub polygon_candidates_per_map_unit_squared: f64,
}

impl Default for PalSettings {
    fn default() -> Self {
        Self {
            line_candidates_per_map_unit: 0.1,
            polygon_candidates_per_map_unit_squared: 0.01,
        }
    }
}

/// Per-layer placement configuration shared by every feature of the layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub name: String,
    pub arrangement: Arrangement,
    /// 0 means the generator default (16 for the radial sweep, unlimited otherwise).
    pub max_point_candidates: usize,
    /// 0 means no cap beyond the density.
    pub max_line_candidates: usize,
    /// 0 means no cap beyond the density.
    pub max_polygon_candidates: usize,
    pub priority: f64,
    pub upside_down_labels: UpsideDownLabels,
    /// Force polygon centroids onto the surface.
    pub centroid_inside: bool,
    /// Feature id to connected-feature id.
    pub connected_features: HashMap<i64, i64>,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            arrangement: Arrangement::default(),
            max_point_candidates: 0,
            max_line_candidates: 0,
            max_polygon_candidates: 0,
            priority: 0.5,
            upside_down_labels: UpsideDownLabels::default(),
            centroid_inside: false,
            connected_features: HashMap::new(),
        }
    }
}

impl LayerSettings {
    pub fn new(name: impl Into<String>, arrangement: Arrangement) -> Self {
        Self {
            name: name.into(),
            arrangement,
            ..Self::default()
        }
    }

    /// Curved arrangements place glyph by glyph.
    pub fn is_curved(&self) -> bool {
        matches!(self.arrangement, Arrangement::Curved | Arrangement::PerimeterCurved)
    }

    /// Connected-feature id of `feature_id`, or -1 when it is not connected.
    pub fn connected_feature_id(&self, feature_id: i64) -> i64 {
        self.connected_features.get(&feature_id).copied().unwrap_or(-1)
    }
}
