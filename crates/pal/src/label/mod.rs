//! Label metadata and candidates.
//!
//! - `settings`: arrangement enums, placement flags, layer and engine settings.
//! - `feature`: per-feature label metadata (`LabelFeature`) and curved glyph
//!   metrics (`LabelInfo`).
//! - `position`: scored candidates (`LabelPosition`) and `Quadrant`.

pub mod feature;
pub mod position;
pub mod settings;

pub use feature::{CharacterInfo, LabelFeature, LabelInfo};
pub use position::{rect_corners, LabelPosition, Quadrant};
pub use settings::{
    Arrangement, LayerSettings, LineAnchorType, LinePlacementFlags, Margins, OffsetType, PalSettings,
    PolygonPlacementFlags, PredefinedPointPosition, Size, UpsideDownLabels,
};

#[cfg(test)]
mod tests;
