//! JSON scene files: engine settings, layers and labeled features.
//!
//! Every settings type deserializes with defaults, so a scene only needs a
//! layer name per layer and `kind` plus coordinates per feature part.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use pal::api::{
    Arrangement, FeaturePart, GeometryType, LabelFeature, LayerSettings, PalSettings, Size, SynthCfg,
    SynthGeometry, Vec2,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub settings: PalSettings,
    pub layers: Vec<LayerSettings>,
    pub features: Vec<SceneFeature>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFeature {
    /// Name of a layer in `Scene::layers`.
    pub layer: String,
    pub label: LabelFeature,
    pub parts: Vec<ScenePart>,
    /// Optional permissible zone (exterior ring).
    pub zone: Option<Vec<Vec2>>,
    /// Merge line parts that share endpoints before generation.
    pub merge_lines: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenePart {
    pub kind: GeometryType,
    pub coords: Vec<Vec2>,
    #[serde(default)]
    pub holes: Vec<Vec<Vec2>>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading scene {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing scene {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing scene {}", path.display()))
    }

    /// Build the feature parts of every feature, in scene order.
    ///
    /// A feature naming an unknown layer is an error. A part with invalid
    /// geometry is skipped with a warning; the rest of the scene still builds.
    pub fn build_parts(&self) -> Result<Vec<FeaturePart>> {
        let layers: HashMap<&str, Arc<LayerSettings>> = self
            .layers
            .iter()
            .map(|l| (l.name.as_str(), Arc::new(l.clone())))
            .collect();

        let mut out = Vec::new();
        for feature in &self.features {
            let Some(layer) = layers.get(feature.layer.as_str()) else {
                bail!("feature {} names unknown layer {:?}", feature.label.id, feature.layer);
            };
            let mut lf = feature.label.clone();
            lf.layer = layer.clone();
            if let Some(zone) = &feature.zone {
                lf = lf
                    .with_permissible_zone(zone.clone())
                    .with_context(|| format!("zone of feature {}", feature.label.id))?;
            }
            let lf = Arc::new(lf);

            let mut parts = Vec::with_capacity(feature.parts.len());
            for (i, part) in feature.parts.iter().enumerate() {
                let built = match part.kind {
                    GeometryType::Polygon => {
                        FeaturePart::with_holes(lf.clone(), part.coords.clone(), part.holes.clone())
                    }
                    kind => FeaturePart::new(lf.clone(), kind, part.coords.clone()),
                };
                match built {
                    Ok(fp) => parts.push(fp),
                    Err(err) => tracing::warn!(feature = lf.id, part = i, %err, "skipping part"),
                }
            }
            if feature.merge_lines {
                parts = merge_line_parts(parts);
            }
            out.extend(parts);
        }
        Ok(out)
    }

    /// A scene around synthetic geometries, one layer per geometry type.
    pub fn synthetic(geometries: Vec<SynthGeometry>, cfg: &SynthCfg) -> Self {
        let layers = vec![
            LayerSettings::new("points", Arrangement::AroundPoint),
            LayerSettings::new("lines", Arrangement::Line),
            LayerSettings::new("polygons", Arrangement::Free),
        ];
        let features = geometries
            .into_iter()
            .enumerate()
            .map(|(i, g)| {
                let layer = match g.kind {
                    GeometryType::Point => "points",
                    GeometryType::Line => "lines",
                    GeometryType::Polygon => "polygons",
                };
                let mut label = LabelFeature::new(i as i64, Arc::default(), Size::new(30.0, 8.0));
                label.dist_label = 2.0;
                SceneFeature {
                    layer: layer.to_string(),
                    label,
                    parts: vec![ScenePart {
                        kind: g.kind,
                        coords: g.coords,
                        holes: Vec::new(),
                    }],
                    ..SceneFeature::default()
                }
            })
            .collect();
        Self {
            settings: PalSettings {
                polygon_candidates_per_map_unit_squared: 4.0 / (cfg.polygon_radius.1 * cfg.polygon_radius.1),
                ..PalSettings::default()
            },
            layers,
            features,
        }
    }
}

/// Greedily merge line parts that share an endpoint. Other parts pass through.
fn merge_line_parts(parts: Vec<FeaturePart>) -> Vec<FeaturePart> {
    let (mut lines, mut rest): (Vec<_>, Vec<_>) =
        parts.into_iter().partition(|p| p.geometry_type() == GeometryType::Line);
    let mut merged: Vec<FeaturePart> = Vec::with_capacity(lines.len());
    while let Some(mut current) = lines.pop() {
        loop {
            let before = lines.len();
            lines.retain(|other| current.merge_with(other).is_err());
            if lines.len() == before {
                break;
            }
        }
        merged.push(current);
    }
    rest.extend(merged);
    rest
}
