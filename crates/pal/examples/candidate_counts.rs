//! Print candidate counts per arrangement for a small synthetic scene.
//!
//! Usage:
//!   cargo run -p pal --example candidate_counts -- 2025
//!
//! The optional argument is the scene seed.

use std::sync::Arc;

use pal::api::{
    draw_scene, Arrangement, FeaturePart, GeometryType, LabelFeature, LabelInfo, LayerSettings, Pal, PalSettings,
    Size, SynthCfg,
};

fn main() {
    let seed = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(2025u64);
    let scene = draw_scene(&SynthCfg::default(), seed, 3, 3, 3);
    let pal = Pal::new(PalSettings::default());
    for (i, g) in scene.iter().enumerate() {
        let arrangements: &[Arrangement] = match g.kind {
            GeometryType::Point => &[Arrangement::AroundPoint, Arrangement::OrderedPositionsAroundPoint],
            GeometryType::Line => &[Arrangement::Line, Arrangement::Horizontal, Arrangement::Curved],
            GeometryType::Polygon => &[Arrangement::AroundPoint, Arrangement::Free, Arrangement::OutsidePolygons],
        };
        for &arrangement in arrangements {
            let layer = Arc::new(LayerSettings::new("demo", arrangement));
            let mut lf = LabelFeature::new(i as i64, layer, Size::new(30.0, 8.0));
            lf.label_info = Some(LabelInfo::new(&[5.0; 6], 8.0, 25.0, 25.0));
            lf.dist_label = 2.0;
            let fp = match FeaturePart::new(Arc::new(lf), g.kind, g.coords.clone()) {
                Ok(fp) => fp,
                Err(err) => {
                    eprintln!("feature {i}: {err}");
                    continue;
                }
            };
            let candidates = fp.create_candidates(&pal);
            let best = candidates.iter().map(|c| c.cost()).fold(f64::INFINITY, f64::min);
            println!(
                "feature {i} {:?} {arrangement:?}: {} candidates, best cost {best:.5}",
                g.kind,
                candidates.len()
            );
        }
    }
}
