use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use super::*;
use crate::geom::{GeometryType, Vec2};
use crate::part::FeaturePart;

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

fn point_part() -> FeaturePart {
    let layer = Arc::new(LayerSettings::new("places", Arrangement::AroundPoint));
    let lf = LabelFeature::new(7, layer, Size::new(10.0, 4.0));
    FeaturePart::new(Arc::new(lf), GeometryType::Point, vec![v(0.0, 0.0)]).unwrap()
}

#[test]
fn rotated_size_applies_near_quarter_turns() {
    let mut lf = LabelFeature::new(1, Arc::default(), Size::new(10.0, 4.0));
    assert_eq!(lf.size_at(FRAC_PI_2), Size::new(10.0, 4.0));

    lf.rotated_size = Some(Size::new(4.0, 10.0));
    assert_eq!(lf.label_width(0.0), 10.0);
    assert_eq!(lf.label_width(0.3 * PI), 4.0);
    assert_eq!(lf.label_width(FRAC_PI_2), 4.0);
    assert_eq!(lf.label_width(PI), 10.0);
    assert_eq!(lf.label_height(-FRAC_PI_2), 10.0);
    assert_eq!(lf.label_height(1.4 * PI), 10.0);
    assert_eq!(lf.label_height(1.9 * PI), 4.0);
}

#[test]
fn label_info_stores_outside_limit_negative() {
    let a = LabelInfo::new(&[3.0, 4.0, 5.0], 6.0, 25.0, 30.0);
    let b = LabelInfo::new(&[3.0, 4.0, 5.0], 6.0, 25.0, -30.0);
    assert_eq!(a, b);
    assert_eq!(a.max_char_angle_outside, -30.0);
    assert_eq!(a.char_num(), 3);
    assert_eq!(a.total_width(), 12.0);
}

#[test]
fn feature_defaults_match_unconfigured_labels() {
    let lf = LabelFeature::default();
    assert_eq!(lf.line_anchor_percent, 0.5);
    assert_eq!(lf.predefined_positions.len(), 12);
    assert!(lf.priority < 0.0);
    assert!(lf.polygon_flags.allow_inside && !lf.polygon_flags.allow_outside);
    assert!(lf.permissible_zone().is_none());
    assert!(!lf.has_fixed_position() && !lf.has_fixed_rotation());
}

#[test]
fn permissible_zone_rejects_degenerate_rings() {
    let lf = LabelFeature::default();
    assert!(lf.clone().with_permissible_zone(vec![v(0.0, 0.0), v(1.0, 0.0)]).is_err());
    let zoned = lf
        .with_permissible_zone(vec![v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)])
        .unwrap();
    let zone = zoned.permissible_zone().unwrap();
    assert!(zone.contains_candidate(&rect_corners(1.0, 1.0, 5.0, 2.0, 0.0)));
    assert!(!zone.contains_candidate(&rect_corners(8.0, 1.0, 5.0, 2.0, 0.0)));
}

#[test]
fn empty_line_flags_fall_back_to_on_line() {
    let empty = LinePlacementFlags::default().effective();
    assert_eq!(empty, LinePlacementFlags::ON_LINE);

    let above = LinePlacementFlags {
        above_line: true,
        map_orientation: true,
        ..LinePlacementFlags::default()
    };
    assert_eq!(above.effective(), above);
}

#[test]
fn connected_feature_lookup() {
    let mut layer = LayerSettings::new("roads", Arrangement::Line);
    layer.connected_features.insert(4, 9);
    assert_eq!(layer.connected_feature_id(4), 9);
    assert_eq!(layer.connected_feature_id(5), -1);
    assert!(!layer.is_curved());
    layer.arrangement = Arrangement::PerimeterCurved;
    assert!(layer.is_curved());
}

#[test]
fn settings_deserialize_with_defaults() {
    let layer: LayerSettings = serde_json::from_str(r#"{"name": "roads", "arrangement": "Curved"}"#).unwrap();
    assert_eq!(layer.arrangement, Arrangement::Curved);
    assert_eq!(layer.priority, 0.5);
    assert_eq!(layer.upside_down_labels, UpsideDownLabels::Upright);

    let pal: PalSettings = serde_json::from_str(r#"{"line_candidates_per_map_unit": 0.5}"#).unwrap();
    assert_eq!(pal.line_candidates_per_map_unit, 0.5);
    assert_eq!(pal.polygon_candidates_per_map_unit_squared, 0.01);

    let lf: LabelFeature =
        serde_json::from_str(r#"{"id": 3, "size": {"width": 12.0, "height": 3.0}, "dist_label": 1.5}"#).unwrap();
    assert_eq!(lf.id, 3);
    assert_eq!(lf.size, Size::new(12.0, 3.0));
    assert_eq!(lf.dist_label, 1.5);
    assert_eq!(lf.line_anchor_percent, 0.5);
}

#[test]
fn rect_corners_rotate_around_anchor() {
    let c = rect_corners(1.0, 2.0, 4.0, 2.0, FRAC_PI_2);
    let expected = [v(1.0, 2.0), v(1.0, 6.0), v(-1.0, 6.0), v(-1.0, 2.0)];
    for (a, b) in c.iter().zip(&expected) {
        assert!((a - b).norm() < 1e-12, "{a:?} vs {b:?}");
    }
}

#[test]
fn cost_updates_never_go_negative() {
    let fp = point_part();
    let mut p = LabelPosition::new(0.0, 0.0, 10.0, 4.0, 0.0, -1.0, &fp, false, Quadrant::Over);
    assert_eq!(p.cost(), 0.0);
    p.add_cost(0.25);
    p.add_cost(-1.0);
    assert_eq!(p.cost(), 0.25);
    p.set_cost(-3.0);
    assert_eq!(p.cost(), 0.0);
    assert_eq!(p.feature().feature_id(), 7);
}

#[test]
fn distance_to_point_measures_to_rotated_box() {
    let fp = point_part();
    let flat = LabelPosition::new(0.0, 0.0, 10.0, 4.0, 0.0, 0.0, &fp, false, Quadrant::Over);
    assert_eq!(flat.distance_to_point(v(5.0, 2.0)), 0.0);
    assert!((flat.distance_to_point(v(13.0, 8.0)) - 5.0).abs() < 1e-12);
    assert!((flat.distance_to_point(v(-2.0, 1.0)) - 2.0).abs() < 1e-12);

    let upright = LabelPosition::new(0.0, 0.0, 10.0, 4.0, FRAC_PI_2, 0.0, &fp, false, Quadrant::Over);
    assert!((upright.center() - v(-2.0, 5.0)).norm() < 1e-12);
    assert!((upright.distance_to_point(v(0.0, 12.0)) - 2.0).abs() < 1e-12);
}

#[test]
fn offset_moves_every_part() {
    let fp = point_part();
    let mut head = LabelPosition::new(0.0, 0.0, 2.0, 4.0, 0.0, 0.0, &fp, false, Quadrant::Over);
    head.set_part_id(0);
    let mut tail = LabelPosition::new(2.0, 0.0, 2.0, 4.0, 0.0, 0.0, &fp, false, Quadrant::Over);
    tail.set_part_id(1);
    head.push_part(tail);
    head.offset_position(1.0, -1.0);

    assert_eq!(head.part_count(), 2);
    let xs: Vec<(f64, f64)> = head.parts().map(|p| (p.x(), p.y())).collect();
    assert_eq!(xs, vec![(1.0, -1.0), (3.0, -1.0)]);
    assert_eq!(head.next_parts()[0].part_id(), Some(1));
}

#[test]
fn quadrant_names_are_snake_case() {
    assert_eq!(Quadrant::AboveLeft.as_str(), "above_left");
    assert_eq!(Quadrant::Over.as_str(), "over");
    assert_eq!(Quadrant::BelowRight.as_str(), "below_right");
}
