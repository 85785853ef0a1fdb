use std::cell::Cell;
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use super::costs;
use super::*;
use crate::feedback::Feedback;
use crate::geom::wrap_angle;
use crate::label::{
    Arrangement, LabelInfo, LayerSettings, LineAnchorType, LinePlacementFlags, OffsetType, PalSettings,
    PolygonPlacementFlags, PredefinedPointPosition, Size,
};
use proptest::prelude::*;

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

fn pts(coords: &[(f64, f64)]) -> Vec<Vec2> {
    coords.iter().map(|&(x, y)| v(x, y)).collect()
}

fn square(x0: f64, y0: f64, side: f64) -> Vec<Vec2> {
    pts(&[(x0, y0), (x0 + side, y0), (x0 + side, y0 + side), (x0, y0 + side)])
}

fn layer(arrangement: Arrangement) -> LayerSettings {
    LayerSettings::new("roads", arrangement)
}

fn label(layer: LayerSettings, w: f64, h: f64) -> LabelFeature {
    LabelFeature::new(1, Arc::new(layer), Size::new(w, h))
}

fn part(lf: LabelFeature, kind: GeometryType, coords: Vec<Vec2>) -> FeaturePart {
    FeaturePart::new(Arc::new(lf), kind, coords).unwrap()
}

fn pal() -> Pal<'static> {
    Pal::new(PalSettings::default())
}

fn polygon_pal() -> Pal<'static> {
    Pal::new(PalSettings {
        polygon_candidates_per_map_unit_squared: 0.0025,
        ..PalSettings::default()
    })
}

fn costs_of(c: &[LabelPosition<'_>]) -> Vec<f64> {
    c.iter().map(|p| p.cost()).collect()
}

// ---------- points ----------

#[test]
fn around_point_produces_triangular_cost_waveform() {
    let mut l = layer(Arrangement::AroundPoint);
    l.max_point_candidates = 16;
    let mut lf = label(l, 10.0, 5.0);
    lf.dist_label = 2.0;
    let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 16);

    let costs = costs_of(&c);
    assert!((costs[0] - costs::point::AROUND_BASE).abs() < 1e-12);
    for i in 0..8 {
        assert!(costs[i] < costs[i + 1], "rising at {i}: {costs:?}");
    }
    for i in 8..15 {
        assert!(costs[i] > costs[i + 1], "falling at {i}: {costs:?}");
    }
    assert_eq!(c[0].quadrant(), Quadrant::AboveRight);
    assert_eq!(c[8].quadrant(), Quadrant::BelowLeft);
    for (i, p) in c.iter().enumerate() {
        assert_eq!(p.id(), i);
    }
}

#[test]
fn around_point_offsets_agree_with_quadrants() {
    let mut lf = label(layer(Arrangement::AroundPoint), 12.0, 4.0);
    lf.dist_label = 3.0;
    let fp = part(lf, GeometryType::Point, pts(&[(5.0, 5.0)]));
    for p in fp.create_candidates(&pal()) {
        let d = p.center() - v(5.0, 5.0);
        match p.quadrant() {
            Quadrant::Right => assert!(d.x > 0.0),
            Quadrant::Left => assert!(d.x < 0.0),
            Quadrant::Above => assert!(d.y > 0.0),
            Quadrant::Below => assert!(d.y < 0.0),
            Quadrant::AboveRight => assert!(d.x > 0.0 && d.y > 0.0),
            Quadrant::AboveLeft => assert!(d.x < 0.0 && d.y > 0.0),
            Quadrant::BelowLeft => assert!(d.x < 0.0 && d.y < 0.0),
            Quadrant::BelowRight => assert!(d.x > 0.0 && d.y < 0.0),
            Quadrant::Over => panic!("radial sweep never places over the point"),
        }
    }
}

#[test]
fn around_point_single_candidate_costs_base() {
    let mut l = layer(Arrangement::AroundPoint);
    l.max_point_candidates = 1;
    let fp = part(label(l, 10.0, 5.0), GeometryType::Point, pts(&[(0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].cost(), costs::point::AROUND_BASE);
}

#[test]
fn permissible_zone_filters_point_candidates() {
    let lf = label(layer(Arrangement::AroundPoint), 10.0, 5.0)
        .with_permissible_zone(pts(&[(0.0, 0.0), (30.0, 0.0), (30.0, 30.0), (0.0, 30.0)]))
        .unwrap();
    let fp = part(lf, GeometryType::Point, pts(&[(1.0, 1.0)]));
    let c = fp.create_candidates(&pal());
    assert!(!c.is_empty() && c.len() < 16);
    let zone = fp.feature().permissible_zone().unwrap();
    assert!(c.iter().all(|p| p.within(zone)));
}

#[test]
fn over_point_uses_quadrant_offset() {
    let mut lf = label(layer(Arrangement::OverPoint), 10.0, 4.0);
    lf.quad_offset = v(1.0, -1.0);
    let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].quadrant(), Quadrant::AboveRight);
    assert_eq!(c[0].cost(), costs::point::OVER_POINT);
    assert!((c[0].x() - 0.0).abs() < 1e-12);
    assert!((c[0].y() + 4.0).abs() < 1e-12);
}

#[test]
fn over_point_applies_position_offset_outside_around_mode() {
    let mut lf = label(layer(Arrangement::OverPoint), 10.0, 4.0);
    lf.position_offset = v(3.0, 2.0);
    let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c[0].quadrant(), Quadrant::Over);
    assert!((c[0].x() - (-5.0 + 3.0)).abs() < 1e-12);
    assert!((c[0].y() - (-2.0 + 2.0)).abs() < 1e-12);
}

#[test]
fn fixed_quadrant_selects_over_point_in_around_mode() {
    let mut lf = label(layer(Arrangement::AroundPoint), 10.0, 4.0);
    lf.fixed_quadrant = true;
    lf.quad_offset = v(0.0, 1.0);
    lf.dist_label = 2.0;
    let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].quadrant(), Quadrant::Below);
    // half height shift plus the label distance
    assert!((c[0].y() - (-2.0 + 2.0 + 2.0)).abs() < 1e-12);
}

#[test]
fn ordered_positions_follow_caller_order_and_cap() {
    let mut l = layer(Arrangement::OrderedPositionsAroundPoint);
    l.max_point_candidates = 3;
    let mut lf = label(l, 10.0, 4.0);
    lf.predefined_positions = vec![
        PredefinedPointPosition::BottomRight,
        PredefinedPointPosition::TopLeft,
        PredefinedPointPosition::MiddleRight,
        PredefinedPointPosition::TopMiddle,
    ];
    let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 3);
    assert_eq!(c[0].quadrant(), Quadrant::BelowRight);
    assert_eq!(c[1].quadrant(), Quadrant::AboveLeft);
    assert_eq!(c[2].quadrant(), Quadrant::Right);
    let costs = costs_of(&c);
    assert!((costs[0] - costs::point::ORDERED_BASE).abs() < 1e-12);
    assert!((costs[1] - costs[0] - costs::point::ORDERED_STEP).abs() < 1e-12);
    assert!((costs[2] - costs[1] - costs::point::ORDERED_STEP).abs() < 1e-12);
}

#[test]
fn ordered_positions_offset_by_symbol_bounds() {
    let mut lf = label(layer(Arrangement::OrderedPositionsAroundPoint), 10.0, 4.0);
    lf.predefined_positions = vec![PredefinedPointPosition::MiddleRight];
    lf.offset_type = OffsetType::FromSymbolBounds;
    lf.symbol_size = Size::new(6.0, 6.0);
    let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert!((c[0].x() - 3.0).abs() < 1e-12);
    assert!((c[0].y() + 2.0).abs() < 1e-12);
}

#[test]
fn fixed_position_short_circuits_generation() {
    let mut lf = label(layer(Arrangement::AroundPoint), 10.0, 4.0);
    lf.fixed_position = Some(v(7.0, 8.0));
    lf.fixed_angle = Some(0.3);
    let fp = part(lf, GeometryType::Polygon, square(0.0, 0.0, 100.0));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert_eq!((c[0].x(), c[0].y(), c[0].alpha(), c[0].cost()), (7.0, 8.0, 0.3, 0.0));
}

#[test]
fn fixed_angle_rotates_point_candidates() {
    let mut lf = label(layer(Arrangement::AroundPoint), 10.0, 4.0);
    lf.fixed_angle = Some(0.5);
    let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
    assert!(fp.create_candidates(&pal()).iter().all(|p| p.alpha() == 0.5));
}

// ---------- lines ----------

#[test]
fn short_open_line_centers_single_candidate_on_midpoint() {
    let mut lf = label(layer(Arrangement::Line), 20.0, 4.0);
    lf.overrun_distance = 10.0;
    let fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (6.0, 8.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    let center = c[0].center();
    assert!((center - v(3.0, 4.0)).norm() < 1e-9, "center {center:?}");
    assert!((c[0].alpha() - 8.0f64.atan2(6.0)).abs() < 1e-12);
}

#[test]
fn short_line_without_overrun_yields_nothing() {
    let fp = part(
        label(layer(Arrangement::Line), 20.0, 4.0),
        GeometryType::Line,
        pts(&[(0.0, 0.0), (6.0, 8.0)]),
    );
    assert!(fp.create_candidates(&pal()).is_empty());
}

#[test]
fn repeated_short_line_is_skipped_even_with_overrun() {
    let mut lf = label(layer(Arrangement::Line), 20.0, 4.0);
    lf.overrun_distance = 10.0;
    let mut fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (6.0, 8.0)]));
    fp.set_total_repeats(2);
    assert!(fp.create_candidates(&pal()).is_empty());
}

#[test]
fn straight_segments_never_cross_a_hard_break() {
    let fp = part(
        label(layer(Arrangement::Line), 20.0, 5.0),
        GeometryType::Line,
        pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]),
    );
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 32);
    for p in &c {
        let a = p.alpha();
        assert!(a.abs() < 1e-12 || (a - FRAC_PI_2).abs() < 1e-12, "angle {a}");
    }
}

#[test]
fn below_line_costs_more_than_above_line() {
    let mut lf = label(layer(Arrangement::Line), 20.0, 5.0);
    lf.line_flags = LinePlacementFlags {
        above_line: true,
        below_line: true,
        ..LinePlacementFlags::default()
    };
    lf.dist_label = 1.0;
    let fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (100.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert!(!c.is_empty() && c.len() % 2 == 0);
    for pair in c.chunks(2) {
        assert!(pair[0].y() > 0.0 && pair[1].y() < 0.0);
        assert!((pair[1].cost() - pair[0].cost() - costs::line::BELOW).abs() < 1e-12);
        assert!(!pair[0].reversed());
    }
}

#[test]
fn map_orientation_swaps_sides_on_right_to_left_lines() {
    let mut lf = label(layer(Arrangement::Line), 20.0, 5.0);
    lf.line_flags = LinePlacementFlags {
        above_line: true,
        map_orientation: true,
        ..LinePlacementFlags::default()
    };
    lf.dist_label = 1.0;
    let fp = part(lf, GeometryType::Line, pts(&[(100.0, 0.0), (0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert!(!c.is_empty());
    for p in &c {
        assert!(p.reversed());
        // rotated by π: the box body sits on the map's upper side
        assert!(p.center().y > 0.0);
    }
}

#[test]
fn horizontal_line_candidates_are_evenly_spaced() {
    let mut l = layer(Arrangement::Horizontal);
    l.max_line_candidates = 10;
    let fp = part(label(l, 8.0, 4.0), GeometryType::Line, pts(&[(0.0, 0.0), (110.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 12);
    assert!(c.iter().all(|p| p.alpha() == 0.0));
    assert!((c[0].center() - v(0.0, 0.0)).norm() < 1e-12);
    assert!((c[11].center() - v(110.0, 0.0)).norm() < 1e-9);
}

#[test]
fn strict_anchor_pins_a_single_horizontal_candidate() {
    let mut lf = label(layer(Arrangement::Horizontal), 8.0, 4.0);
    lf.line_anchor_type = LineAnchorType::Strict;
    lf.line_anchor_percent = 0.25;
    let fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (100.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert!((c[0].center() - v(25.0, 0.0)).norm() < 1e-12);
    assert_eq!(c[0].cost(), 0.0);
}

#[test]
fn cancellation_keeps_candidates_produced_so_far() {
    let fp = part(
        label(layer(Arrangement::Horizontal), 8.0, 4.0),
        GeometryType::Line,
        pts(&[(0.0, 0.0), (200.0, 0.0)]),
    );
    let calls = Cell::new(0usize);
    let after_five = || {
        calls.set(calls.get() + 1);
        calls.get() > 5
    };
    let pal = Pal::with_feedback(PalSettings::default(), &after_five);
    assert_eq!(fp.create_candidates(&pal).len(), 5);
    assert!(after_five.is_canceled());
}

#[test]
fn strict_anchor_pins_candidate_on_short_closed_line() {
    let ring = pts(&[(0.0, 0.0), (7.5, 0.0), (7.5, 7.5), (0.0, 7.5), (0.0, 0.0)]);
    let mut lf = label(layer(Arrangement::Line), 50.0, 4.0);
    lf.overrun_distance = 20.0;
    let hint = part(lf.clone(), GeometryType::Line, ring.clone());
    assert!(hint.create_candidates(&pal()).is_empty());

    lf.line_anchor_type = LineAnchorType::Strict;
    let strict = part(lf, GeometryType::Line, ring);
    let c = strict.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert!((c[0].alpha() - FRAC_PI_2).abs() < 1e-9);
}

#[test]
fn straight_runs_emit_below_before_above() {
    let mut lf = label(layer(Arrangement::Line), 20.0, 5.0);
    lf.line_flags = LinePlacementFlags {
        above_line: true,
        below_line: true,
        ..LinePlacementFlags::default()
    };
    lf.dist_label = 1.0;
    let fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]));
    let c = fp.create_candidates(&pal());
    assert!(c.len() >= 2);
    assert!((c[0].y() + 6.0).abs() < 1e-9, "first is below: {}", c[0].y());
    assert!((c[1].y() - 1.0).abs() < 1e-9, "second is above: {}", c[1].y());
    assert!((c[0].cost() - c[1].cost() - costs::line::BELOW).abs() < 1e-12);
}

#[test]
fn point_arrangements_give_lines_no_candidates() {
    for arrangement in [Arrangement::AroundPoint, Arrangement::OverPoint, Arrangement::Free] {
        let fp = part(
            label(layer(arrangement), 20.0, 5.0),
            GeometryType::Line,
            pts(&[(0.0, 0.0), (100.0, 0.0)]),
        );
        assert!(fp.create_candidates(&pal()).is_empty(), "{arrangement:?}");
    }
}

// ---------- curved ----------

fn curved_label(arrangement: Arrangement, widths: &[f64], h: f64) -> LabelFeature {
    let mut lf = label(layer(arrangement), widths.iter().sum(), h);
    lf.label_info = Some(LabelInfo::new(widths, h, 20.0, 20.0));
    lf
}

#[test]
fn curved_candidates_on_straight_line_are_flat_chains() {
    let lf = curved_label(Arrangement::Curved, &[4.0; 5], 6.0);
    let fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (100.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 9);
    for p in &c {
        assert_eq!(p.part_count(), 5);
        assert_eq!(p.upside_down_char_count(), 0);
        assert!(p.parts().all(|g| g.alpha().abs() < 1e-12));
        let ids: Vec<_> = p.parts().map(|g| g.part_id()).collect();
        assert_eq!(ids, (0..5).map(Some).collect::<Vec<_>>());
        assert!(p.cost() >= costs::curved::MIN + costs::curved::ON_LINE);
    }
}

#[test]
fn curved_labels_are_flipped_upright_on_reversed_lines() {
    let lf = curved_label(Arrangement::Curved, &[4.0; 5], 6.0);
    let fp = part(lf, GeometryType::Line, pts(&[(100.0, 0.0), (0.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert!(!c.is_empty());
    for p in &c {
        assert_eq!(p.upside_down_char_count(), 0);
        assert_eq!(p.part_count(), 5);
    }
}

#[test]
fn curved_generation_needs_glyph_metrics() {
    let fp = part(
        label(layer(Arrangement::Curved), 20.0, 6.0),
        GeometryType::Line,
        pts(&[(0.0, 0.0), (100.0, 0.0)]),
    );
    assert!(fp.create_candidates(&pal()).is_empty());
}

#[test]
fn sharp_corner_rejects_curved_chains_across_it() {
    let lf = curved_label(Arrangement::Curved, &[4.0; 5], 6.0);
    let fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]));
    let c = fp.create_candidates(&pal());
    for p in &c {
        let a: Vec<f64> = p.parts().map(|g| g.alpha()).collect();
        assert!(a.windows(2).all(|w| wrap_angle(w[1] - w[0]).abs() <= 20f64.to_radians() + 1e-9));
    }
}

#[test]
fn strict_curved_anchor_advances_past_unplaceable_offset() {
    let mut lf = curved_label(Arrangement::Curved, &[4.0; 5], 6.0);
    lf.line_anchor_type = LineAnchorType::Strict;
    lf.line_anchor_percent = 0.0;
    // zero-length first segment sits exactly at the anchor
    let fp = part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (0.0, 0.0), (100.0, 0.0)]));
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].part_count(), 5);
    assert!(c[0].x() > 0.0);
}

// ---------- polygons ----------

fn free_square_label() -> LabelFeature {
    label(layer(Arrangement::Free), 20.0, 10.0)
}

#[test]
fn square_polygon_gets_a_five_by_five_grid() {
    let fp = part(free_square_label(), GeometryType::Polygon, square(0.0, 0.0, 100.0));
    let c = fp.create_candidates(&polygon_pal());
    assert_eq!(c.len(), 25);
    for p in &c {
        assert_eq!(p.alpha(), 0.0);
        assert_eq!(p.cost(), costs::polygon::INTERIOR);
    }
}

#[test]
fn zone_smaller_than_label_removes_interior_candidates() {
    let lf = free_square_label()
        .with_permissible_zone(square(42.5, 42.5, 15.0))
        .unwrap();
    let fp = part(lf, GeometryType::Polygon, square(0.0, 0.0, 100.0));
    assert!(fp.create_candidates(&polygon_pal()).is_empty());
}

#[test]
fn zone_smaller_than_label_falls_back_to_exterior() {
    let mut lf = free_square_label()
        .with_permissible_zone(square(42.5, 42.5, 15.0))
        .unwrap();
    lf.polygon_flags = PolygonPlacementFlags {
        allow_inside: true,
        allow_outside: true,
    };
    lf.dist_label = 4.0;
    let fp = part(lf, GeometryType::Polygon, square(0.0, 0.0, 100.0));
    let c = fp.create_candidates(&polygon_pal());
    assert!(!c.is_empty());
    let shape = fp.prepared().unwrap();
    for p in &c {
        assert_eq!(p.alpha(), 0.0);
        assert!(shape.distance_to_rect(&p.corners()) > 2.0 - 1e-9);
        assert!((0.0..=1.0).contains(&p.cost()));
    }
}

#[test]
fn retry_halves_spacing_until_target_is_met() {
    let mut l = layer(Arrangement::Free);
    l.max_polygon_candidates = 25;
    let lf = label(l, 20.0, 10.0)
        .with_permissible_zone(pts(&[(0.0, 0.0), (50.0, 0.0), (50.0, 100.0), (0.0, 100.0)]))
        .unwrap();
    let fp = part(lf, GeometryType::Polygon, square(0.0, 0.0, 100.0));
    let c = fp.create_candidates(&polygon_pal());
    assert!(c.len() >= 25, "got {}", c.len());
    let zone = fp.feature().permissible_zone().unwrap();
    assert!(c.iter().all(|p| p.within(zone)));
}

#[test]
fn polygon_hole_excludes_grid_centers() {
    let lf = Arc::new(free_square_label());
    let fp = FeaturePart::with_holes(lf, square(0.0, 0.0, 100.0), vec![square(40.0, 40.0, 20.0)]).unwrap();
    assert!((fp.area() - 9600.0).abs() < 1e-9);
    assert!(fp.holes()[0].is_hole());
    let c = fp.create_candidates(&polygon_pal());
    assert_eq!(c.len(), 24);
    assert!(c.iter().all(|p| (p.center() - v(50.0, 50.0)).norm() > 1e-9));
}

#[test]
fn tiny_polygon_with_outside_allowed_only_gets_exterior_candidates() {
    let mut lf = label(layer(Arrangement::AroundPoint), 20.0, 10.0);
    lf.polygon_flags.allow_outside = true;
    lf.dist_label = 2.0;
    let fp = part(lf, GeometryType::Polygon, square(0.0, 0.0, 10.0));
    let c = fp.create_candidates(&pal());
    assert!(!c.is_empty());
    let shape = fp.prepared().unwrap();
    assert!(c.iter().all(|p| shape.distance_to_rect(&p.corners()) > 1.0 - 1e-9));
}

#[test]
fn around_point_polygon_adds_centered_candidate_without_distance() {
    let fp = part(
        label(layer(Arrangement::AroundPoint), 10.0, 4.0),
        GeometryType::Polygon,
        square(0.0, 0.0, 100.0),
    );
    let c = fp.create_candidates(&pal());
    assert_eq!(c.len(), 17);
    assert_eq!(c[0].cost(), costs::point::CENTERED);
    assert!((c[0].center() - v(50.0, 50.0)).norm() < 1e-9);
}

#[test]
fn line_arrangement_labels_polygon_perimeter() {
    let fp = part(
        label(layer(Arrangement::Line), 20.0, 5.0),
        GeometryType::Polygon,
        square(0.0, 0.0, 100.0),
    );
    let c = fp.create_candidates(&pal());
    assert!(!c.is_empty());
    assert!(c.iter().all(|p| p.quadrant() == Quadrant::Over));
}

// ---------- part operations ----------

#[test]
fn merge_joins_lines_sharing_an_endpoint() {
    let lf = Arc::new(label(layer(Arrangement::Line), 10.0, 2.0));
    let mut a = FeaturePart::new(lf.clone(), GeometryType::Line, pts(&[(0.0, 0.0), (10.0, 0.0)])).unwrap();
    let b = FeaturePart::new(lf, GeometryType::Line, pts(&[(10.0, 0.0), (10.0, 20.0)])).unwrap();
    let p = pal();
    assert_eq!(a.max_line_candidates(&p), 1);
    a.merge_with(&b).unwrap();
    assert!((a.length() - 30.0).abs() < 1e-12);
    assert_eq!(a.max_line_candidates(&p), 3);
}

#[test]
fn merge_of_disjoint_lines_fails_without_mutation() {
    let lf = Arc::new(label(layer(Arrangement::Line), 10.0, 2.0));
    let mut a = FeaturePart::new(lf.clone(), GeometryType::Line, pts(&[(0.0, 0.0), (10.0, 0.0)])).unwrap();
    let b = FeaturePart::new(lf, GeometryType::Line, pts(&[(20.0, 0.0), (30.0, 0.0)])).unwrap();
    assert!(a.merge_with(&b).is_err());
    assert_eq!(a.shape().pts(), &pts(&[(0.0, 0.0), (10.0, 0.0)])[..]);
    assert!((b.length() - 10.0).abs() < 1e-12);
}

#[test]
fn adjacency_requires_shared_boundary_only() {
    let lf = Arc::new(free_square_label());
    let a = FeaturePart::new(lf.clone(), GeometryType::Polygon, square(0.0, 0.0, 10.0)).unwrap();
    let touching = FeaturePart::new(lf.clone(), GeometryType::Polygon, square(10.0, 0.0, 10.0)).unwrap();
    let overlapping = FeaturePart::new(lf.clone(), GeometryType::Polygon, square(5.0, 5.0, 10.0)).unwrap();
    let apart = FeaturePart::new(lf, GeometryType::Polygon, square(30.0, 0.0, 10.0)).unwrap();
    assert!(a.is_connected(&touching));
    assert!(!a.is_connected(&overlapping));
    assert!(!a.is_connected(&apart));
}

#[test]
fn priority_prefers_always_show_then_feature_then_layer() {
    let mut lf = label(layer(Arrangement::Line), 10.0, 2.0);
    let line = pts(&[(0.0, 0.0), (10.0, 0.0)]);
    assert_eq!(part(lf.clone(), GeometryType::Line, line.clone()).calculate_priority(), 0.5);
    lf.priority = 0.3;
    assert_eq!(part(lf.clone(), GeometryType::Line, line.clone()).calculate_priority(), 0.3);
    lf.always_show = true;
    assert_eq!(
        part(lf, GeometryType::Line, line).calculate_priority(),
        costs::penalty::ALWAYS_SHOW_PRIORITY
    );
}

#[test]
fn upright_policy_per_layer_setting() {
    let point = pts(&[(0.0, 0.0)]);
    let with = |policy: UpsideDownLabels, angle: Option<f64>, fixed: bool| {
        let mut l = layer(Arrangement::AroundPoint);
        l.upside_down_labels = policy;
        let mut lf = label(l, 10.0, 2.0);
        lf.fixed_angle = angle;
        lf.fixed_position = fixed.then(|| v(0.0, 0.0));
        part(lf, GeometryType::Point, point.clone()).show_upright_labels()
    };
    assert!(with(UpsideDownLabels::Upright, Some(1.0), true));
    assert!(!with(UpsideDownLabels::ShowAll, None, false));
    assert!(with(UpsideDownLabels::ShowDefined, None, false));
    assert!(with(UpsideDownLabels::ShowDefined, Some(0.0), false));
    assert!(!with(UpsideDownLabels::ShowDefined, Some(1.0), false));
    assert!(!with(UpsideDownLabels::ShowDefined, Some(0.0), true));
}

#[test]
fn same_label_feature_through_connected_ids() {
    let mut l = layer(Arrangement::Line);
    l.connected_features.insert(1, 100);
    l.connected_features.insert(2, 100);
    let l = Arc::new(l);
    let make = |id: i64| {
        let lf = LabelFeature::new(id, l.clone(), Size::new(10.0, 2.0));
        part(lf, GeometryType::Line, pts(&[(0.0, 0.0), (10.0, 0.0)]))
    };
    assert!(make(1).has_same_label_feature_as(&make(2)));
    assert!(make(3).has_same_label_feature_as(&make(3)));
    assert!(!make(1).has_same_label_feature_as(&make(3)));

    let other_layer = part(
        label(LayerSettings::new("rivers", Arrangement::Line), 10.0, 2.0),
        GeometryType::Line,
        pts(&[(0.0, 0.0), (10.0, 0.0)]),
    );
    assert!(!make(1).has_same_label_feature_as(&other_layer));
}

#[test]
fn size_penalty_targets_small_lines_and_polygons() {
    let extent = BBox::new(0.0, 0.0, 100.0, 100.0);
    let short = part(
        label(layer(Arrangement::Horizontal), 4.0, 2.0),
        GeometryType::Line,
        pts(&[(0.0, 0.0), (10.0, 0.0)]),
    );
    let mut c = short.create_candidates(&pal());
    let before = costs_of(&c);
    short.add_size_penalty(&mut c, extent);
    for (p, b) in c.iter().zip(&before) {
        assert!((p.cost() - b - 0.6 / costs::penalty::SIZE_DIVISOR).abs() < 1e-12);
    }

    let big = part(free_square_label(), GeometryType::Polygon, square(0.0, 0.0, 100.0));
    let mut c = big.create_candidates(&polygon_pal());
    let before = costs_of(&c);
    big.add_size_penalty(&mut c, extent);
    assert_eq!(costs_of(&c), before);

    let point = part(label(layer(Arrangement::AroundPoint), 4.0, 2.0), GeometryType::Point, pts(&[(1.0, 1.0)]));
    let mut c = point.create_candidates(&pal());
    let before = costs_of(&c);
    point.add_size_penalty(&mut c, extent);
    assert_eq!(costs_of(&c), before);
}

#[test]
fn point_on_surface_candidate_lies_inside_concave_polygon() {
    let u = pts(&[
        (0.0, 0.0),
        (30.0, 0.0),
        (30.0, 30.0),
        (20.0, 30.0),
        (20.0, 10.0),
        (10.0, 10.0),
        (10.0, 30.0),
        (0.0, 30.0),
    ]);
    let fp = part(free_square_label(), GeometryType::Polygon, u);
    let c = fp.candidate_point_on_surface().unwrap();
    assert_eq!(c.cost(), 0.0);
    let g = fp.prepared().unwrap();
    assert!(g.contains_point(v(c.x(), c.y())));
    assert!(!g.contains_point(fp.centroid(false)));
    assert!(g.contains_point(fp.centroid(true)));
}

#[test]
fn clone_keeps_geometry_and_holes() {
    let lf = Arc::new(free_square_label());
    let fp = FeaturePart::with_holes(lf, square(0.0, 0.0, 100.0), vec![square(40.0, 40.0, 20.0)]).unwrap();
    fp.prepared().unwrap();
    let copy = fp.clone();
    assert_eq!(copy.holes().len(), 1);
    assert_eq!(copy.area(), fp.area());
    assert_eq!(copy.feature_id(), fp.feature_id());
    assert!(copy.prepared().unwrap().contains_point(v(10.0, 10.0)));
    assert!(!copy.prepared().unwrap().contains_point(v(50.0, 50.0)));
}

#[test]
fn invalid_coordinates_are_rejected() {
    let lf = Arc::new(free_square_label());
    assert!(FeaturePart::new(lf.clone(), GeometryType::Line, pts(&[(0.0, 0.0)])).is_err());
    assert!(FeaturePart::new(lf, GeometryType::Line, pts(&[(0.0, 0.0), (f64::NAN, 1.0)])).is_err());
}

proptest! {
    #[test]
    fn around_point_waveform_for_any_count(n in 2usize..40, d in 0.0f64..20.0) {
        let mut l = layer(Arrangement::AroundPoint);
        l.max_point_candidates = n;
        let mut lf = label(l, 10.0, 5.0);
        lf.dist_label = d;
        let fp = part(lf, GeometryType::Point, pts(&[(0.0, 0.0)]));
        let c = fp.create_candidates(&pal());
        prop_assert_eq!(c.len(), n);
        let costs = costs_of(&c);
        let peak = n / 2;
        for i in 0..peak {
            prop_assert!(costs[i] < costs[i + 1]);
        }
        for i in peak..n - 1 {
            prop_assert!(costs[i] > costs[i + 1]);
        }
    }

    #[test]
    fn merged_length_is_the_sum(
        a in prop::collection::vec((1.0f64..20.0, -5.0f64..5.0), 1..6),
        b in prop::collection::vec((1.0f64..20.0, -5.0f64..5.0), 1..6),
    ) {
        // two monotone polylines meeting at the origin
        let mut left = vec![v(0.0, 0.0)];
        for (dx, dy) in &a {
            let last = left[left.len() - 1];
            left.push(last + v(-dx, *dy));
        }
        left.reverse();
        let mut right = vec![v(0.0, 0.0)];
        for (dx, dy) in &b {
            let last = right[right.len() - 1];
            right.push(last + v(*dx, *dy));
        }
        let lf = Arc::new(label(layer(Arrangement::Line), 10.0, 2.0));
        let mut first = FeaturePart::new(lf.clone(), GeometryType::Line, left).unwrap();
        let second = FeaturePart::new(lf, GeometryType::Line, right).unwrap();
        let expected = first.length() + second.length();
        prop_assert!(first.merge_with(&second).is_ok());
        prop_assert!((first.length() - expected).abs() < 1e-9);
    }

    #[test]
    fn curved_chains_respect_bend_limits(
        ys in prop::collection::vec(-8.0f64..8.0, 3..10),
        widths in prop::collection::vec(1.0f64..5.0, 2..8),
        inside in 5.0f64..45.0,
        outside in 5.0f64..45.0,
    ) {
        let line: Vec<Vec2> = ys.iter().enumerate().map(|(i, y)| v(i as f64 * 12.0, *y)).collect();
        let mut lf = label(layer(Arrangement::Curved), widths.iter().sum(), 4.0);
        lf.label_info = Some(LabelInfo::new(&widths, 4.0, inside, outside));
        let fp = part(lf, GeometryType::Line, line);
        let max_in = inside.to_radians() + 1e-9;
        let max_out = -outside.to_radians() - 1e-9;
        for p in fp.create_candidates(&pal()) {
            let alphas: Vec<f64> = p.parts().map(|g| g.alpha()).collect();
            for w in alphas.windows(2) {
                let bend = wrap_angle(w[1] - w[0]);
                prop_assert!(bend <= max_in && bend >= max_out, "bend {} outside [{}, {}]", bend, max_out, max_in);
            }
        }
    }
}

#[test]
fn quadrant_signs_match_offsets() {
    use super::point::quadrant_from_offset;
    assert_eq!(quadrant_from_offset(v(-1.0, -1.0)), Quadrant::AboveLeft);
    assert_eq!(quadrant_from_offset(v(0.0, 1.0)), Quadrant::Below);
    assert_eq!(quadrant_from_offset(v(1.0, 0.0)), Quadrant::Right);
    assert_eq!(quadrant_from_offset(v(0.0, 0.0)), Quadrant::Over);
}
