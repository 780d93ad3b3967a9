use glam::Vec2;
use sonic_core::contour::{
    case_index, cell_segments, edge_fraction, iso_for_level, level_segments, level_style,
    GlowRegion,
};
use sonic_core::{Category, ContourParams, Field, Species};

const CELL: Vec2 = Vec2::new(10.0, 10.0);

fn corners_for_case(case: u8) -> [f32; 4] {
    let bit = |b: u8| if case & b != 0 { 1.0 } else { 0.0 };
    [bit(8), bit(4), bit(2), bit(1)]
}

const TOP: Vec2 = Vec2::new(5.0, 0.0);
const RIGHT: Vec2 = Vec2::new(10.0, 5.0);
const BOTTOM: Vec2 = Vec2::new(5.0, 10.0);
const LEFT: Vec2 = Vec2::new(0.0, 5.0);

/// Edge midpoints each case must join, with binary corners at iso 0.5.
fn expected_segments(case: u8) -> Vec<(Vec2, Vec2)> {
    match case {
        0 | 15 => vec![],
        1 | 14 => vec![(LEFT, BOTTOM)],
        2 | 13 => vec![(RIGHT, BOTTOM)],
        3 | 12 => vec![(LEFT, RIGHT)],
        4 | 11 => vec![(TOP, RIGHT)],
        5 => vec![(TOP, LEFT), (RIGHT, BOTTOM)],
        6 | 9 => vec![(TOP, BOTTOM)],
        7 | 8 => vec![(TOP, LEFT)],
        10 => vec![(TOP, RIGHT), (LEFT, BOTTOM)],
        _ => unreachable!(),
    }
}

#[test]
fn every_case_joins_its_fixed_edges() {
    for case in 0u8..16 {
        let corners = corners_for_case(case);
        assert_eq!(case_index(corners, 0.5), case);
        let segs: Vec<(Vec2, Vec2)> = cell_segments(corners, 0.5, Vec2::ZERO, CELL)
            .iter()
            .map(|s| (s.a, s.b))
            .collect();
        assert_eq!(segs, expected_segments(case), "case {case}");
    }
}

#[test]
fn strict_threshold_excludes_values_equal_to_iso() {
    assert_eq!(case_index([0.5, 0.5, 0.5, 0.5], 0.5), 0);
    assert_eq!(case_index([0.51, 0.5, 0.5, 0.5], 0.5), 8);
}

#[test]
fn saddles_use_the_fixed_pairing() {
    // case 5: top-right and bottom-left above
    let segs = cell_segments([0.0, 1.0, 0.0, 1.0], 0.5, Vec2::ZERO, CELL);
    assert_eq!(segs[0].a, Vec2::new(5.0, 0.0)); // top
    assert_eq!(segs[0].b, Vec2::new(0.0, 5.0)); // left
    assert_eq!(segs[1].a, Vec2::new(10.0, 5.0)); // right
    assert_eq!(segs[1].b, Vec2::new(5.0, 10.0)); // bottom

    // case 10: top-left and bottom-right above
    let segs = cell_segments([1.0, 0.0, 1.0, 0.0], 0.5, Vec2::ZERO, CELL);
    assert_eq!(segs[0].a, Vec2::new(5.0, 0.0));
    assert_eq!(segs[0].b, Vec2::new(10.0, 5.0));
    assert_eq!(segs[1].a, Vec2::new(0.0, 5.0));
    assert_eq!(segs[1].b, Vec2::new(5.0, 10.0));
}

#[test]
fn crossing_is_linearly_interpolated() {
    // only top-left above: crossing at 0.25 along top and left edges
    let segs = cell_segments([1.0, 0.2, 0.2, 0.2], 0.8, Vec2::new(100.0, 50.0), CELL);
    assert_eq!(segs.len(), 1);
    let s = segs[0];
    assert!((s.a - Vec2::new(102.5, 50.0)).length() < 1e-4);
    assert!((s.b - Vec2::new(100.0, 52.5)).length() < 1e-4);
}

#[test]
fn degenerate_edges_fall_back_to_the_midpoint() {
    assert_eq!(edge_fraction(0.3, 0.3, 0.3), 0.5);
    assert_eq!(edge_fraction(0.0, 1.0, 0.25), 0.25);
    let segs = cell_segments([0.6, 0.6, 0.6, 0.4], 0.6, Vec2::ZERO, CELL);
    for s in &segs {
        assert!(s.a.is_finite() && s.b.is_finite());
    }
}

#[test]
fn iso_levels_span_the_configured_band() {
    let params = ContourParams::default();
    assert!((iso_for_level(0, 14, &params) - 0.12).abs() < 1e-6);
    let top = iso_for_level(13, 14, &params);
    assert!(top < 0.84 && top > 0.12);
    assert!(iso_for_level(7, 14, &params) > iso_for_level(6, 14, &params));
}

#[test]
fn level_style_brightens_towards_upper_levels() {
    let low = level_style(0, 14);
    let high = level_style(13, 14);
    assert!((low.width - 0.3).abs() < 1e-6);
    assert!((low.color.a - 40.0 / 255.0).abs() < 1e-6);
    assert!(high.width > low.width);
    assert!(high.color.a > low.color.a);
    assert!(high.color.g > low.color.g);
}

#[test]
fn flat_field_has_no_contours() {
    let field = Field::filled(6, 4, 0.5);
    assert!(level_segments(&field, 0.3, CELL).is_empty());
    assert!(level_segments(&field, 0.7, CELL).is_empty());
}

#[test]
fn ramp_field_yields_one_segment_per_row() {
    let rows: Vec<Vec<f32>> = (0..5)
        .map(|_| (0..7).map(|c| c as f32 / 6.0).collect())
        .collect();
    let field = Field::from_rows(&rows).unwrap();
    let segs = level_segments(&field, 0.45, CELL);
    assert_eq!(segs.len(), 4);
    for s in segs {
        assert!((s.a.x - s.b.x).abs() < 1e-4, "contour of an x ramp is vertical");
    }
}

fn glow_species(proximity_radius: f32) -> Species {
    Species {
        id: "g".into(),
        name: "G".into(),
        latin_name: "G g".into(),
        category: Category::Fish,
        x: 0.5,
        y: 0.5,
        radius: proximity_radius,
        depth: 0.5,
        color: [255, 0, 0],
        depth_range: String::new(),
    }
}

#[test]
fn glow_needs_more_than_minimum_proximity() {
    let params = ContourParams::default();
    let sp = glow_species(0.2);
    assert!(GlowRegion::for_species(&sp, 0.1, &params).is_none());
    let region = GlowRegion::for_species(&sp, 0.5, &params).unwrap();
    assert!((region.radius - 0.3).abs() < 1e-6);
}

#[test]
fn glow_restricted_to_cells_near_the_species() {
    let params = ContourParams::default();
    let sp = glow_species(0.1);
    let region = GlowRegion::for_species(&sp, 1.0, &params).unwrap();
    let field = Field::filled(10, 10, 0.0);
    // cell (4,4) has its center at (0.45, 0.45)
    let near = region.cell_falloff(&field, 4, 4).unwrap();
    assert!(near > 0.0 && near < 1.0);
    assert!(region.cell_falloff(&field, 0, 0).is_none());
}

#[test]
fn glow_alpha_scales_with_squares() {
    let params = ContourParams::default();
    let sp = glow_species(0.2);
    let region = GlowRegion::for_species(&sp, 0.5, &params).unwrap();
    let top = region.alpha(1.0, 1.0, 180.0);
    assert!((top - 45.0).abs() < 1e-4);
    let half = region.alpha(0.5, 1.0, 180.0);
    assert!((half - top / 4.0).abs() < 1e-4);
    assert!(region.alpha(1.0, 0.0, 180.0) < top);
}
