mod common;

use common::species;
use glam::Vec2;
use proptest::prelude::*;
use sonic_core::proximity::proximity_threshold;
use sonic_core::{detect, Category, ProximityParams, Viewport};

fn viewport() -> Viewport {
    Viewport::new(1000.0, 800.0)
}

#[test]
fn pointer_on_center_gives_full_proximity_and_a_center_event() {
    let sp = [species("a", Category::Fish, 0.5, 0.5, 0.1, 0.5)];
    let scan = detect(Vec2::new(500.0, 400.0), viewport(), &sp, &ProximityParams::default());
    assert_eq!(scan.map.proximity("a"), 1.0);
    assert_eq!(scan.centers.len(), 1);
    assert_eq!(scan.centers[0].id, "a");
}

#[test]
fn threshold_uses_viewport_width() {
    let sp = species("a", Category::Fish, 0.5, 0.5, 0.1, 0.5);
    let t = proximity_threshold(&sp, viewport(), &ProximityParams::default());
    assert!((t - 120.0).abs() < 1e-4);
}

#[test]
fn entries_beyond_threshold_are_absent() {
    let sp = [species("a", Category::Fish, 0.5, 0.5, 0.1, 0.5)];
    let params = ProximityParams::default();
    let at = detect(Vec2::new(625.0, 400.0), viewport(), &sp, &params);
    assert!(!at.map.contains("a"));
    assert_eq!(at.map.proximity("a"), 0.0);

    let inside = detect(Vec2::new(560.0, 400.0), viewport(), &sp, &params);
    assert!((inside.map.proximity("a") - 0.5).abs() < 1e-5);
    assert!(inside.centers.is_empty());
}

#[test]
fn center_radius_is_exclusive() {
    let sp = [species("a", Category::Fish, 0.5, 0.5, 0.1, 0.5)];
    let params = ProximityParams::default();
    let edge = detect(Vec2::new(518.0, 400.0), viewport(), &sp, &params);
    assert!(edge.centers.is_empty());
    let inside = detect(Vec2::new(517.0, 400.0), viewport(), &sp, &params);
    assert_eq!(inside.centers.len(), 1);
}

#[test]
fn overlapping_species_are_all_reported() {
    let sp = [
        species("a", Category::Fish, 0.5, 0.5, 0.2, 0.5),
        species("b", Category::Plant, 0.55, 0.5, 0.2, 0.5),
        species("c", Category::Mammal, 0.95, 0.1, 0.05, 0.5),
    ];
    let scan = detect(Vec2::new(540.0, 400.0), viewport(), &sp, &ProximityParams::default());
    assert_eq!(scan.map.len(), 2);
    assert!(scan.map.contains("a") && scan.map.contains("b"));
    assert!(scan.map.proximity("b") > scan.map.proximity("a"));
}

#[test]
fn degenerate_viewport_normalizes_to_center() {
    let vp = Viewport::new(0.0, 0.0);
    assert_eq!(vp.normalize(Vec2::new(30.0, 40.0)), Vec2::splat(0.5));
    assert_eq!(viewport().normalize(Vec2::new(500.0, 200.0)), Vec2::new(0.5, 0.25));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proximity_is_bounded_and_monotone_in_distance(
        d1 in 0.0f32..200.0,
        d2 in 0.0f32..200.0
    ) {
        let sp = [species("a", Category::Fish, 0.5, 0.5, 0.1, 0.5)];
        let params = ProximityParams::default();
        let at = |d: f32| detect(Vec2::new(500.0 + d, 400.0), viewport(), &sp, &params)
            .map
            .proximity("a");
        let (p1, p2) = (at(d1), at(d2));
        prop_assert!((0.0..=1.0).contains(&p1));
        if d1 <= d2 {
            prop_assert!(p1 >= p2);
        }
    }
}
