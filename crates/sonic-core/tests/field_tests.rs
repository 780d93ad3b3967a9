mod common;

use common::species;
use glam::Vec2;
use proptest::prelude::*;
use sonic_core::field::smooth_falloff;
use sonic_core::{Catalog, Category, Field, FieldGenerator, FieldInput, FieldParams};

fn small_params() -> FieldParams {
    FieldParams {
        cols: 12,
        rows: 8,
        ..FieldParams::default()
    }
}

#[test]
fn smooth_falloff_is_one_at_center_and_zero_at_radius() {
    assert_eq!(smooth_falloff(0.0, 0.2), 1.0);
    assert_eq!(smooth_falloff(0.2, 0.2), 0.0);
    assert_eq!(smooth_falloff(0.5, 0.2), 0.0);
    assert_eq!(smooth_falloff(0.1, 0.0), 0.0);
    let mid = smooth_falloff(0.1, 0.2);
    assert!((mid - 0.5).abs() < 1e-6);
}

#[test]
fn generated_grid_has_vertex_dimensions() {
    let generator = FieldGenerator::new(small_params());
    let field = generator.generate(&FieldInput::default(), &[]);
    assert_eq!(field.cols(), 12);
    assert_eq!(field.rows(), 8);
    assert_eq!(field.values().len(), 13 * 9);
}

#[test]
fn generation_is_deterministic_for_equal_inputs() {
    let generator = FieldGenerator::new(small_params());
    let catalog = Catalog::builtin();
    let input = FieldInput {
        time: 3.2,
        pointer: Vec2::new(0.4, 0.6),
        pointer_speed: 5.0,
        dragging: false,
    };
    let a = generator.generate(&input, catalog.species());
    let b = generator.generate(&input, catalog.species());
    assert_eq!(a, b);
}

#[test]
fn species_raise_the_field_and_the_pointer_lowers_it() {
    let params = FieldParams {
        cols: 20,
        rows: 20,
        ..FieldParams::default()
    };
    let generator = FieldGenerator::new(params);
    let sp = [species("bump", Category::Plant, 0.5, 0.5, 0.3, 1.0)];
    let far = FieldInput {
        pointer: Vec2::new(-5.0, -5.0),
        ..FieldInput::default()
    };
    let plain = generator.generate(&far, &[]);
    let raised = generator.generate(&far, &sp);
    assert!(raised.at(10, 10) >= plain.at(10, 10));

    let pressed = generator.generate(
        &FieldInput {
            pointer: Vec2::new(0.5, 0.5),
            ..FieldInput::default()
        },
        &[],
    );
    assert!(pressed.at(10, 10) <= plain.at(10, 10));
}

#[test]
fn dragging_suppresses_the_pointer_depression() {
    let generator = FieldGenerator::new(small_params());
    let away = FieldInput {
        pointer: Vec2::new(-5.0, -5.0),
        ..FieldInput::default()
    };
    let dragging = FieldInput {
        pointer: Vec2::new(0.5, 0.5),
        dragging: true,
        ..FieldInput::default()
    };
    assert_eq!(generator.generate(&away, &[]), generator.generate(&dragging, &[]));
}

#[test]
fn depression_grows_with_speed_up_to_a_cap() {
    let generator = FieldGenerator::new(FieldParams::default());
    assert!((generator.depression_strength(0.0) - 0.65).abs() < 1e-6);
    assert!((generator.depression_strength(10.0) - 0.71).abs() < 1e-6);
    assert!((generator.depression_strength(1000.0) - 1.0).abs() < 1e-6);
}

#[test]
fn pointer_sample_clamps_and_guards() {
    let rows: Vec<Vec<f32>> = (0..3)
        .map(|r| (0..3).map(|c| (r * 3 + c) as f32 / 10.0).collect())
        .collect();
    let field = Field::from_rows(&rows).unwrap();
    assert_eq!(field.sample_at_pointer(Vec2::new(0.0, 0.0), 100.0, 100.0), 0.0);
    assert_eq!(field.sample_at_pointer(Vec2::new(60.0, 10.0), 100.0, 100.0), 0.1);
    // off-grid pointers clamp to the last cell, never the extra vertex
    assert_eq!(field.sample_at_pointer(Vec2::new(500.0, 500.0), 100.0, 100.0), 0.4);
    assert_eq!(field.sample_at_pointer(Vec2::new(-20.0, -1.0), 100.0, 100.0), 0.0);
    assert_eq!(field.sample_at_pointer(Vec2::new(f32::NAN, 1.0), 100.0, 100.0), 0.5);
}

#[test]
fn empty_grids_sample_without_underflow() {
    let field = Field::filled(0, 0, 0.3);
    assert_eq!(field.sample_at_pointer(Vec2::new(40.0, 40.0), 100.0, 100.0), 0.3);

    let generator = FieldGenerator::new(FieldParams {
        cols: 0,
        rows: 0,
        ..FieldParams::default()
    });
    let field = generator.generate(&FieldInput::default(), &[]);
    assert_eq!((field.cols(), field.rows()), (1, 1));
    assert!(field.values().iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn from_rows_rejects_ragged_input() {
    assert!(Field::from_rows(&[vec![0.0, 1.0], vec![0.0]]).is_none());
    assert!(Field::from_rows(&[vec![0.0, 1.0]]).is_none());
    assert!(Field::from_rows(&[]).is_none());
}

prop_compose! {
    fn arb_input()(
        time in 0.0f64..10_000.0,
        x in -0.5f32..1.5,
        y in -0.5f32..1.5,
        speed in 0.0f32..500.0,
        dragging in any::<bool>()
    ) -> FieldInput {
        FieldInput { time, pointer: Vec2::new(x, y), pointer_speed: speed, dragging }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn field_values_stay_in_unit_range(input in arb_input()) {
        let generator = FieldGenerator::new(small_params());
        let catalog = Catalog::builtin();
        let field = generator.generate(&input, catalog.species());
        for &v in field.values() {
            prop_assert!(v.is_finite());
            prop_assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
    }
}
