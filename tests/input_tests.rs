// Host-side tests for pointer state.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use input::PointerState;

#[test]
fn unseen_pointer_is_far_off_canvas() {
    let p = PointerState::default();
    let pos = p.frame_position();
    assert!(pos.x < -1000.0 && pos.y < -1000.0);
    assert!(!p.dragging);
}

#[test]
fn move_records_position() {
    let mut p = PointerState::default();
    p.moved(Vec2::new(12.0, 34.0));
    assert_eq!(p.frame_position(), Vec2::new(12.0, 34.0));
    assert!(!p.dragging);
}

#[test]
fn press_starts_drag_and_release_ends_it() {
    let mut p = PointerState::default();
    p.pressed(Vec2::new(5.0, 6.0));
    assert!(p.dragging);
    assert_eq!(p.pos, Vec2::new(5.0, 6.0));
    p.moved(Vec2::new(7.0, 8.0));
    assert!(p.dragging);
    p.released();
    assert!(!p.dragging);
    assert_eq!(p.frame_position(), Vec2::new(7.0, 8.0));
}
