// Host-side tests for the key bindings.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use input::{key_action, KeyAction};

#[test]
fn enter_and_space_start_audio() {
    assert_eq!(key_action("Enter"), Some(KeyAction::StartAudio));
    assert_eq!(key_action(" "), Some(KeyAction::StartAudio));
    assert_eq!(key_action("Spacebar"), Some(KeyAction::StartAudio));
}

#[test]
fn escape_stops_audio() {
    assert_eq!(key_action("Escape"), Some(KeyAction::StopAudio));
    assert_eq!(key_action("Esc"), Some(KeyAction::StopAudio));
}

#[test]
fn other_keys_are_ignored() {
    for key in ["a", "h", "ArrowUp", "Shift", "enter", ""] {
        assert_eq!(key_action(key), None, "{key:?}");
    }
}
