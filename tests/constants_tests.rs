// Host-side tests for the web front-end constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn limiter_settings_are_a_brickwall() {
    assert!(LIMITER_THRESHOLD_DB < 0.0);
    assert!(LIMITER_RATIO >= 20.0);
    assert!(LIMITER_ATTACK_SEC < LIMITER_RELEASE_SEC);
    assert!(LIMITER_KNEE_DB >= 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn reverb_mix_is_a_fraction() {
    assert!(REVERB_WET > 0.0 && REVERB_WET <= 1.0);
    assert!(REVERB_DECAY_SEC > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn master_filter_starts_in_audible_range() {
    assert!(MASTER_FILTER_START_HZ > 20.0 && MASTER_FILTER_START_HZ < 20_000.0);
    assert!(MASTER_FILTER_Q > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn scheduling_leads_are_small_and_positive() {
    assert!(AUDIO_LOOKAHEAD_SEC > 0.0 && AUDIO_LOOKAHEAD_SEC < 0.05);
    assert!(CUE_TAIL_MAX_SEC > 0.0);
}

#[test]
fn dom_ids_are_distinct() {
    let ids = [
        CANVAS_ID,
        START_OVERLAY_ID,
        HUD_ID,
        CONFIG_SCRIPT_ID,
        CATALOG_SCRIPT_ID,
    ];
    for (i, a) in ids.iter().enumerate() {
        assert!(!a.is_empty());
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn device_pixel_ratio_cap_allows_retina() {
    assert!(MAX_DEVICE_PIXEL_RATIO >= 2.0);
}
