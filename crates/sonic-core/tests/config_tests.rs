use sonic_core::hud::filter_cutoff_hz;
use sonic_core::{DepthReadout, OceanLayer, SonicConfig};

#[test]
fn defaults_match_the_tuned_constants() {
    let cfg = SonicConfig::default();
    assert_eq!(cfg.field.cols, 60);
    assert_eq!(cfg.field.rows, 40);
    assert_eq!(cfg.contour.levels, 14);
    assert_eq!(cfg.ping.cooldown_ms, 3000.0);
    assert_eq!(cfg.mixer.release_delay_ms, 1000.0);
    assert_eq!(cfg.mixer.dispose_delay_ms, 4000.0);
    assert_eq!(cfg.compositor.bloom, vec![(0.25, 6.0), (0.12, 16.0)]);
}

#[test]
fn partial_json_overlays_defaults() {
    let cfg = SonicConfig::from_json(r#"{"contour":{"levels":10},"ping":{"seed":7}}"#).unwrap();
    assert_eq!(cfg.contour.levels, 10);
    assert_eq!(cfg.contour.iso_base, 0.12);
    assert_eq!(cfg.ping.seed, 7);
    assert_eq!(cfg.ping.cooldown_ms, 3000.0);
    assert_eq!(cfg.field.cols, 60);
}

#[test]
fn invalid_config_is_an_error() {
    assert!(SonicConfig::from_json("{").is_err());
    assert!(SonicConfig::from_json(r#"{"field":{"cols":0}}"#).is_err());
    assert!(SonicConfig::from_json(r#"{"contour":{"levels":0}}"#).is_err());
}

#[test]
fn filter_cutoff_is_bright_when_shallow() {
    assert_eq!(filter_cutoff_hz(0.0), 2480.0);
    assert_eq!(filter_cutoff_hz(1.0), 80.0);
    assert_eq!(filter_cutoff_hz(3.0), 80.0);
}

#[test]
fn readout_labels_follow_depth_bands() {
    assert_eq!(OceanLayer::from_depth(0.1), OceanLayer::Photic);
    assert_eq!(OceanLayer::from_depth(0.3), OceanLayer::Mesopelagic);
    assert_eq!(OceanLayer::from_depth(0.7), OceanLayer::Bathypelagic);
    assert_eq!(OceanLayer::from_depth(0.9), OceanLayer::Abyssal);

    let r = DepthReadout::new(0.5);
    let [depth, freq, layer] = r.lines();
    assert_eq!(depth, "DEPTH 150m");
    assert_eq!(freq, "FREQ 1280Hz");
    assert_eq!(layer, "LAYER MESOPELAGIC");
}
