// Web front-end tuning: DOM ids, canvas limits and the master audio chain.

// DOM
pub const CANVAS_ID: &str = "app-canvas";
pub const START_OVERLAY_ID: &str = "start-overlay";
pub const HUD_ID: &str = "depth-hud";
pub const CONFIG_SCRIPT_ID: &str = "sonic-config";
pub const CATALOG_SCRIPT_ID: &str = "species-catalog";
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Canvas text
pub const FONT_FAMILY: &str = "DM Mono, monospace";

// Master chain: voices -> lowpass -> reverb (wet/dry) -> limiter -> out
pub const MASTER_FILTER_START_HZ: f32 = 400.0;
pub const MASTER_FILTER_Q: f32 = 0.7;
pub const REVERB_DECAY_SEC: f32 = 12.0;
pub const REVERB_WET: f32 = 0.6;
pub const LIMITER_THRESHOLD_DB: f32 = -3.0;
pub const LIMITER_KNEE_DB: f32 = 0.0;
pub const LIMITER_RATIO: f32 = 20.0;
pub const LIMITER_ATTACK_SEC: f32 = 0.003;
pub const LIMITER_RELEASE_SEC: f32 = 0.25;

// Scheduling lead so ramps never start in the past
pub const AUDIO_LOOKAHEAD_SEC: f64 = 0.005;

// Ceiling for a one-shot cue's release tail before the source is stopped
pub const CUE_TAIL_MAX_SEC: f64 = 3.0;
