// Tuning constants shared by the web and native front-ends.

// Sampling grid (cells; the field holds one more vertex per axis)
pub const GRID_COLS: usize = 60;
pub const GRID_ROWS: usize = 40;

// Coherent noise sampling
pub const NOISE_SCALE_X: f64 = 2.8;
pub const NOISE_SCALE_Y: f64 = 2.2;
pub const NOISE_RATE_X: f64 = 0.04;
pub const NOISE_RATE_Y: f64 = 0.025;
pub const NOISE_RATE_Z: f64 = 0.008;
pub const NOISE_STEP_PER_FRAME: f64 = 0.04;
pub const NOISE_OCTAVES: usize = 4;
pub const NOISE_SEED: u32 = 0x50_75_67;

// Field shaping
pub const SPECIES_INFLUENCE_WEIGHT: f32 = 0.35;
pub const POINTER_RADIUS: f32 = 0.22;
pub const POINTER_DEPRESSION_BASE: f32 = 0.65;
pub const POINTER_SPEED_SCALE: f32 = 0.006; // per pixel of frame-to-frame motion
pub const POINTER_SPEED_BOOST_MAX: f32 = 0.35;

// Contours
pub const CONTOUR_LEVELS: usize = 14;
pub const ISO_BASE: f32 = 0.12;
pub const ISO_SPAN: f32 = 0.72;
pub const GLOW_MIN_PROXIMITY: f32 = 0.1;
pub const GLOW_RADIUS_FACTOR: f32 = 1.5;
pub const GLOW_ALPHA_SCALE: f32 = 180.0;
pub const GLOW_STROKE_WIDTH: f32 = 2.0;

// Proximity
pub const CENTER_RADIUS_PX: f32 = 18.0;
pub const PROXIMITY_THRESHOLD_FACTOR: f32 = 1.2;

// Zone mixer timings
pub const ZONE_ATTACK_RAMP_SEC: f32 = 0.2;
pub const ZONE_RELEASE_RAMP_SEC: f32 = 0.5;
pub const ZONE_RELEASE_DELAY_MS: f64 = 1000.0;
pub const ZONE_DISPOSE_DELAY_MS: f64 = 4000.0;
pub const ZONE_STACKING_NUMERATOR: f32 = 1.5;
pub const ZONE_GAIN_EXPONENT: f32 = 1.5;
pub const ZONE_DEPTH_BOOST_DB: f32 = 4.0;
pub const SHALLOW_DEPTH: f32 = 0.3;
pub const DEEP_DEPTH: f32 = 0.7;

// Pings
pub const PING_COOLDOWN_MS: f64 = 3000.0;
pub const PING_CUE_SEC: f32 = 0.25; // eighth note at 120 BPM
pub const PING_SEED: u64 = 42;
pub const PING_JUMP_MS: f64 = 600.0;
pub const PING_JUMP_PX: f32 = 12.0;
pub const SONAR_BURST_MS: f64 = 2000.0;

// Master filter driven by the depth readout
pub const FILTER_BASE_HZ: f32 = 80.0;
pub const FILTER_SPAN_HZ: f32 = 2400.0;
pub const FILTER_RAMP_SEC: f32 = 0.3;
pub const HUD_DEPTH_METRES: f32 = 300.0;

// Compositing
pub const BACKGROUND_RGB: [u8; 3] = [0, 3, 13];
pub const GHOST_DECAY_ALPHA: f32 = 20.0 / 255.0;
pub const GHOST_FEED_ALPHA: f32 = 0.55;
pub const BLOOM_NEAR_ALPHA: f32 = 0.25;
pub const BLOOM_NEAR_BLUR_PX: f32 = 6.0;
pub const BLOOM_FAR_ALPHA: f32 = 0.12;
pub const BLOOM_FAR_BLUR_PX: f32 = 16.0;

// Markers
pub const HOVER_RADIUS_PX: f32 = 50.0;
pub const RIPPLE_MIN_PROXIMITY: f32 = 0.3;
pub const TOOLTIP_TEXT_PX: f32 = 10.0;
pub const TOOLTIP_PADDING_PX: f32 = 8.0;
pub const TOOLTIP_HEIGHT_PX: f32 = 22.0;
pub const TOOLTIP_MARGIN_PX: f32 = 10.0;

// Frame clock
pub const TARGET_FPS: f32 = 60.0;
