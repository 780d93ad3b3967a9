//! Runtime parameters for every stage of the pipeline.
//!
//! Defaults mirror the values in [`crate::constants`]. Each struct is
//! deserializable with `#[serde(default)]`, so a host can overlay a partial
//! JSON document (for example `{"contour": {"levels": 10}}`) onto the
//! defaults with [`SonicConfig::from_json`].

use crate::constants::*;
use anyhow::Context;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub cols: usize,
    pub rows: usize,
    pub noise_seed: u32,
    pub noise_octaves: usize,
    pub noise_scale: [f64; 2],
    pub noise_rates: [f64; 3],
    pub noise_step_per_frame: f64,
    pub species_weight: f32,
    pub pointer_radius: f32,
    pub depression_base: f32,
    pub speed_scale: f32,
    pub speed_boost_max: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            noise_seed: NOISE_SEED,
            noise_octaves: NOISE_OCTAVES,
            noise_scale: [NOISE_SCALE_X, NOISE_SCALE_Y],
            noise_rates: [NOISE_RATE_X, NOISE_RATE_Y, NOISE_RATE_Z],
            noise_step_per_frame: NOISE_STEP_PER_FRAME,
            species_weight: SPECIES_INFLUENCE_WEIGHT,
            pointer_radius: POINTER_RADIUS,
            depression_base: POINTER_DEPRESSION_BASE,
            speed_scale: POINTER_SPEED_SCALE,
            speed_boost_max: POINTER_SPEED_BOOST_MAX,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    pub levels: usize,
    pub iso_base: f32,
    pub iso_span: f32,
    pub glow_min_proximity: f32,
    pub glow_radius_factor: f32,
    pub glow_alpha_scale: f32,
    pub glow_stroke_width: f32,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            levels: CONTOUR_LEVELS,
            iso_base: ISO_BASE,
            iso_span: ISO_SPAN,
            glow_min_proximity: GLOW_MIN_PROXIMITY,
            glow_radius_factor: GLOW_RADIUS_FACTOR,
            glow_alpha_scale: GLOW_ALPHA_SCALE,
            glow_stroke_width: GLOW_STROKE_WIDTH,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProximityParams {
    pub center_radius_px: f32,
    pub threshold_factor: f32,
}

impl Default for ProximityParams {
    fn default() -> Self {
        Self {
            center_radius_px: CENTER_RADIUS_PX,
            threshold_factor: PROXIMITY_THRESHOLD_FACTOR,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MixerParams {
    pub attack_ramp_sec: f32,
    pub release_ramp_sec: f32,
    pub release_delay_ms: f64,
    pub dispose_delay_ms: f64,
    pub stacking_numerator: f32,
    pub gain_exponent: f32,
    pub depth_boost_db: f32,
}

impl Default for MixerParams {
    fn default() -> Self {
        Self {
            attack_ramp_sec: ZONE_ATTACK_RAMP_SEC,
            release_ramp_sec: ZONE_RELEASE_RAMP_SEC,
            release_delay_ms: ZONE_RELEASE_DELAY_MS,
            dispose_delay_ms: ZONE_DISPOSE_DELAY_MS,
            stacking_numerator: ZONE_STACKING_NUMERATOR,
            gain_exponent: ZONE_GAIN_EXPONENT,
            depth_boost_db: ZONE_DEPTH_BOOST_DB,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PingParams {
    pub cooldown_ms: f64,
    pub cue_sec: f32,
    pub seed: u64,
}

impl Default for PingParams {
    fn default() -> Self {
        Self {
            cooldown_ms: PING_COOLDOWN_MS,
            cue_sec: PING_CUE_SEC,
            seed: PING_SEED,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CompositorParams {
    pub background: [u8; 3],
    pub ghost_decay_alpha: f32,
    pub ghost_feed_alpha: f32,
    /// (alpha, blur radius in px) for each bloom copy, drawn in order.
    pub bloom: Vec<(f32, f32)>,
}

impl Default for CompositorParams {
    fn default() -> Self {
        Self {
            background: BACKGROUND_RGB,
            ghost_decay_alpha: GHOST_DECAY_ALPHA,
            ghost_feed_alpha: GHOST_FEED_ALPHA,
            bloom: vec![
                (BLOOM_NEAR_ALPHA, BLOOM_NEAR_BLUR_PX),
                (BLOOM_FAR_ALPHA, BLOOM_FAR_BLUR_PX),
            ],
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SonicConfig {
    pub field: FieldParams,
    pub contour: ContourParams,
    pub proximity: ProximityParams,
    pub mixer: MixerParams,
    pub ping: PingParams,
    pub compositor: CompositorParams,
}

impl SonicConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let cfg: SonicConfig = serde_json::from_str(text).context("parsing sonic-field config")?;
        if cfg.field.cols == 0 || cfg.field.rows == 0 {
            anyhow::bail!("field grid must have at least one cell per axis");
        }
        if cfg.contour.levels == 0 {
            anyhow::bail!("contour.levels must be positive");
        }
        Ok(cfg)
    }
}
