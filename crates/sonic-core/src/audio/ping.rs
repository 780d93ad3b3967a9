use super::backend::{tolerate, AudioBackend};
use super::voices::{midi_to_hz, ping_palette, ping_voice};
use crate::config::PingParams;
use crate::species::Species;
use fnv::FnvHashMap;
use rand::prelude::*;

/// Center-reached cues, gated by a per-species cooldown.
///
/// The cooldown map only grows during a session; [`PingSynth::reset`]
/// empties it at teardown.
pub struct PingSynth {
    last_ping: FnvHashMap<String, f64>,
    rng: StdRng,
    params: PingParams,
}

impl PingSynth {
    pub fn new(params: PingParams) -> Self {
        Self {
            last_ping: FnvHashMap::default(),
            rng: StdRng::seed_from_u64(params.seed),
            params,
        }
    }

    pub fn is_ready(&self, species_id: &str, now_ms: f64) -> bool {
        match self.last_ping.get(species_id) {
            Some(&last) => now_ms - last >= self.params.cooldown_ms,
            None => true,
        }
    }

    pub fn last_ping(&self, species_id: &str) -> Option<f64> {
        self.last_ping.get(species_id).copied()
    }

    pub fn cooldown_len(&self) -> usize {
        self.last_ping.len()
    }

    /// Play a cue for `species` unless it is cooling down. Returns the pitch
    /// chosen, or `None` when the attempt was swallowed by the cooldown.
    pub fn trigger<B: AudioBackend + ?Sized>(
        &mut self,
        species: &Species,
        now_ms: f64,
        backend: &mut B,
    ) -> Option<f32> {
        if !self.is_ready(&species.id, now_ms) {
            return None;
        }
        self.last_ping.insert(species.id.clone(), now_ms);
        let midi = *ping_palette(species.category)
            .choose(&mut self.rng)
            .unwrap_or(&69);
        let hz = midi_to_hz(midi as f32);
        log::debug!("[ping] {} at {:.1} Hz", species.id, hz);
        tolerate(
            backend.play_cue(&ping_voice(species.category), hz, self.params.cue_sec),
            "ping cue",
        );
        Some(hz)
    }

    /// Forget all cooldowns and restart the pitch sequence.
    pub fn reset(&mut self) {
        self.last_ping.clear();
        self.rng = StdRng::seed_from_u64(self.params.seed);
    }
}
