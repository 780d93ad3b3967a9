//! Proximity-driven zone layers.
//!
//! Each species near the pointer owns at most one sustained voice. A layer
//! moves `Active -> Releasing -> removed`:
//!
//! - it is created the first frame its species has positive proximity, with
//!   gain at zero and an attack at the category note shifted by depth band;
//! - while present, its gain follows the category's stacked target;
//! - once absent, gain ramps to zero and a release timer is armed. When the
//!   timer fires the envelope is released, the layer leaves the registry and
//!   the voice is disposed a few seconds later.
//!
//! Re-entering while `Releasing` re-arms the same voice with a fresh attack.
//! Timers carry the layer generation they were armed for, so a release armed
//! before the re-entry finds a newer generation and does nothing.

use super::backend::{tolerate, AudioBackend, ToneSpec, VoiceHandle};
use super::schedule::Scheduler;
use super::voices::{midi_to_hz, octave_offset, transpose_octaves, zone_voice};
use crate::config::MixerParams;
use crate::proximity::ProximityMap;
use crate::species::{Category, Species};
use fnv::FnvHashMap;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerState {
    Active,
    Releasing,
}

#[derive(Clone, Debug)]
pub struct ZoneLayer {
    pub species_id: String,
    pub category: Category,
    pub voice: VoiceHandle,
    pub target_gain: f32,
    pub octave_offset: i32,
    pub volume_db: f32,
    pub frequency_hz: f32,
    pub state: LayerState,
    generation: u64,
}

impl ZoneLayer {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
enum ZoneTask {
    Release { species_id: String, generation: u64 },
    Dispose { voice: VoiceHandle },
}

/// Anti-stacking target gain shared by every layer of one category.
///
/// `count` members with the largest proximity `max_proximity` give
/// `(max_proximity * min(1, numerator / count)) ^ exponent`.
pub fn stacked_gain(max_proximity: f32, count: usize, params: &MixerParams) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let stacking = (params.stacking_numerator / count as f32).min(1.0);
    let blended = (max_proximity * stacking).clamp(0.0, 1.0);
    blended.powf(params.gain_exponent)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CategoryAggregate {
    pub count: usize,
    pub max_proximity: f32,
}

/// Member count and peak proximity per category, over entries with
/// positive proximity.
pub fn category_aggregates(map: &ProximityMap<'_>) -> FnvHashMap<Category, CategoryAggregate> {
    let mut out: FnvHashMap<Category, CategoryAggregate> = FnvHashMap::default();
    for entry in map.iter().filter(|e| e.proximity > 0.0) {
        let agg = out.entry(entry.species.category).or_default();
        agg.count += 1;
        agg.max_proximity = agg.max_proximity.max(entry.proximity);
    }
    out
}

pub struct ZoneMixer {
    layers: BTreeMap<String, ZoneLayer>,
    timers: Scheduler<ZoneTask>,
    params: MixerParams,
    next_generation: u64,
}

impl ZoneMixer {
    pub fn new(params: MixerParams) -> Self {
        Self {
            layers: BTreeMap::new(),
            timers: Scheduler::new(),
            params,
            next_generation: 0,
        }
    }

    pub fn params(&self) -> &MixerParams {
        &self.params
    }

    pub fn layer(&self, species_id: &str) -> Option<&ZoneLayer> {
        self.layers.get(species_id)
    }

    /// `None` once the layer has been removed (or never existed).
    pub fn layer_state(&self, species_id: &str) -> Option<LayerState> {
        self.layers.get(species_id).map(|l| l.state)
    }

    pub fn layers(&self) -> impl Iterator<Item = &ZoneLayer> {
        self.layers.values()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Release and dispose timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn create_layer<B: AudioBackend + ?Sized>(
        &mut self,
        species: &Species,
        backend: &mut B,
    ) -> Option<ZoneLayer> {
        let voice = zone_voice(species.category);
        let octave_offset = octave_offset(species.depth);
        let midi = transpose_octaves(voice.midi, octave_offset);
        let volume_db = voice.max_volume_db + (1.0 - species.depth) * self.params.depth_boost_db;
        let spec = ToneSpec {
            waveform: voice.waveform,
            envelope: voice.envelope,
            volume_db,
            auto_filter: None,
        };
        let handle = tolerate(backend.create_voice(&spec), "create zone voice")?;
        let frequency_hz = midi_to_hz(midi as f32);
        tolerate(backend.trigger_attack(handle, frequency_hz), "zone attack");
        log::debug!(
            "[zones] layer {} created ({:?}, midi {}, {:.1} dB)",
            species.id,
            species.category,
            midi,
            volume_db
        );
        Some(ZoneLayer {
            species_id: species.id.clone(),
            category: species.category,
            voice: handle,
            target_gain: 0.0,
            octave_offset,
            volume_db,
            frequency_hz,
            state: LayerState::Active,
            generation: self.bump_generation(),
        })
    }

    fn run_due<B: AudioBackend + ?Sized>(&mut self, now_ms: f64, backend: &mut B) {
        for task in self.timers.take_due(now_ms) {
            match task {
                ZoneTask::Release {
                    species_id,
                    generation,
                } => {
                    let current = self.layers.get(&species_id).is_some_and(|l| {
                        l.generation == generation && l.state == LayerState::Releasing
                    });
                    if !current {
                        log::debug!("[zones] stale release for {} ignored", species_id);
                        continue;
                    }
                    if let Some(layer) = self.layers.remove(&species_id) {
                        tolerate(backend.trigger_release(layer.voice), "zone release");
                        self.timers.schedule(
                            now_ms + self.params.dispose_delay_ms,
                            ZoneTask::Dispose { voice: layer.voice },
                        );
                        log::debug!("[zones] layer {} released", species_id);
                    }
                }
                ZoneTask::Dispose { voice } => {
                    tolerate(backend.dispose(voice), "zone dispose");
                }
            }
        }
    }

    /// Apply one frame's proximity map at logical time `now_ms`.
    pub fn update<B: AudioBackend + ?Sized>(
        &mut self,
        map: &ProximityMap<'_>,
        now_ms: f64,
        backend: &mut B,
    ) {
        self.run_due(now_ms, backend);

        for entry in map.iter().filter(|e| e.proximity > 0.0) {
            let id = entry.species.id.as_str();
            match self.layers.get(id).map(|l| l.state) {
                None => {
                    if let Some(layer) = self.create_layer(entry.species, backend) {
                        self.layers.insert(layer.species_id.clone(), layer);
                    }
                }
                Some(LayerState::Releasing) => {
                    let generation = self.bump_generation();
                    if let Some(layer) = self.layers.get_mut(id) {
                        layer.generation = generation;
                        layer.state = LayerState::Active;
                        tolerate(
                            backend.trigger_attack(layer.voice, layer.frequency_hz),
                            "zone re-attack",
                        );
                        log::debug!("[zones] layer {} re-armed", id);
                    }
                }
                Some(LayerState::Active) => {}
            }
        }

        let aggregates = category_aggregates(map);
        let mut to_release = Vec::new();
        for layer in self.layers.values_mut() {
            let proximity = map.proximity(&layer.species_id);
            if proximity > 0.0 {
                let agg = aggregates.get(&layer.category).copied().unwrap_or_default();
                let target = stacked_gain(agg.max_proximity, agg.count, &self.params);
                layer.target_gain = target;
                tolerate(
                    backend.ramp_gain(layer.voice, target, self.params.attack_ramp_sec),
                    "zone gain",
                );
            } else if layer.state == LayerState::Active {
                layer.state = LayerState::Releasing;
                layer.target_gain = 0.0;
                tolerate(
                    backend.ramp_gain(layer.voice, 0.0, self.params.release_ramp_sec),
                    "zone fade",
                );
                to_release.push((layer.species_id.clone(), layer.generation));
            }
        }
        for (species_id, generation) in to_release {
            log::debug!("[zones] layer {} releasing", species_id);
            self.timers.schedule(
                now_ms + self.params.release_delay_ms,
                ZoneTask::Release {
                    species_id,
                    generation,
                },
            );
        }
    }

    /// Cancel every timer, release and free every voice, and forget all layers.
    pub fn teardown<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        for task in self.timers.drain_all() {
            if let ZoneTask::Dispose { voice } = task {
                tolerate(backend.dispose(voice), "teardown dispose");
            }
        }
        for (_, layer) in std::mem::take(&mut self.layers) {
            tolerate(backend.trigger_release(layer.voice), "teardown release");
            tolerate(backend.dispose(layer.voice), "teardown dispose");
        }
        self.next_generation = 0;
    }
}
