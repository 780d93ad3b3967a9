use super::backend::{tolerate, AudioBackend, VoiceHandle};
use super::mixer::ZoneMixer;
use super::ping::PingSynth;
use super::voices::{
    ambient_pad_voice, ambient_sub_voice, midi_to_hz, AMBIENT_PAD_NOTES, AMBIENT_SUB_NOTE,
};
use crate::config::{MixerParams, PingParams};
use crate::constants::FILTER_RAMP_SEC;
use crate::hud;
use crate::proximity::ProximityMap;
use crate::species::Species;

/// Audio state for one user-started session: the ambient bed, the zone
/// mixer and the ping cooldowns. Everything is dropped at [`teardown`],
/// after which [`start`] begins again from empty state.
///
/// [`teardown`]: AudioSession::teardown
/// [`start`]: AudioSession::start
pub struct AudioSession {
    mixer: ZoneMixer,
    pings: PingSynth,
    ambient: Vec<VoiceHandle>,
    started: bool,
}

impl AudioSession {
    pub fn new(mixer: MixerParams, ping: PingParams) -> Self {
        Self {
            mixer: ZoneMixer::new(mixer),
            pings: PingSynth::new(ping),
            ambient: Vec::new(),
            started: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn mixer(&self) -> &ZoneMixer {
        &self.mixer
    }

    pub fn pings(&self) -> &PingSynth {
        &self.pings
    }

    pub fn ambient_voices(&self) -> &[VoiceHandle] {
        &self.ambient
    }

    /// Start the ambient bed. Calling again while started does nothing.
    pub fn start<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.started {
            return;
        }
        self.started = true;
        let pad = ambient_pad_voice();
        let sub = ambient_sub_voice();
        let notes = AMBIENT_PAD_NOTES
            .iter()
            .map(|&n| (&pad, n))
            .chain(std::iter::once((&sub, AMBIENT_SUB_NOTE)));
        for (spec, midi) in notes {
            let Some(voice) = tolerate(backend.create_voice(spec), "ambient voice") else {
                continue;
            };
            tolerate(backend.ramp_gain(voice, 1.0, 0.0), "ambient gain");
            tolerate(
                backend.trigger_attack(voice, midi_to_hz(midi as f32)),
                "ambient attack",
            );
            self.ambient.push(voice);
        }
        log::info!("[session] audio started ({} ambient voices)", self.ambient.len());
    }

    pub fn update_zones<B: AudioBackend + ?Sized>(
        &mut self,
        map: &ProximityMap<'_>,
        now_ms: f64,
        backend: &mut B,
    ) {
        if self.started {
            self.mixer.update(map, now_ms, backend);
        }
    }

    /// Center-reached cue; `None` when not started or cooling down.
    pub fn ping<B: AudioBackend + ?Sized>(
        &mut self,
        species: &Species,
        now_ms: f64,
        backend: &mut B,
    ) -> Option<f32> {
        if !self.started {
            return None;
        }
        self.pings.trigger(species, now_ms, backend)
    }

    /// Track the master lowpass to the depth under the pointer.
    pub fn modulate_filter<B: AudioBackend + ?Sized>(&mut self, depth: f32, backend: &mut B) {
        if self.started {
            tolerate(
                backend.set_filter_cutoff(hud::filter_cutoff_hz(depth), FILTER_RAMP_SEC),
                "filter cutoff",
            );
        }
    }

    /// Cancel pending timers, force every voice into release, free them, and
    /// clear all per-species state.
    pub fn teardown<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        for voice in self.ambient.drain(..) {
            tolerate(backend.trigger_release(voice), "ambient release");
            tolerate(backend.dispose(voice), "ambient dispose");
        }
        self.mixer.teardown(backend);
        self.pings.reset();
        if self.started {
            log::info!("[session] audio torn down");
        }
        self.started = false;
    }
}
