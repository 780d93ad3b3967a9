// Shared fixtures for the sonic-core integration tests.

#![allow(dead_code)]

use sonic_core::{AudioBackend, AudioError, Category, Species, ToneSpec, VoiceHandle};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create(VoiceHandle, ToneSpec),
    Attack(VoiceHandle, f32),
    Ramp(VoiceHandle, f32, f32),
    Release(VoiceHandle),
    Dispose(VoiceHandle),
    Cue(f32, f32),
    Filter(f32, f32),
}

/// Backend that records every call and tracks which voices are alive.
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub live: BTreeSet<VoiceHandle>,
    next: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn attacks(&self, voice: VoiceHandle) -> usize {
        self.count(|c| matches!(c, Call::Attack(v, _) if *v == voice))
    }

    pub fn disposes(&self, voice: VoiceHandle) -> usize {
        self.count(|c| matches!(c, Call::Dispose(v) if *v == voice))
    }

    pub fn cues(&self) -> usize {
        self.count(|c| matches!(c, Call::Cue(..)))
    }

    pub fn last_ramp(&self, voice: VoiceHandle) -> Option<(f32, f32)> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Ramp(v, target, dur) if *v == voice => Some((*target, *dur)),
            _ => None,
        })
    }

    fn check(&self, voice: VoiceHandle) -> Result<(), AudioError> {
        if self.live.contains(&voice) {
            Ok(())
        } else {
            Err(AudioError::Disposed(voice))
        }
    }
}

impl AudioBackend for RecordingBackend {
    fn create_voice(&mut self, spec: &ToneSpec) -> Result<VoiceHandle, AudioError> {
        self.next += 1;
        let v = VoiceHandle(self.next);
        self.live.insert(v);
        self.calls.push(Call::Create(v, *spec));
        Ok(v)
    }

    fn trigger_attack(&mut self, voice: VoiceHandle, hz: f32) -> Result<(), AudioError> {
        self.check(voice)?;
        self.calls.push(Call::Attack(voice, hz));
        Ok(())
    }

    fn ramp_gain(&mut self, voice: VoiceHandle, target: f32, dur: f32) -> Result<(), AudioError> {
        self.check(voice)?;
        self.calls.push(Call::Ramp(voice, target, dur));
        Ok(())
    }

    fn trigger_release(&mut self, voice: VoiceHandle) -> Result<(), AudioError> {
        self.check(voice)?;
        self.calls.push(Call::Release(voice));
        Ok(())
    }

    fn dispose(&mut self, voice: VoiceHandle) -> Result<(), AudioError> {
        if !self.live.remove(&voice) {
            return Err(AudioError::Disposed(voice));
        }
        self.calls.push(Call::Dispose(voice));
        Ok(())
    }

    fn play_cue(&mut self, _spec: &ToneSpec, hz: f32, dur: f32) -> Result<(), AudioError> {
        self.calls.push(Call::Cue(hz, dur));
        Ok(())
    }

    fn set_filter_cutoff(&mut self, hz: f32, ramp: f32) -> Result<(), AudioError> {
        self.calls.push(Call::Filter(hz, ramp));
        Ok(())
    }
}

pub fn species(id: &str, category: Category, x: f32, y: f32, radius: f32, depth: f32) -> Species {
    Species {
        id: id.to_string(),
        name: id.to_string(),
        latin_name: format!("{id} latinus"),
        category,
        x,
        y,
        radius,
        depth,
        color: [120, 200, 255],
        depth_range: "0-10m".to_string(),
    }
}
