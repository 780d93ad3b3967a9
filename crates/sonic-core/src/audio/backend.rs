//! Seam between the mixer logic and a concrete audio graph.
//!
//! The mixer only ever schedules targets and durations; interpolation of
//! gains and envelopes is the backend's job, on its own clock.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square { partials: u8 },
    FmSine { modulation_index: f32 },
}

/// ADSR times in seconds, sustain as a level in [0,1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Envelope {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Normalized level `elapsed` seconds into an attack that began at
    /// `start`: a linear rise to 1 over `attack`, then an exponential
    /// approach to `sustain` with time constant `decay / 3`.
    pub fn level_after_attack(&self, start: f32, elapsed: f32) -> f32 {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return start;
        }
        let attack = self.attack.max(0.001);
        if elapsed < attack {
            return start + (1.0 - start) * elapsed / attack;
        }
        let tau = self.decay.max(0.001) / 3.0;
        self.sustain + (1.0 - self.sustain) * (-(elapsed - attack) / tau).exp()
    }
}

/// Slow LFO-driven lowpass applied to a single voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoFilter {
    pub rate_hz: f32,
    pub base_hz: f32,
    pub octaves: f32,
    pub wet: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub envelope: Envelope,
    pub volume_db: f32,
    pub auto_filter: Option<AutoFilter>,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AudioError {
    #[error("voice {0:?} was already disposed")]
    Disposed(VoiceHandle),
    #[error("audio backend has not been started")]
    NotStarted,
    #[error("audio backend error: {0}")]
    Backend(String),
}

pub trait AudioBackend {
    /// Build a sustained voice routed into the master filter. Its output
    /// gain starts at zero and nothing sounds until an attack is triggered.
    fn create_voice(&mut self, spec: &ToneSpec) -> Result<VoiceHandle, AudioError>;

    /// Start (or restart) the voice's envelope at `frequency_hz`.
    fn trigger_attack(&mut self, voice: VoiceHandle, frequency_hz: f32) -> Result<(), AudioError>;

    /// Linearly ramp the voice's output gain to `target` over `duration_sec`.
    fn ramp_gain(
        &mut self,
        voice: VoiceHandle,
        target: f32,
        duration_sec: f32,
    ) -> Result<(), AudioError>;

    /// Enter the envelope's release stage.
    fn trigger_release(&mut self, voice: VoiceHandle) -> Result<(), AudioError>;

    /// Free the voice. Later calls with this handle return [`AudioError::Disposed`].
    fn dispose(&mut self, voice: VoiceHandle) -> Result<(), AudioError>;

    /// Fire-and-forget attack/release cue.
    fn play_cue(
        &mut self,
        spec: &ToneSpec,
        frequency_hz: f32,
        duration_sec: f32,
    ) -> Result<(), AudioError>;

    /// Ramp the master lowpass cutoff.
    fn set_filter_cutoff(&mut self, hz: f32, ramp_sec: f32) -> Result<(), AudioError>;
}

/// Log and swallow a backend failure. Stale handles are expected after
/// teardown, anything else is worth a warning.
pub(crate) fn tolerate<T>(result: Result<T, AudioError>, what: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e @ AudioError::Disposed(_)) => {
            log::debug!("[audio] {what}: {e}");
            None
        }
        Err(e) => {
            log::warn!("[audio] {what}: {e}");
            None
        }
    }
}
