// Software synth behind the core AudioBackend trait, rendered on the cpal
// output thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use fnv::FnvHashMap;
use sonic_core::audio::voices::db_to_gain;
use sonic_core::{
    AudioBackend, AudioError, AutoFilter, Envelope, ToneSpec, VoiceHandle, Waveform,
};
use std::f32::consts::{PI, TAU};
use std::sync::{Arc, Mutex, MutexGuard};

const MASTER_FILTER_START_HZ: f32 = 400.0;
const MIN_STAGE_SEC: f32 = 0.001;

/// Linear ramp advanced once per sample.
#[derive(Clone, Copy, Debug)]
struct Ramp {
    value: f32,
    target: f32,
    step: f32,
}

impl Ramp {
    fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            step: 0.0,
        }
    }

    fn to(&mut self, target: f32, seconds: f32, sample_rate: f32) {
        let samples = (seconds * sample_rate).max(1.0);
        self.target = target;
        self.step = (target - self.value) / samples;
    }

    fn next(&mut self) -> f32 {
        if self.value != self.target {
            self.value += self.step;
            let overshot = (self.step > 0.0 && self.value > self.target)
                || (self.step < 0.0 && self.value < self.target);
            if overshot || self.step == 0.0 {
                self.value = self.target;
            }
        }
        self.value
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release { per_sample: f32 },
}

#[derive(Clone, Copy, Debug)]
struct Adsr {
    shape: Envelope,
    stage: Stage,
    level: f32,
}

impl Adsr {
    fn new(shape: Envelope) -> Self {
        Self {
            shape,
            stage: Stage::Idle,
            level: 0.0,
        }
    }

    fn attack(&mut self) {
        self.stage = Stage::Attack;
    }

    fn release(&mut self, sample_rate: f32) {
        let samples = self.shape.release.max(MIN_STAGE_SEC) * sample_rate;
        self.stage = Stage::Release {
            per_sample: self.level / samples,
        };
    }

    fn is_silent(&self) -> bool {
        self.stage == Stage::Idle && self.level <= 0.0
    }

    fn next(&mut self, sample_rate: f32) -> f32 {
        let e = self.shape;
        match self.stage {
            Stage::Idle => {}
            Stage::Attack => {
                self.level += 1.0 / (e.attack.max(MIN_STAGE_SEC) * sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                self.level -= (1.0 - e.sustain) / (e.decay.max(MIN_STAGE_SEC) * sample_rate);
                if self.level <= e.sustain {
                    self.level = e.sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {}
            Stage::Release { per_sample } => {
                self.level -= per_sample.max(f32::EPSILON);
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }
}

/// Per-sample lowpass coefficient for a cutoff.
fn one_pole_coeff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    1.0 - (-TAU * cutoff_hz.max(1.0) / sample_rate).exp()
}

#[derive(Clone, Copy, Debug)]
struct SweptFilter {
    params: AutoFilter,
    lfo_phase: f32,
    state: f32,
}

impl SweptFilter {
    fn process(&mut self, x: f32, sample_rate: f32) -> f32 {
        let af = self.params;
        let sweep = af.base_hz * (2f32.powf(af.octaves) - 1.0) * 0.5;
        let cutoff = af.base_hz + sweep + sweep * self.lfo_phase.sin();
        self.lfo_phase = (self.lfo_phase + TAU * af.rate_hz / sample_rate) % TAU;
        self.state += one_pole_coeff(cutoff, sample_rate) * (x - self.state);
        x * (1.0 - af.wet) + self.state * af.wet
    }
}

#[derive(Clone, Debug)]
struct SynthVoice {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
    mod_phase: f32,
    peak: f32,
    env: Adsr,
    level: Ramp,
    filter: Option<SweptFilter>,
    /// Samples until an automatic release; cues only.
    release_in: Option<u32>,
}

impl SynthVoice {
    fn new(spec: &ToneSpec, level: f32) -> Self {
        Self {
            waveform: spec.waveform,
            frequency: 440.0,
            phase: 0.0,
            mod_phase: 0.0,
            peak: db_to_gain(spec.volume_db),
            env: Adsr::new(spec.envelope),
            level: Ramp::new(level),
            filter: spec.auto_filter.map(|params| SweptFilter {
                params,
                lfo_phase: 0.0,
                state: 0.0,
            }),
            release_in: None,
        }
    }

    fn oscillator(&mut self, sample_rate: f32) -> f32 {
        let mut inc = TAU * self.frequency / sample_rate;
        let out = match self.waveform {
            Waveform::Sine => self.phase.sin(),
            Waveform::Triangle => 2.0 / PI * self.phase.sin().asin(),
            Waveform::Sawtooth => self.phase / PI - 1.0,
            Waveform::Square { partials: 0 } => {
                if self.phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Square { partials } => {
                let sum: f32 = (0..partials as u32)
                    .map(|k| {
                        let n = (2 * k + 1) as f32;
                        (self.phase * n).sin() / n
                    })
                    .sum();
                sum * 4.0 / PI
            }
            Waveform::FmSine { modulation_index } => {
                let deviation = self.frequency * modulation_index * self.mod_phase.sin();
                self.mod_phase = (self.mod_phase + inc) % TAU;
                inc += TAU * deviation / sample_rate;
                self.phase.sin()
            }
        };
        self.phase = (self.phase + inc).rem_euclid(TAU);
        out
    }

    fn next(&mut self, sample_rate: f32) -> f32 {
        if let Some(n) = self.release_in.as_mut() {
            if *n == 0 {
                self.env.release(sample_rate);
                self.release_in = None;
            } else {
                *n -= 1;
            }
        }
        let env = self.env.next(sample_rate);
        let level = self.level.next();
        if env <= 0.0 {
            return 0.0;
        }
        let raw = self.oscillator(sample_rate);
        let shaped = match self.filter.as_mut() {
            Some(f) => f.process(raw, sample_rate),
            None => raw,
        };
        shaped * env * self.peak * level
    }
}

#[derive(Debug)]
struct SynthState {
    sample_rate: f32,
    voices: FnvHashMap<VoiceHandle, SynthVoice>,
    cues: Vec<SynthVoice>,
    cutoff: Ramp,
    lowpass: f32,
}

impl SynthState {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voices: FnvHashMap::default(),
            cues: Vec::new(),
            cutoff: Ramp::new(MASTER_FILTER_START_HZ),
            lowpass: 0.0,
        }
    }

    fn next_sample(&mut self) -> f32 {
        let sr = self.sample_rate;
        let mut mix = 0.0;
        for voice in self.voices.values_mut() {
            mix += voice.next(sr);
        }
        for cue in self.cues.iter_mut() {
            mix += cue.next(sr);
        }
        self.cues
            .retain(|c| c.release_in.is_some() || !c.env.is_silent());
        let cutoff = self.cutoff.next();
        self.lowpass += one_pole_coeff(cutoff, sr) * (mix - self.lowpass);
        self.lowpass.tanh()
    }
}

/// [`AudioBackend`] rendering through the default cpal output device.
/// Without a device every call fails with [`AudioError::NotStarted`].
pub struct CpalBackend {
    state: Arc<Mutex<SynthState>>,
    stream: Option<cpal::Stream>,
    next_id: u64,
}

impl CpalBackend {
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(SynthState::new(48_000.0)));
        let stream = match open_stream(Arc::clone(&state)) {
            Ok(stream) => Some(stream),
            Err(e) => {
                log::warn!("[synth] no audio output: {:#}", e);
                None
            }
        };
        Self {
            state,
            stream,
            next_id: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    fn lock(&self) -> Result<MutexGuard<'_, SynthState>, AudioError> {
        if self.stream.is_none() {
            return Err(AudioError::NotStarted);
        }
        self.state
            .lock()
            .map_err(|_| AudioError::Backend("synth state poisoned".into()))
    }

    fn with_voice<T>(
        &self,
        voice: VoiceHandle,
        f: impl FnOnce(&mut SynthVoice, f32) -> T,
    ) -> Result<T, AudioError> {
        let mut guard = self.lock()?;
        let sr = guard.sample_rate;
        let v = guard
            .voices
            .get_mut(&voice)
            .ok_or(AudioError::Disposed(voice))?;
        Ok(f(v, sr))
    }
}

impl AudioBackend for CpalBackend {
    fn create_voice(&mut self, spec: &ToneSpec) -> Result<VoiceHandle, AudioError> {
        self.next_id += 1;
        let handle = VoiceHandle(self.next_id);
        self.lock()?
            .voices
            .insert(handle, SynthVoice::new(spec, 0.0));
        Ok(handle)
    }

    fn trigger_attack(&mut self, voice: VoiceHandle, frequency_hz: f32) -> Result<(), AudioError> {
        self.with_voice(voice, |v, _| {
            v.frequency = frequency_hz;
            v.env.attack();
        })
    }

    fn ramp_gain(
        &mut self,
        voice: VoiceHandle,
        target: f32,
        duration_sec: f32,
    ) -> Result<(), AudioError> {
        self.with_voice(voice, |v, sr| v.level.to(target, duration_sec, sr))
    }

    fn trigger_release(&mut self, voice: VoiceHandle) -> Result<(), AudioError> {
        self.with_voice(voice, |v, sr| v.env.release(sr))
    }

    fn dispose(&mut self, voice: VoiceHandle) -> Result<(), AudioError> {
        self.lock()?
            .voices
            .remove(&voice)
            .map(|_| ())
            .ok_or(AudioError::Disposed(voice))
    }

    fn play_cue(
        &mut self,
        spec: &ToneSpec,
        frequency_hz: f32,
        duration_sec: f32,
    ) -> Result<(), AudioError> {
        let mut guard = self.lock()?;
        let sr = guard.sample_rate;
        let mut cue = SynthVoice::new(spec, 1.0);
        cue.frequency = frequency_hz;
        cue.env.attack();
        cue.release_in = Some((duration_sec.max(0.0) * sr) as u32);
        guard.cues.push(cue);
        Ok(())
    }

    fn set_filter_cutoff(&mut self, hz: f32, ramp_sec: f32) -> Result<(), AudioError> {
        let mut guard = self.lock()?;
        let sr = guard.sample_rate;
        guard.cutoff.to(hz, ramp_sec, sr);
        Ok(())
    }
}

fn open_stream(state: Arc<Mutex<SynthState>>) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no default output device"))?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f32;
    if let Ok(mut guard) = state.lock() {
        guard.sample_rate = sample_rate;
    }
    log::info!(
        "[synth] {} at {} Hz, {} channels",
        device.name().unwrap_or_else(|_| "output".into()),
        sample_rate,
        config.channels()
    );

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), state)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), state)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), state)?,
        other => anyhow::bail!("unsupported sample format {other:?}"),
    };
    stream.play()?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    state: Arc<Mutex<SynthState>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let Ok(mut guard) = state.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels.max(1)) {
                let s = T::from_sample(guard.next_sample());
                frame.fill(s);
            }
        },
        |err| log::error!("[synth] stream error: {err}"),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 1000.0;

    fn pad() -> ToneSpec {
        ToneSpec {
            waveform: Waveform::Sine,
            envelope: Envelope::new(0.01, 0.01, 0.5, 0.02),
            volume_db: 0.0,
            auto_filter: None,
        }
    }

    #[test]
    fn ramp_reaches_target_and_stops() {
        let mut r = Ramp::new(0.0);
        r.to(1.0, 0.01, SR);
        let last = (0..20).map(|_| r.next()).last().unwrap_or_default();
        assert_eq!(last, 1.0);
    }

    #[test]
    fn adsr_settles_on_sustain_then_releases_to_silence() {
        let mut env = Adsr::new(pad().envelope);
        env.attack();
        for _ in 0..100 {
            env.next(SR);
        }
        assert_eq!(env.stage, Stage::Sustain);
        assert!((env.level - 0.5).abs() < 1e-6);
        env.release(SR);
        for _ in 0..100 {
            env.next(SR);
        }
        assert!(env.is_silent());
    }

    #[test]
    fn voice_is_silent_until_attacked() {
        let mut v = SynthVoice::new(&pad(), 1.0);
        assert!((0..50).all(|_| v.next(SR) == 0.0));
        v.frequency = 100.0;
        v.env.attack();
        assert!((0..50).any(|_| v.next(SR) != 0.0));
    }

    #[test]
    fn cue_is_dropped_after_its_release() {
        let mut state = SynthState::new(SR);
        let mut cue = SynthVoice::new(&pad(), 1.0);
        cue.frequency = 100.0;
        cue.env.attack();
        cue.release_in = Some(30);
        state.cues.push(cue);
        for _ in 0..200 {
            state.next_sample();
        }
        assert!(state.cues.is_empty());
    }

    #[test]
    fn square_partials_stay_bounded() {
        let spec = ToneSpec {
            waveform: Waveform::Square { partials: 4 },
            ..pad()
        };
        let mut v = SynthVoice::new(&spec, 1.0);
        v.frequency = 50.0;
        for _ in 0..200 {
            assert!(v.oscillator(SR).abs() <= 1.3);
        }
    }
}
