use crate::constants::*;
use fnv::FnvHashMap;
use std::cell::Cell;
use sonic_core::audio::voices::db_to_gain;
use sonic_core::{
    AudioBackend, AudioError, AudioSession, Envelope, ToneSpec, VoiceHandle, Waveform,
};
use wasm_bindgen::JsValue;
use web_sys as web;

fn js_err(what: &str, e: JsValue) -> AudioError {
    AudioError::Backend(format!("{what}: {e:?}"))
}

fn create_gain(
    ctx: &web::AudioContext,
    value: f32,
    label: &str,
) -> Result<web::GainNode, AudioError> {
    let g = web::GainNode::new(ctx).map_err(|e| js_err(label, e))?;
    g.gain().set_value(value);
    Ok(g)
}

fn create_lowpass(ctx: &web::AudioContext, hz: f32) -> Result<web::BiquadFilterNode, AudioError> {
    let f = web::BiquadFilterNode::new(ctx).map_err(|e| js_err("BiquadFilterNode", e))?;
    f.set_type(web::BiquadFilterType::Lowpass);
    f.frequency().set_value(hz);
    f.q().set_value(MASTER_FILTER_Q);
    Ok(f)
}

/// Long stereo noise tail with an exponential decay reaching -60 dB at
/// `seconds`.
fn build_impulse_response(ctx: &web::AudioContext, seconds: f32) -> Option<web::AudioBuffer> {
    let sr = ctx.sample_rate();
    let len = (sr * seconds) as u32;
    let ir = ctx.create_buffer(2, len, sr).ok()?;
    let tau = seconds / 6.9;
    // xorshift32 keeps the tail identical between sessions
    let mut seeds: [u32; 2] = [0x1234ABCD, 0x7890FEDC];
    for (ch, seed) in seeds.iter_mut().enumerate() {
        let mut buf: Vec<f32> = vec![0.0; len as usize];
        let dt = 1.0 / sr;
        for (i, v) in buf.iter_mut().enumerate() {
            let mut x = *seed;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            *seed = x;
            let n = (x as f32 / u32::MAX as f32) * 2.0 - 1.0;
            let t = i as f32 * dt;
            *v = n * (-t / tau).exp();
        }
        _ = ir.copy_to_channel(&mut buf, ch as i32);
    }
    Some(ir)
}

/// Master bus shared by every voice. `input` is the lowpass the depth
/// readout modulates.
struct MasterChain {
    input: web::BiquadFilterNode,
}

fn build_master_chain(ctx: &web::AudioContext) -> Result<MasterChain, AudioError> {
    let input = create_lowpass(ctx, MASTER_FILTER_START_HZ)?;
    let dry = create_gain(ctx, 1.0 - REVERB_WET, "reverb dry")?;
    let wet = create_gain(ctx, REVERB_WET, "reverb wet")?;
    let reverb = web::ConvolverNode::new(ctx).map_err(|e| js_err("ConvolverNode", e))?;
    reverb.set_normalize(true);
    if let Some(ir) = build_impulse_response(ctx, REVERB_DECAY_SEC) {
        reverb.set_buffer(Some(&ir));
    } else {
        log::warn!("[audio] impulse response unavailable, reverb is silent");
    }
    let limiter =
        web::DynamicsCompressorNode::new(ctx).map_err(|e| js_err("DynamicsCompressorNode", e))?;
    limiter.threshold().set_value(LIMITER_THRESHOLD_DB);
    limiter.knee().set_value(LIMITER_KNEE_DB);
    limiter.ratio().set_value(LIMITER_RATIO);
    limiter.attack().set_value(LIMITER_ATTACK_SEC);
    limiter.release().set_value(LIMITER_RELEASE_SEC);

    _ = input.connect_with_audio_node(&dry);
    _ = input.connect_with_audio_node(&reverb);
    _ = reverb.connect_with_audio_node(&wet);
    _ = dry.connect_with_audio_node(&limiter);
    _ = wet.connect_with_audio_node(&limiter);
    _ = limiter.connect_with_audio_node(&ctx.destination());
    Ok(MasterChain { input })
}

/// Oscillator graph for one tone: carrier (plus FM modulator or auto-filter
/// LFO) into an envelope gain.
struct ToneGraph {
    carrier: web::OscillatorNode,
    modulator: Option<(web::OscillatorNode, web::GainNode, f32)>,
    lfo: Option<web::OscillatorNode>,
    env: web::GainNode,
    envelope: Envelope,
    peak: f32,
    /// Start time and normalized starting level of the running attack.
    attacked: Cell<Option<(f64, f32)>>,
}

impl ToneGraph {
    fn build(ctx: &web::AudioContext, spec: &ToneSpec) -> Result<Self, AudioError> {
        let carrier = web::OscillatorNode::new(ctx).map_err(|e| js_err("OscillatorNode", e))?;
        let mut modulator = None;
        match spec.waveform {
            Waveform::Sine => carrier.set_type(web::OscillatorType::Sine),
            Waveform::Triangle => carrier.set_type(web::OscillatorType::Triangle),
            Waveform::Sawtooth => carrier.set_type(web::OscillatorType::Sawtooth),
            // band-limited square; the partial count only matters to the native synth
            Waveform::Square { .. } => carrier.set_type(web::OscillatorType::Square),
            Waveform::FmSine { modulation_index } => {
                carrier.set_type(web::OscillatorType::Sine);
                let m = web::OscillatorNode::new(ctx).map_err(|e| js_err("modulator", e))?;
                let depth = create_gain(ctx, 0.0, "modulation depth")?;
                _ = m.connect_with_audio_node(&depth);
                _ = depth.connect_with_audio_param(&carrier.frequency());
                modulator = Some((m, depth, modulation_index));
            }
        }

        let env = create_gain(ctx, 0.0, "envelope")?;
        let mut lfo = None;
        match spec.auto_filter {
            Some(af) => {
                let filter = create_lowpass(ctx, af.base_hz)?;
                let dry = create_gain(ctx, 1.0 - af.wet, "autofilter dry")?;
                let wet = create_gain(ctx, af.wet, "autofilter wet")?;
                let osc = web::OscillatorNode::new(ctx).map_err(|e| js_err("lfo", e))?;
                osc.frequency().set_value(af.rate_hz);
                let sweep = af.base_hz * (2f32.powf(af.octaves) - 1.0) * 0.5;
                let lfo_depth = create_gain(ctx, sweep, "lfo depth")?;
                filter.frequency().set_value(af.base_hz + sweep);
                _ = osc.connect_with_audio_node(&lfo_depth);
                _ = lfo_depth.connect_with_audio_param(&filter.frequency());
                _ = carrier.connect_with_audio_node(&dry);
                _ = carrier.connect_with_audio_node(&filter);
                _ = filter.connect_with_audio_node(&wet);
                _ = dry.connect_with_audio_node(&env);
                _ = wet.connect_with_audio_node(&env);
                lfo = Some(osc);
            }
            None => {
                _ = carrier.connect_with_audio_node(&env);
            }
        }

        Ok(Self {
            carrier,
            modulator,
            lfo,
            env,
            envelope: spec.envelope,
            peak: db_to_gain(spec.volume_db),
            attacked: Cell::new(None),
        })
    }

    fn start(&self, at: f64) {
        _ = self.carrier.start_with_when(at);
        if let Some((m, _, _)) = &self.modulator {
            _ = m.start_with_when(at);
        }
        if let Some(lfo) = &self.lfo {
            _ = lfo.start_with_when(at);
        }
    }

    fn stop(&self, at: f64) {
        _ = self.carrier.stop_with_when(at);
        if let Some((m, _, _)) = &self.modulator {
            _ = m.stop_with_when(at);
        }
        if let Some(lfo) = &self.lfo {
            _ = lfo.stop_with_when(at);
        }
    }

    fn set_frequency(&self, hz: f32, at: f64) {
        _ = self.carrier.frequency().set_value_at_time(hz, at);
        if let Some((m, depth, index)) = &self.modulator {
            _ = m.frequency().set_value_at_time(hz, at);
            _ = depth.gain().set_value_at_time(hz * index, at);
        }
    }

    /// Attack to peak, then decay towards the sustain level, from wherever
    /// the envelope currently is.
    fn attack(&self, at: f64) {
        let g = self.env.gain();
        let e = self.envelope;
        let from = self.level_at(at);
        _ = g.cancel_scheduled_values(at);
        _ = g.set_value_at_time(from, at);
        let start = if self.peak > 0.0 { from / self.peak } else { 0.0 };
        self.attacked.set(Some((at, start)));
        let peak_at = at + e.attack.max(0.001) as f64;
        _ = g.linear_ramp_to_value_at_time(self.peak, peak_at);
        let decay_tau = (e.decay.max(0.001) / 3.0) as f64;
        _ = g.set_target_at_time(self.peak * e.sustain, peak_at, decay_tau);
    }

    fn release(&self, at: f64) -> f64 {
        let g = self.env.gain();
        let end = at + self.envelope.release.max(0.001) as f64;
        let from = self.level_at(at);
        _ = g.cancel_scheduled_values(at);
        _ = g.set_value_at_time(from, at);
        _ = g.linear_ramp_to_value_at_time(0.0, end);
        self.attacked.set(None);
        end
    }

    /// Envelope gain at `at`, following the scheduled attack when one is
    /// running. Reading the param directly only gives the value now.
    fn level_at(&self, at: f64) -> f32 {
        match self.attacked.get() {
            Some((t0, start)) => {
                self.envelope.level_after_attack(start, (at - t0) as f32) * self.peak
            }
            None => self.env.gain().value(),
        }
    }
}

struct WebVoice {
    tone: ToneGraph,
    level: web::GainNode,
}

/// [`AudioBackend`] over a WebAudio context.
///
/// Every sustained voice owns its own oscillators, started at creation and
/// silent until an attack, feeding a level gain into the master lowpass.
pub struct WebAudioBackend {
    ctx: web::AudioContext,
    master: MasterChain,
    voices: FnvHashMap<VoiceHandle, WebVoice>,
    next_id: u64,
}

impl WebAudioBackend {
    /// Must be called from a user gesture so the context may start.
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        _ = ctx.resume();
        let master = build_master_chain(&ctx).map_err(anyhow::Error::new)?;
        log::info!("[audio] context ready at {} Hz", ctx.sample_rate());
        Ok(Self {
            ctx,
            master,
            voices: FnvHashMap::default(),
            next_id: 0,
        })
    }

    pub fn resume(&self) {
        _ = self.ctx.resume();
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    fn now(&self) -> Result<f64, AudioError> {
        if self.ctx.state() == web::AudioContextState::Closed {
            return Err(AudioError::NotStarted);
        }
        Ok(self.ctx.current_time() + AUDIO_LOOKAHEAD_SEC)
    }

    fn voice(&self, handle: VoiceHandle) -> Result<&WebVoice, AudioError> {
        self.voices.get(&handle).ok_or(AudioError::Disposed(handle))
    }
}

impl AudioBackend for WebAudioBackend {
    fn create_voice(&mut self, spec: &ToneSpec) -> Result<VoiceHandle, AudioError> {
        let at = self.now()?;
        let tone = ToneGraph::build(&self.ctx, spec)?;
        let level = create_gain(&self.ctx, 0.0, "voice level")?;
        _ = tone.env.connect_with_audio_node(&level);
        _ = level.connect_with_audio_node(&self.master.input);
        tone.start(at);
        self.next_id += 1;
        let handle = VoiceHandle(self.next_id);
        self.voices.insert(handle, WebVoice { tone, level });
        Ok(handle)
    }

    fn trigger_attack(&mut self, voice: VoiceHandle, frequency_hz: f32) -> Result<(), AudioError> {
        let at = self.now()?;
        let v = self.voice(voice)?;
        v.tone.set_frequency(frequency_hz, at);
        v.tone.attack(at);
        Ok(())
    }

    fn ramp_gain(
        &mut self,
        voice: VoiceHandle,
        target: f32,
        duration_sec: f32,
    ) -> Result<(), AudioError> {
        let at = self.now()?;
        let g = self.voice(voice)?.level.gain();
        _ = g.cancel_scheduled_values(at);
        if duration_sec <= 0.0 {
            _ = g.set_value_at_time(target, at);
        } else {
            _ = g.set_value_at_time(g.value(), at);
            _ = g.linear_ramp_to_value_at_time(target, at + duration_sec as f64);
        }
        Ok(())
    }

    fn trigger_release(&mut self, voice: VoiceHandle) -> Result<(), AudioError> {
        let at = self.now()?;
        self.voice(voice)?.tone.release(at);
        Ok(())
    }

    fn dispose(&mut self, voice: VoiceHandle) -> Result<(), AudioError> {
        let v = self.voices.remove(&voice).ok_or(AudioError::Disposed(voice))?;
        v.tone.stop(self.ctx.current_time());
        _ = v.level.disconnect();
        Ok(())
    }

    fn play_cue(
        &mut self,
        spec: &ToneSpec,
        frequency_hz: f32,
        duration_sec: f32,
    ) -> Result<(), AudioError> {
        let at = self.now()?;
        let tone = ToneGraph::build(&self.ctx, spec)?;
        _ = tone.env.connect_with_audio_node(&self.master.input);
        tone.set_frequency(frequency_hz, at);
        tone.start(at);
        tone.attack(at);
        let end = tone.release(at + duration_sec as f64);
        tone.stop(end.min(at + CUE_TAIL_MAX_SEC) + 0.05);
        Ok(())
    }

    fn set_filter_cutoff(&mut self, hz: f32, ramp_sec: f32) -> Result<(), AudioError> {
        let at = self.now()?;
        let f = self.master.input.frequency();
        _ = f.cancel_scheduled_values(at);
        _ = f.set_value_at_time(f.value(), at);
        _ = f.linear_ramp_to_value_at_time(hz, at + ramp_sec as f64);
        Ok(())
    }
}

/// Session plus its backend. The backend is created lazily on the first
/// start gesture and kept across teardowns so the context is reused.
pub struct AudioState {
    pub session: AudioSession,
    backend: Option<WebAudioBackend>,
}

impl AudioState {
    pub fn new(session: AudioSession) -> Self {
        Self {
            session,
            backend: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.session.is_started()
    }

    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.session.is_started() {
            return Ok(());
        }
        let backend = match self.backend.take() {
            Some(b) => b,
            None => WebAudioBackend::new()?,
        };
        let backend = self.backend.insert(backend);
        backend.resume();
        self.session.start(backend);
        Ok(())
    }

    pub fn teardown(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            self.session.teardown(backend);
            log::info!("[audio] {} voices live after teardown", backend.voice_count());
        }
    }

    /// Run `f` against the session when audio is live.
    pub fn with_live(&mut self, f: impl FnOnce(&mut AudioSession, &mut WebAudioBackend)) {
        if !self.session.is_started() {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            f(&mut self.session, backend);
        }
    }
}
