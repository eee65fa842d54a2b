//! Audio-path renderer
//!
//! Parameters are read once per render quantum (128 frames by default), the
//! same granularity at which a platform audio graph picks up control writes.

use std::sync::Arc;

use rand::rngs::StdRng;

use super::compressor::Compressor;
use super::engine_voice::EngineVoice;
use super::noise::{NoiseBuffer, NoiseChannel, NoiseVoice};
use super::params::SynthParams;
use super::shaper::WaveShaper;
use crate::config::AudioConfig;

/// Produces mono samples from the shared parameter block
pub struct SynthRenderer {
    params: Arc<SynthParams>,
    sample_rate: u32,
    quantum: usize,
    until_refresh: usize,
    engine: EngineVoice,
    shaper: WaveShaper,
    compressor: Compressor,
    brake: NoiseVoice,
    brake_gain: f32,
    tire: NoiseVoice,
    tire_gain: f32,
    stopped: bool,
}

impl SynthRenderer {
    /// Renderer reading `params`; noise buffers are drawn from `rng`
    pub fn new(params: Arc<SynthParams>, config: &AudioConfig, rng: &mut StdRng) -> Self {
        let sr = config.sample_rate as f32;
        let engine_noise = NoiseBuffer::new(config.sample_rate, rng);
        let brake_noise = NoiseBuffer::new(config.sample_rate, rng);
        let tire_noise = NoiseBuffer::new(config.sample_rate, rng);

        SynthRenderer {
            params,
            sample_rate: config.sample_rate,
            quantum: config.render_quantum.max(1),
            until_refresh: 0,
            engine: EngineVoice::new(engine_noise, sr),
            shaper: WaveShaper::engine(sr),
            compressor: Compressor::engine(sr),
            brake: NoiseVoice::new(NoiseChannel::Brake, brake_noise, sr),
            brake_gain: 0.0,
            tire: NoiseVoice::new(NoiseChannel::Tire, tire_noise, sr),
            tire_gain: 0.0,
            stopped: false,
        }
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// All sources have been stopped
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn refresh(&mut self) {
        if !self.params.is_running() {
            self.stopped = true;
            return;
        }
        self.engine.refresh(&self.params);
        self.brake_gain = self.brake.gain(&self.params);
        self.tire_gain = self.tire.gain(&self.params);
    }

    /// Next output sample
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.until_refresh == 0 {
            self.refresh();
            self.until_refresh = self.quantum;
        }
        self.until_refresh -= 1;

        if self.stopped {
            return 0.0;
        }

        let engine = self.compressor.process(self.shaper.process(self.engine.next_sample()));
        let brake = self.brake.next_sample(self.brake_gain);
        let tire = self.tire.next_sample(self.tire_gain);
        (engine + brake + tire).clamp(-1.0, 1.0)
    }

    /// Fill `out` with consecutive samples
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
