//! Looping white-noise sources and the brake/tire noise voices

use std::sync::Arc;

use rand::Rng;

use super::filter::Biquad;
use super::params::{ParamCell, SynthParams};

/// Length of every noise buffer
pub const NOISE_BUFFER_SECONDS: f32 = 2.0;
/// Centre frequency of the brake and tire band-pass
pub const NOISE_VOICE_CENTER: f32 = 2_000.0;
/// Q of the brake and tire band-pass
pub const NOISE_VOICE_Q: f32 = 10.0;

/// Pre-generated uniform white noise, played in a loop
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    samples: Vec<f32>,
    pos: usize,
}

impl NoiseBuffer {
    /// Fill a `NOISE_BUFFER_SECONDS` buffer from `rng`
    pub fn new<R: Rng + ?Sized>(sample_rate: u32, rng: &mut R) -> Self {
        let len = ((sample_rate as f32 * NOISE_BUFFER_SECONDS) as usize).max(1);
        let samples = (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
        NoiseBuffer { samples, pos: 0 }
    }

    /// Buffer length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; buffers hold at least one sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Next sample, wrapping at the end
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let s = self.samples[self.pos];
        self.pos += 1;
        if self.pos == self.samples.len() {
            self.pos = 0;
        }
        s
    }
}

/// Which noise voice a control handle drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseChannel {
    /// Brake hiss
    Brake,
    /// Tire squeal
    Tire,
}

impl NoiseChannel {
    fn gain(self, params: &SynthParams) -> &ParamCell {
        match self {
            NoiseChannel::Brake => &params.brake_gain,
            NoiseChannel::Tire => &params.tire_gain,
        }
    }
}

/// Renderer half of a noise voice: source, band-pass, gain
#[derive(Debug, Clone)]
pub struct NoiseVoice {
    channel: NoiseChannel,
    source: NoiseBuffer,
    bandpass: Biquad,
}

impl NoiseVoice {
    /// Noise voice through the fixed 2 kHz band-pass
    pub fn new(channel: NoiseChannel, source: NoiseBuffer, sample_rate: f32) -> Self {
        NoiseVoice {
            channel,
            source,
            bandpass: Biquad::bandpass(NOISE_VOICE_CENTER, NOISE_VOICE_Q, sample_rate),
        }
    }

    /// Current gain for this voice
    pub fn gain(&self, params: &SynthParams) -> f32 {
        self.channel.gain(params).get()
    }

    /// One filtered sample scaled by `gain`
    #[inline]
    pub fn next_sample(&mut self, gain: f32) -> f32 {
        self.bandpass.process(self.source.next_sample()) * gain
    }
}

/// Simulation half of a noise voice
#[derive(Debug, Clone)]
pub struct NoiseControls {
    params: Arc<SynthParams>,
    channel: NoiseChannel,
}

impl NoiseControls {
    /// Control handle for `channel`
    pub fn new(params: Arc<SynthParams>, channel: NoiseChannel) -> Self {
        NoiseControls { params, channel }
    }

    /// Set the voice gain (no ramp)
    pub fn set_volume(&self, volume: f32) {
        self.channel.gain(&self.params).set(volume);
    }

    /// Last published gain
    pub fn volume(&self) -> f32 {
        self.channel.gain(&self.params).get()
    }
}
