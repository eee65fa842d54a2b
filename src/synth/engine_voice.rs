//! Engine voice: oscillator bank plus band-passed noise floor

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use super::filter::Biquad;
use super::noise::NoiseBuffer;
use super::oscillator::{Oscillator, Waveform};
use super::params::SynthParams;
use super::{FUNDAMENTAL_GAIN, HARMONIC_COUNT, HARMONIC_LEVELS, HARMONIC_RATIOS, VOICE_COUNT};

/// Maximum random offset added to each harmonic, in Hz
pub const HARMONIC_DETUNE_HZ: f32 = 5.0;
/// Engine noise band-pass centre as a multiple of the base frequency
pub const NOISE_CENTER_RATIO: f32 = 3.0;
/// Engine noise band-pass Q
pub const NOISE_Q: f32 = 1.0;
/// RPM that maps to a normalized value of 1 in the timbre balance
pub const RPM_NORMALIZER: f32 = 10_000.0;

/// Gain of `harmonic` (0-based) at normalized RPM `n`
///
/// The two lowest harmonics fade as revs rise; the upper ones grow.
pub fn harmonic_gain(harmonic: usize, n: f32) -> f32 {
    let factor = if harmonic < 2 { 1.0 - 0.5 * n } else { n };
    FUNDAMENTAL_GAIN * HARMONIC_LEVELS[harmonic] * factor
}

/// Engine noise floor gain at normalized RPM `n`
pub fn noise_floor_gain(n: f32) -> f32 {
    0.05 + 0.1 * n
}

/// One tonal voice of the engine bank
#[derive(Debug, Clone)]
pub struct Voice {
    /// Oscillator state
    pub oscillator: Oscillator,
    /// Gain applied to the oscillator output
    pub gain: f32,
    /// Frequency in Hz
    pub frequency: f32,
}

/// Renderer half of the engine: oscillator bank and noise floor
#[derive(Debug, Clone)]
pub struct EngineVoice {
    voices: [Voice; VOICE_COUNT - 1],
    noise: NoiseBuffer,
    noise_filter: Biquad,
    noise_gain: f32,
    noise_center: f32,
    master: f32,
}

impl EngineVoice {
    /// Fundamental sawtooth, harmonics alternating sawtooth and square
    pub fn new(noise: NoiseBuffer, sample_rate: f32) -> Self {
        let voices = std::array::from_fn(|i| {
            let waveform = if i == 0 || (i - 1) % 2 == 0 {
                Waveform::Sawtooth
            } else {
                Waveform::Square
            };
            Voice {
                oscillator: Oscillator::new(waveform, sample_rate),
                gain: 0.0,
                frequency: 0.0,
            }
        });
        EngineVoice {
            voices,
            noise,
            noise_filter: Biquad::bandpass(super::POWER_ON_FREQ, NOISE_Q, sample_rate),
            noise_gain: 0.0,
            noise_center: super::POWER_ON_FREQ,
            master: 0.0,
        }
    }

    /// Waveform of each tonal voice
    pub fn waveforms(&self) -> [Waveform; VOICE_COUNT - 1] {
        std::array::from_fn(|i| self.voices[i].oscillator.waveform())
    }

    /// Pull the latest parameter values
    pub fn refresh(&mut self, params: &SynthParams) {
        let engine = &params.engine;
        for (i, voice) in self.voices.iter_mut().enumerate() {
            voice.frequency = engine.frequencies[i].get();
            voice.gain = engine.gains[i].get();
        }
        self.noise_gain = engine.gains[VOICE_COUNT - 1].get();
        self.master = engine.master.get();

        let center = engine.noise_center.get();
        if center != self.noise_center {
            self.noise_center = center;
            self.noise_filter.set_bandpass(center, NOISE_Q);
        }
    }

    /// Summed voices after the master gain, before distortion
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let tonal: f32 = self
            .voices
            .iter_mut()
            .map(|v| v.oscillator.next_sample(v.frequency) * v.gain)
            .sum();
        let noise = self.noise_filter.process(self.noise.next_sample()) * self.noise_gain;
        (tonal + noise) * self.master
    }
}

/// Simulation half of the engine voice
pub struct EngineControls {
    params: Arc<SynthParams>,
    rng: StdRng,
}

impl EngineControls {
    /// Control handle; `rng` drives the harmonic detune
    pub fn new(params: Arc<SynthParams>, rng: StdRng) -> Self {
        EngineControls { params, rng }
    }

    /// Fundamental at `base_freq`, harmonics at their ratios ± detune
    pub fn set_frequency(&mut self, base_freq: f32) {
        let engine = &self.params.engine;
        engine.frequencies[0].set(base_freq);
        for (i, ratio) in HARMONIC_RATIOS.iter().enumerate() {
            let detune = self.rng.gen_range(-HARMONIC_DETUNE_HZ..=HARMONIC_DETUNE_HZ);
            engine.frequencies[i + 1].set(base_freq * ratio + detune);
        }
        engine.noise_center.set(base_freq * NOISE_CENTER_RATIO);
    }

    /// Master gain, applied as-is
    pub fn set_volume(&self, volume: f32) {
        self.params.engine.master.set(volume);
    }

    /// Rebalance the timbre for `rpm`
    pub fn set_rpm(&self, rpm: f32) {
        let n = rpm / RPM_NORMALIZER;
        let gains = &self.params.engine.gains;
        for harmonic in 0..HARMONIC_COUNT {
            gains[harmonic + 1].set(harmonic_gain(harmonic, n));
        }
        gains[VOICE_COUNT - 1].set(noise_floor_gain(n));
    }

    /// Last published fundamental frequency
    pub fn frequency(&self) -> f32 {
        self.params.engine.frequencies[0].get()
    }

    /// Last published master gain
    pub fn volume(&self) -> f32 {
        self.params.engine.master.get()
    }
}
