//! Procedural engine and road-noise synthesis
//!
//! The engine is split in two halves sharing one [`SynthParams`]:
//! - [`AudioSynthesisEngine`] lives on the simulation side and publishes
//!   scalar parameter writes (frequency, gain, RPM balance)
//! - [`SynthRenderer`] lives on the audio path and turns the latest
//!   parameter values into samples, one render quantum at a time
//!
//! Signal chain (fixed order):
//!
//! ```text
//! fundamental ─┐
//! harmonics ×5 ├─ gains ─ master ─ wave shaper (4×) ─ compressor ─┐
//! engine noise ┘                                                  ├─ clip ─ out
//! brake noise ─ band-pass ─ gain ─────────────────────────────────┤
//! tire noise ── band-pass ─ gain ─────────────────────────────────┘
//! ```
//!
//! Parameter changes are applied immediately without ramps, so abrupt gain
//! changes can click.

pub mod compressor;
pub mod engine_voice;
pub mod filter;
pub mod noise;
pub mod oscillator;
pub mod params;
pub mod renderer;
pub mod shaper;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AudioConfig;

pub use engine_voice::EngineControls;
pub use noise::{NoiseChannel, NoiseControls};
pub use params::{ParamCell, SynthParams};
pub use renderer::SynthRenderer;

/// Number of harmonic oscillators above the fundamental
pub const HARMONIC_COUNT: usize = 5;
/// Engine voices: fundamental, harmonics, noise floor
pub const VOICE_COUNT: usize = HARMONIC_COUNT + 2;

/// Harmonic frequency multiples of the base frequency
pub const HARMONIC_RATIOS: [f32; HARMONIC_COUNT] = [2.0, 3.0, 4.0, 5.5, 8.0];
/// Relative harmonic levels, scaled by `FUNDAMENTAL_GAIN`
pub const HARMONIC_LEVELS: [f32; HARMONIC_COUNT] = [0.5, 0.4, 0.3, 0.2, 0.1];
/// Fundamental oscillator gain
pub const FUNDAMENTAL_GAIN: f32 = 0.15;
/// Engine noise floor gain at power-on and at zero RPM
pub const NOISE_FLOOR_GAIN: f32 = 0.05;
/// Base frequency the oscillators start at before the first update
pub const POWER_ON_FREQ: f32 = 80.0;

/// Simulation-side handle to the synthesizer
///
/// Every method is a fire-and-forget scalar write; nothing is queued.
pub struct AudioSynthesisEngine {
    params: Arc<SynthParams>,
    engine: EngineControls,
    brake: NoiseControls,
    tire: NoiseControls,
}

impl AudioSynthesisEngine {
    /// Build the control handle and its paired renderer
    ///
    /// All voices start silent. The renderer is `Send` and meant to be moved
    /// onto the audio thread (or driven offline).
    pub fn build(config: &AudioConfig) -> (Self, SynthRenderer) {
        let params = Arc::new(SynthParams::new(
            power_on_frequencies(),
            power_on_gains(),
            POWER_ON_FREQ,
        ));

        let mut seeds = match config.noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let detune_rng = StdRng::seed_from_u64(seeds.gen());
        let engine = EngineControls::new(Arc::clone(&params), detune_rng);
        let renderer = SynthRenderer::new(Arc::clone(&params), config, &mut seeds);

        let synth = AudioSynthesisEngine {
            brake: NoiseControls::new(Arc::clone(&params), NoiseChannel::Brake),
            tire: NoiseControls::new(Arc::clone(&params), NoiseChannel::Tire),
            engine,
            params,
        };
        (synth, renderer)
    }

    /// Set the fundamental and detuned harmonics from `base_freq`
    pub fn set_frequency(&mut self, base_freq: f32) {
        self.engine.set_frequency(base_freq);
    }

    /// Set the engine master gain
    pub fn set_volume(&self, volume: f32) {
        self.engine.set_volume(volume);
    }

    /// Rebalance harmonic and noise gains for `rpm`
    pub fn set_rpm(&self, rpm: f32) {
        self.engine.set_rpm(rpm);
    }

    /// Engine voice controls
    pub fn engine(&self) -> &EngineControls {
        &self.engine
    }

    /// Brake noise controls
    pub fn brake(&self) -> &NoiseControls {
        &self.brake
    }

    /// Tire squeal controls
    pub fn tire(&self) -> &NoiseControls {
        &self.tire
    }

    /// Shared parameter block (read-only view)
    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// Stop every oscillator and noise source
    pub fn stop(&self) {
        self.params.stop();
    }
}

fn power_on_frequencies() -> [f32; VOICE_COUNT - 1] {
    let mut freqs = [POWER_ON_FREQ; VOICE_COUNT - 1];
    for (freq, ratio) in freqs[1..].iter_mut().zip(HARMONIC_RATIOS) {
        *freq = POWER_ON_FREQ * ratio;
    }
    freqs
}

fn power_on_gains() -> [f32; VOICE_COUNT] {
    let mut gains = [0.0; VOICE_COUNT];
    gains[0] = FUNDAMENTAL_GAIN;
    for (gain, level) in gains[1..=HARMONIC_COUNT].iter_mut().zip(HARMONIC_LEVELS) {
        *gain = FUNDAMENTAL_GAIN * level;
    }
    gains[VOICE_COUNT - 1] = NOISE_FLOOR_GAIN;
    gains
}
