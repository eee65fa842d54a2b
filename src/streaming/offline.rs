//! Pull-driven backend for headless runs
//!
//! Samples are produced only when asked for, so a fixed-rate frame clock and
//! `render_frame(dt_ms)` give a sample-accurate soundtrack of a scripted drive.

use super::{AudioBackend, DEFAULT_SAMPLE_RATE};
use crate::synth::SynthRenderer;
use crate::Result;

/// Renders on demand; silence until a renderer is attached
pub struct OfflineBackend {
    renderer: Option<SynthRenderer>,
    sample_rate: u32,
    /// Fractional samples carried between frames
    carry: f64,
    samples_rendered: u64,
}

impl OfflineBackend {
    /// Backend at the default sample rate
    pub fn new() -> Self {
        Self::with_sample_rate(DEFAULT_SAMPLE_RATE)
    }

    /// Backend producing silence at `sample_rate` until opened
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        OfflineBackend {
            renderer: None,
            sample_rate,
            carry: 0.0,
            samples_rendered: 0,
        }
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total samples produced so far, silence included
    pub fn samples_rendered(&self) -> u64 {
        self.samples_rendered
    }

    /// Render exactly `count` samples
    pub fn render(&mut self, count: usize) -> Vec<f32> {
        let mut out = vec![0.0; count];
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&mut out);
        }
        self.samples_rendered += count as u64;
        out
    }

    /// Render the samples covering `dt_ms` of wall time
    ///
    /// Fractions of a sample are carried over, so frames of 16.67 ms add up
    /// to exactly one second of audio per 60 frames.
    pub fn render_frame(&mut self, dt_ms: f64) -> Vec<f32> {
        let exact = dt_ms.max(0.0) * f64::from(self.sample_rate) / 1000.0 + self.carry;
        let count = exact.floor();
        self.carry = exact - count;
        self.render(count as usize)
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for OfflineBackend {
    fn open(&mut self, renderer: SynthRenderer) -> Result<()> {
        self.sample_rate = renderer.sample_rate();
        self.renderer = Some(renderer);
        Ok(())
    }

    fn close(&mut self) {
        self.renderer = None;
    }

    fn is_open(&self) -> bool {
        self.renderer.is_some()
    }
}
