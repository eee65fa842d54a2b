//! Wave-shaper distortion with 4× oversampling
//!
//! The transfer curve is sampled into a table and looked up with linear
//! interpolation; inputs beyond ±1 use the end points. Oversampling
//! zero-stuffs to four times the rate, low-passes, shapes, low-passes again
//! and keeps every fourth sample.

use std::f32::consts::PI;

use super::filter::Biquad;

/// Distortion amount used by the engine chain
pub const ENGINE_DRIVE: f32 = 50.0;
/// Points in the transfer curve
pub const CURVE_POINTS: usize = 44_100;
/// Oversampling factor
pub const OVERSAMPLE: usize = 4;

/// Transfer curve `((3 + k)·x·20°) / (π + k·|x|)` over `x ∈ [-1, 1)`
pub fn distortion_curve(k: f32, points: usize) -> Vec<f32> {
    let deg = PI / 180.0;
    (0..points)
        .map(|i| {
            let x = (i as f32 * 2.0) / points as f32 - 1.0;
            ((3.0 + k) * x * 20.0 * deg) / (PI + k * x.abs())
        })
        .collect()
}

/// Oversampled table wave shaper
#[derive(Debug, Clone)]
pub struct WaveShaper {
    curve: Vec<f32>,
    upsample: [Biquad; 2],
    downsample: [Biquad; 2],
}

impl WaveShaper {
    /// Shaper with the given curve, running at `sample_rate`
    pub fn new(curve: Vec<f32>, sample_rate: f32) -> Self {
        let os_rate = sample_rate * OVERSAMPLE as f32;
        let cutoff = sample_rate * 0.45;
        let lp = Biquad::lowpass(cutoff, 0.707, os_rate);
        WaveShaper {
            curve,
            upsample: [lp; 2],
            downsample: [lp; 2],
        }
    }

    /// Shaper with the engine curve
    pub fn engine(sample_rate: f32) -> Self {
        Self::new(distortion_curve(ENGINE_DRIVE, CURVE_POINTS), sample_rate)
    }

    /// Table lookup without oversampling
    pub fn shape(&self, x: f32) -> f32 {
        // inverse of the table's x = 2i/n - 1, so silence maps to exactly 0
        let last = self.curve.len() - 1;
        let pos = (x + 1.0) * 0.5 * self.curve.len() as f32;
        if pos <= 0.0 {
            return self.curve[0];
        }
        if pos >= last as f32 {
            return self.curve[last];
        }
        let idx = pos as usize;
        let frac = pos - idx as f32;
        self.curve[idx] + (self.curve[idx + 1] - self.curve[idx]) * frac
    }

    /// Shape one sample through the oversampling path
    pub fn process(&mut self, x: f32) -> f32 {
        let mut out = 0.0;
        for phase in 0..OVERSAMPLE {
            let stuffed = if phase == 0 { x * OVERSAMPLE as f32 } else { 0.0 };
            let up = self
                .upsample
                .iter_mut()
                .fold(stuffed, |acc, lp| lp.process(acc));
            let shaped = self.shape(up);
            let down = self
                .downsample
                .iter_mut()
                .fold(shaped, |acc, lp| lp.process(acc));
            if phase == 0 {
                out = down;
            }
        }
        out
    }
}
