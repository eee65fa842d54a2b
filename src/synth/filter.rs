//! Second-order IIR filters (Audio EQ Cookbook coefficients)

use std::f32::consts::PI;

/// Biquad in transposed direct form II
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
    sample_rate: f32,
}

impl Biquad {
    fn passthrough(sample_rate: f32) -> Self {
        Biquad {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
            sample_rate,
        }
    }

    /// Band-pass with 0 dB peak gain at `center`
    pub fn bandpass(center: f32, q: f32, sample_rate: f32) -> Self {
        let mut f = Self::passthrough(sample_rate);
        f.set_bandpass(center, q);
        f
    }

    /// Low-pass at `cutoff`
    pub fn lowpass(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let mut f = Self::passthrough(sample_rate);
        let (alpha, cos_w0) = f.prewarp(cutoff, q);
        let b1 = 1.0 - cos_w0;
        f.set_coefficients(b1 * 0.5, b1, b1 * 0.5, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha);
        f
    }

    /// Retune a band-pass; filter memory is kept
    pub fn set_bandpass(&mut self, center: f32, q: f32) {
        let (alpha, cos_w0) = self.prewarp(center, q);
        self.set_coefficients(alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha);
    }

    fn prewarp(&self, freq: f32, q: f32) -> (f32, f32) {
        let nyquist = self.sample_rate * 0.5;
        let freq = freq.clamp(1.0, nyquist * 0.99);
        let w0 = 2.0 * PI * freq / self.sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        (sin_w0 / (2.0 * q.max(1e-3)), cos_w0)
    }

    fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    /// Filter one sample
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}
