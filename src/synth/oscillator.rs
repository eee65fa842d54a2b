//! Band-limited sawtooth and square oscillators (PolyBLEP)

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Rising ramp from -1 to +1
    Sawtooth,
    /// 50% duty square
    Square,
}

/// Phase-accumulating oscillator; frequency is supplied per sample
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
    sample_rate: f32,
}

impl Oscillator {
    /// Create an oscillator at phase zero
    pub fn new(waveform: Waveform, sample_rate: f32) -> Self {
        Oscillator {
            waveform,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Waveform in use
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Produce one sample at `freq` Hz and advance the phase
    pub fn next_sample(&mut self, freq: f32) -> f32 {
        let inc = (freq / self.sample_rate).clamp(0.0, 0.5);
        let sample = match self.waveform {
            Waveform::Sawtooth => 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc),
            Waveform::Square => {
                let naive = if self.phase < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(self.phase, inc) - poly_blep((self.phase + 0.5) % 1.0, inc)
            }
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }
}

/// Polynomial band-limited step correction at phase `t` with increment `dt`
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count()
    }

    #[test]
    fn test_output_bounded() {
        for waveform in [Waveform::Sawtooth, Waveform::Square] {
            let mut osc = Oscillator::new(waveform, 44_100.0);
            for _ in 0..44_100 {
                let s = osc.next_sample(150.0);
                assert!(s.abs() <= 1.01, "{waveform:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn test_square_period_matches_frequency() {
        let mut osc = Oscillator::new(Waveform::Square, 44_100.0);
        let samples: Vec<f32> = (0..44_100).map(|_| osc.next_sample(100.0)).collect();
        let crossings = zero_crossings(&samples);
        assert!((99..=101).contains(&crossings), "got {crossings}");
    }

    #[test]
    fn test_zero_frequency_holds_phase() {
        let mut osc = Oscillator::new(Waveform::Sawtooth, 44_100.0);
        let first = osc.next_sample(0.0);
        let second = osc.next_sample(0.0);
        assert_eq!(first, -1.0);
        assert_eq!(first, second);
    }
}
