//! Feed-forward soft-knee compressor

/// Mono dynamics compressor with a peak envelope follower
#[derive(Debug, Clone)]
pub struct Compressor {
    /// Threshold in dB
    pub threshold_db: f32,
    /// Knee width in dB
    pub knee_db: f32,
    /// Compression ratio (12.0 = 12:1)
    pub ratio: f32,
    attack_coef: f32,
    release_coef: f32,
    envelope: f32,
}

impl Compressor {
    /// Compressor with explicit settings; times in seconds
    pub fn new(
        sample_rate: f32,
        threshold_db: f32,
        knee_db: f32,
        ratio: f32,
        attack: f32,
        release: f32,
    ) -> Self {
        Compressor {
            threshold_db,
            knee_db,
            ratio: ratio.max(1.0),
            attack_coef: (-1.0 / (attack * sample_rate)).exp(),
            release_coef: (-1.0 / (release * sample_rate)).exp(),
            envelope: 0.0,
        }
    }

    /// Engine bus settings: -24 dB, 30 dB knee, 12:1, 3 ms / 250 ms
    pub fn engine(sample_rate: f32) -> Self {
        Self::new(sample_rate, -24.0, 30.0, 12.0, 0.003, 0.25)
    }

    fn linear_to_db(linear: f32) -> f32 {
        if linear <= 1e-6 {
            -120.0
        } else {
            20.0 * linear.log10()
        }
    }

    /// Gain change in dB (≤ 0) for a detector level
    pub fn gain_reduction_db(&self, input_db: f32) -> f32 {
        let slope = 1.0 - 1.0 / self.ratio;
        let half_knee = self.knee_db / 2.0;
        let knee_start = self.threshold_db - half_knee;

        if self.knee_db <= 0.0 {
            return if input_db <= self.threshold_db {
                0.0
            } else {
                (self.threshold_db - input_db) * slope
            };
        }

        if input_db <= knee_start {
            0.0
        } else if input_db >= self.threshold_db + half_knee {
            (self.threshold_db - input_db) * slope
        } else {
            let over = input_db - knee_start;
            -slope * over * over / (2.0 * self.knee_db)
        }
    }

    /// Compress one sample
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let level = x.abs();
        let coef = if level > self.envelope {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope = coef * self.envelope + (1.0 - coef) * level;

        let gain_db = self.gain_reduction_db(Self::linear_to_db(self.envelope));
        x * 10f32.powf(gain_db / 20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_no_reduction_below_knee() {
        let comp = Compressor::engine(44_100.0);
        assert_eq!(comp.gain_reduction_db(-60.0), 0.0);
        assert_eq!(comp.gain_reduction_db(-39.0), 0.0);
    }

    #[test]
    fn test_full_ratio_above_knee() {
        let comp = Compressor::engine(44_100.0);
        // 15 dB over threshold at 12:1 leaves 1.25 dB
        assert_abs_diff_eq!(comp.gain_reduction_db(-9.0), -13.75, epsilon = 1e-3);
    }

    #[test]
    fn test_knee_is_continuous() {
        let comp = Compressor::engine(44_100.0);
        let edge = -24.0 + 15.0;
        let inside = comp.gain_reduction_db(edge - 1e-3);
        let outside = comp.gain_reduction_db(edge + 1e-3);
        assert_abs_diff_eq!(inside, outside, epsilon = 1e-2);
    }

    #[test]
    fn test_loud_signal_is_reduced() {
        let mut comp = Compressor::engine(44_100.0);
        let mut last = 0.0;
        for _ in 0..10_000 {
            last = comp.process(0.9);
        }
        assert!(last < 0.2, "got {last}");
        assert!(last > 0.0);
    }

    #[test]
    fn test_quiet_signal_passes() {
        let mut comp = Compressor::engine(44_100.0);
        let mut last = 0.0;
        for _ in 0..10_000 {
            last = comp.process(0.005);
        }
        assert_abs_diff_eq!(last, 0.005, epsilon = 1e-4);
    }
}
