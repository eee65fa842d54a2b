//! Offline rendering and export
//!
//! A [`DriveScript`] replays timed key holds through a [`Simulation`] on a
//! fixed-rate clock, producing a [`Recording`]: the audio rendered alongside
//! every tick report. The audio can be written as WAV, the reports as CSV.
//!
//! # Examples
//!
//! ```no_run
//! use drivetone::export::{export_to_wav, record_drive, write_trace, DriveScript, ExportConfig};
//! use drivetone::SimConfig;
//!
//! # fn main() -> drivetone::Result<()> {
//! let recording = record_drive(SimConfig::default(), &DriveScript::demo(), 60.0)?;
//! export_to_wav(&recording, "drive.wav", ExportConfig::default())?;
//! write_trace("drive.csv", &recording.ticks)?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Simulation`]: crate::Simulation

mod drive;
mod trace;
mod wav;

pub use drive::{record_drive, DriveScript, DriveSegment, Recording};
pub use trace::{write_trace, write_trace_to, TraceRow};
pub use wav::{export_to_wav, mono_to_stereo};

/// Export configuration options
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Whether to normalize audio to prevent clipping
    pub normalize: bool,
    /// Fade out duration in seconds (0 = no fade)
    pub fade_out_duration: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            normalize: true,
            fade_out_duration: 0.0,
        }
    }
}

impl ExportConfig {
    /// Create config for stereo export
    pub fn stereo() -> Self {
        Self {
            channels: 2,
            ..Default::default()
        }
    }

    /// Enable normalization to prevent clipping
    pub fn normalize(mut self, enable: bool) -> Self {
        self.normalize = enable;
        self
    }

    /// Add fade out at the end
    pub fn fade_out(mut self, duration_seconds: f32) -> Self {
        self.fade_out_duration = duration_seconds;
        self
    }
}

/// Scale samples down so the peak sits at 0.95
fn normalize_samples(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 0.95 {
        let scale = 0.95 / peak;
        for sample in samples.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Linear fade to silence over the last `fade_duration` seconds
fn apply_fade_out(samples: &mut [f32], fade_duration: f32, sample_rate: u32) {
    if fade_duration <= 0.0 || samples.is_empty() {
        return;
    }

    let fade_samples = ((fade_duration * sample_rate as f32) as usize).max(1);
    let start_fade = samples.len().saturating_sub(fade_samples);

    for (i, sample) in samples.iter_mut().enumerate().skip(start_fade) {
        let progress = (i - start_fade + 1) as f32 / fade_samples as f32;
        *sample *= 1.0 - progress.min(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_samples() {
        let mut samples = vec![0.5, 1.5, -1.2, 0.8];
        normalize_samples(&mut samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(peak <= 0.951);

        let mut quiet = vec![0.1, -0.2];
        normalize_samples(&mut quiet);
        assert_eq!(quiet, vec![0.1, -0.2]);
    }

    #[test]
    fn test_fade_out() {
        let mut samples = vec![1.0; 1000];
        apply_fade_out(&mut samples, 0.01, 44100); // 441 samples
        assert_eq!(samples[0], 1.0);
        assert_eq!(samples[558], 1.0);
        assert!(samples[800] < 1.0);
        assert_eq!(samples[999], 0.0);
    }

    #[test]
    fn test_export_config_builder() {
        let config = ExportConfig::stereo().normalize(false).fade_out(2.0);
        assert_eq!(config.channels, 2);
        assert!(!config.normalize);
        assert_eq!(config.fade_out_duration, 2.0);
    }
}
