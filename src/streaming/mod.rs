//! Audio output backends
//!
//! A backend receives the [`SynthRenderer`] once audio has been initialized
//! and is responsible for pulling samples from it. Two backends exist:
//! [`OfflineBackend`] renders on demand (tests, WAV export) and, with the
//! `streaming` feature, [`AudioDevice`] plays through the system device.

#[cfg(feature = "streaming")]
pub mod audio_device;
pub mod offline;

#[cfg(feature = "streaming")]
pub use audio_device::AudioDevice;
pub use offline::OfflineBackend;

use crate::config::AudioConfig;
use crate::synth::SynthRenderer;
use crate::Result;

/// Default sample rate (44.1 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Destination for rendered audio
pub trait AudioBackend {
    /// Take ownership of the renderer and start output
    ///
    /// Called at most once per successful initialization. On error the
    /// renderer is dropped and the caller may retry with a fresh one.
    fn open(&mut self, renderer: SynthRenderer) -> Result<()>;

    /// Stop output and release the renderer
    fn close(&mut self);

    /// A renderer is attached
    fn is_open(&self) -> bool;
}

/// Configuration for streaming playback
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Samples rendered per batch when the device asks for data
    /// Larger batches = more latency but fewer renderer wake-ups
    pub batch_size: usize,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of audio channels
    pub channels: u16,
}

impl StreamConfig {
    /// Create a streaming configuration optimized for low latency
    /// Batch = 512 samples ≈ 12ms @ 44.1kHz
    pub fn low_latency(sample_rate: u32) -> Self {
        StreamConfig {
            batch_size: 512,
            sample_rate,
            channels: 1,
        }
    }

    /// Interactive driving wants the controls to feel immediate
    pub fn from_audio(audio: &AudioConfig) -> Self {
        Self::low_latency(audio.sample_rate)
    }

    /// Get latency in milliseconds
    pub fn latency_ms(&self) -> f32 {
        ((self.batch_size as f32) / (self.sample_rate as f32)) * 1000.0
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::low_latency(DEFAULT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_latency() {
        let config = StreamConfig::low_latency(44100);
        let latency = config.latency_ms();
        assert!(latency > 11.0 && latency < 12.0);
    }

    #[test]
    fn test_stream_config_follows_audio_config() {
        let audio = AudioConfig {
            sample_rate: 48_000,
            ..AudioConfig::default()
        };
        let config = StreamConfig::from_audio(&audio);
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.channels, 1);
    }
}
