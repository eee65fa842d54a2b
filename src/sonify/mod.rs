//! Sonification
//!
//! [`SoundSystem`] owns the synthesizer and the audio backend. Audio is not
//! created until the host reports a user gesture (platforms refuse to start
//! output before one); until then every tick is silent and cheap.
//! [`Sonifier`] maps the vehicle state to synthesizer parameters.

pub mod bridge;

pub use bridge::{engine_frequency, SoundLevels, Sonifier};

use crate::config::AudioConfig;
use crate::streaming::AudioBackend;
use crate::synth::AudioSynthesisEngine;
use crate::Result;

/// Lazily initialized synthesizer plus output backend
pub struct SoundSystem<B: AudioBackend> {
    config: AudioConfig,
    backend: B,
    synth: Option<AudioSynthesisEngine>,
    stopped: bool,
}

impl<B: AudioBackend> SoundSystem<B> {
    /// Uninitialized sound system; no audio is touched
    pub fn new(config: AudioConfig, backend: B) -> Self {
        SoundSystem {
            config,
            backend,
            synth: None,
            stopped: false,
        }
    }

    /// Create the synthesizer and open the backend on the first gesture
    ///
    /// Further calls after a success are no-ops. A failed attempt leaves the
    /// system uninitialized, so a later gesture retries.
    pub fn init_on_gesture(&mut self) -> Result<()> {
        if self.synth.is_some() || self.stopped {
            return Ok(());
        }

        let (synth, renderer) = AudioSynthesisEngine::build(&self.config);
        if let Err(e) = self.backend.open(renderer) {
            tracing::warn!(error = %e, "audio initialization failed");
            return Err(e);
        }

        tracing::info!(
            sample_rate = self.config.sample_rate,
            quantum = self.config.render_quantum,
            "sounds initialized"
        );
        self.synth = Some(synth);
        Ok(())
    }

    /// Audio has been initialized and not stopped
    pub fn is_initialized(&self) -> bool {
        self.synth.is_some() && !self.stopped
    }

    /// Synthesizer, once initialized
    pub fn synth(&self) -> Option<&AudioSynthesisEngine> {
        self.synth.as_ref()
    }

    /// Mutable synthesizer, once initialized and still running
    pub fn synth_mut(&mut self) -> Option<&mut AudioSynthesisEngine> {
        if self.stopped {
            return None;
        }
        self.synth.as_mut()
    }

    /// Output backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable output backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Stop all oscillators and close the backend; final
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(synth) = &self.synth {
            synth.stop();
            tracing::info!("sounds stopped");
        }
        self.backend.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::OfflineBackend;
    use crate::synth::SynthRenderer;
    use crate::DrivetoneError;

    /// Backend that refuses the first `failures` opens
    struct FlakyBackend {
        failures: usize,
        opens: usize,
        renderer: Option<SynthRenderer>,
    }

    impl AudioBackend for FlakyBackend {
        fn open(&mut self, renderer: SynthRenderer) -> Result<()> {
            self.opens += 1;
            if self.failures > 0 {
                self.failures -= 1;
                return Err(DrivetoneError::AudioDeviceError("no device".into()));
            }
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

    fn seeded() -> AudioConfig {
        AudioConfig {
            noise_seed: Some(1),
            ..AudioConfig::default()
        }
    }

    #[test]
    fn test_no_audio_before_gesture() {
        let sound = SoundSystem::new(seeded(), OfflineBackend::new());
        assert!(!sound.is_initialized());
        assert!(sound.synth().is_none());
        assert!(!sound.backend().is_open());
    }

    #[test]
    fn test_init_is_idempotent() {
        let backend = FlakyBackend {
            failures: 0,
            opens: 0,
            renderer: None,
        };
        let mut sound = SoundSystem::new(seeded(), backend);
        sound.init_on_gesture().unwrap();
        sound.init_on_gesture().unwrap();
        sound.init_on_gesture().unwrap();
        assert!(sound.is_initialized());
        assert_eq!(sound.backend().opens, 1);
    }

    #[test]
    fn test_failed_init_can_retry() {
        let backend = FlakyBackend {
            failures: 1,
            opens: 0,
            renderer: None,
        };
        let mut sound = SoundSystem::new(seeded(), backend);
        let err = sound.init_on_gesture().unwrap_err();
        assert!(matches!(err, DrivetoneError::AudioDeviceError(_)));
        assert!(!sound.is_initialized());

        sound.init_on_gesture().unwrap();
        assert!(sound.is_initialized());
        assert_eq!(sound.backend().opens, 2);
    }

    #[test]
    fn test_stop_is_final() {
        let mut sound = SoundSystem::new(seeded(), OfflineBackend::new());
        sound.init_on_gesture().unwrap();
        sound.stop();
        assert!(!sound.is_initialized());
        assert!(!sound.backend().is_open());
        assert!(sound.synth_mut().is_none());
        assert!(sound.synth().is_some_and(|s| !s.params().is_running()));

        sound.init_on_gesture().unwrap();
        assert!(!sound.backend().is_open());
        sound.stop();
    }
}
