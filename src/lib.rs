//! Procedurally sonified vehicle simulation
//!
//! Simulates the longitudinal dynamics and transmission of a single car and
//! drives a purpose-built synthesizer from that state every frame. No samples
//! are played back: the engine voice is an oscillator bank with a filtered
//! noise floor, and brake/tire sounds are band-passed white noise.
//!
//! # Features
//! - Frame-coupled vehicle dynamics (throttle, reverse, braking, coasting, steering)
//! - Six-gear shift state machine with up/down-shift hysteresis
//! - Per-gear RPM estimation with a transient shift dip
//! - Engine synthesizer: fundamental + 5 harmonics + noise, wave-shaper, compressor
//! - Lock-free single-writer parameter handoff to the audio rendering path
//! - Lazy, idempotent audio initialization gated on a user gesture
//! - Offline WAV rendering and per-tick CSV telemetry
//!
//! # Crate feature flags
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Headless simulation
//! ```no_run
//! use drivetone::{Controls, InputSnapshot, OfflineBackend, SimConfig, Simulation};
//! use drivetone::timing::FrameClock;
//!
//! let config = SimConfig::default();
//! let mut sim = Simulation::new(config, OfflineBackend::new());
//! sim.user_gesture().unwrap();
//!
//! let mut clock = FrameClock::fixed(60.0);
//! let mut input = InputSnapshot::new();
//! input.press("w");
//! for _ in 0..600 {
//!     let report = sim.tick(clock.next_frame(), &input);
//!     let _pcm = sim.backend_mut().render_frame(report.time.dt_ms);
//! }
//! assert!(sim.vehicle().gear >= 1);
//! # let _ = Controls::THROTTLE;
//! ```
//!
//! ## Real-time streaming
//! ```no_run
//! # #[cfg(feature = "streaming")]
//! # {
//! use drivetone::{AudioDevice, SimConfig, Simulation, StreamConfig};
//! let config = SimConfig::default();
//! let device = AudioDevice::new(StreamConfig::from_audio(&config.audio));
//! let mut sim = Simulation::new(config, device);
//! sim.user_gesture().unwrap(); // first key press or click
//! # }
//! ```

#![warn(missing_docs)]

pub mod config; // Tunables and JSON configuration
pub mod export; // WAV and telemetry export
pub mod input; // Input snapshot and key mapping
pub mod sim; // Per-tick pipeline
pub mod sonify; // Simulation-to-synth bridge
pub mod streaming; // Audio Output & Streaming
pub mod synth; // Procedural synthesis engine
pub mod timing; // Frame clock
pub mod vehicle; // Dynamics, gearbox, RPM

/// Error types for simulation and audio operations
#[derive(thiserror::Error, Debug)]
pub enum DrivetoneError {
    /// Invalid or unreadable configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Audio device could not be opened or driven
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// IO error from filesystem or terminal
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Telemetry trace error
    #[error("Trace error: {0}")]
    Trace(#[from] csv::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for DrivetoneError {
    /// Converts a String into `DrivetoneError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `AudioDeviceError`, ...) where the
    /// failure has a clear category; this conversion exists for ad hoc `format!` errors.
    fn from(msg: String) -> Self {
        DrivetoneError::Other(msg)
    }
}

impl From<&str> for DrivetoneError {
    /// Converts a string slice into `DrivetoneError::Other`.
    fn from(msg: &str) -> Self {
        DrivetoneError::Other(msg.to_string())
    }
}

/// Result type for simulation and audio operations
pub type Result<T> = std::result::Result<T, DrivetoneError>;

// Public API exports
pub use config::{AudioConfig, SimConfig, StepMode, VehicleConfig};
pub use input::{Controls, InputSnapshot, KeyLatch};
pub use sim::{HudReadout, Simulation, TickReport};
pub use sonify::{Sonifier, SoundSystem};
#[cfg(feature = "streaming")]
pub use streaming::AudioDevice;
pub use streaming::{AudioBackend, OfflineBackend, StreamConfig};
pub use synth::{AudioSynthesisEngine, EngineControls, NoiseControls, SynthRenderer};
pub use timing::{FrameClock, FrameTime};
pub use vehicle::{GearBox, Pose, RpmEstimator, RpmReading, VehicleDynamics, VehicleState};
