//! Simulation configuration
//!
//! All tunables are plain data with serde support so a run can be reproduced
//! from a JSON file. Nothing here is validated: out-of-range values are a
//! caller error, not a runtime fault.

use crate::{DrivetoneError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Vehicle tunables (units: km/h-equivalent per tick, radians per tick)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Forward top speed; reverse top speed is half of this
    pub max_speed: f32,
    /// Speed gained per tick while throttle (or reverse) is held
    pub acceleration: f32,
    /// Speed shed per tick while coasting
    pub deceleration: f32,
    /// Extra speed shed per tick while the brake is held
    pub brake_force: f32,
    /// Heading change per tick while steering
    pub handling: f32,
    /// World units travelled per speed unit per tick
    pub distance_scale: f32,
    /// Coasting speed below which the car snaps to a standstill
    pub stop_threshold: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleConfig {
            max_speed: 200.0,
            acceleration: 0.2,
            deceleration: 0.1,
            brake_force: 0.8,
            handling: 0.03,
            distance_scale: 0.01,
            stop_threshold: 0.1,
        }
    }
}

/// Synthesis engine settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Frames rendered between two parameter reads
    pub render_quantum: usize,
    /// Seed for noise buffers and harmonic detune (`None` = entropy)
    pub noise_seed: Option<u64>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            sample_rate: 44_100,
            render_quantum: 128,
            noise_seed: None,
        }
    }
}

/// How per-tick deltas relate to elapsed time
///
/// `FrameCoupled` applies every tunable once per tick regardless of the frame
/// duration, so the car accelerates faster on a faster display. `Normalized`
/// scales each delta by `dt / (1 / reference_hz)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StepMode {
    /// One full delta per tick (frame-rate-dependent)
    #[default]
    FrameCoupled,
    /// Deltas scaled to a reference tick rate
    Normalized {
        /// Tick rate at which a delta is applied verbatim
        reference_hz: f32,
    },
}

impl StepMode {
    /// Multiplier applied to per-tick deltas for a frame lasting `dt_ms`
    pub fn scale(&self, dt_ms: f64) -> f32 {
        match *self {
            StepMode::FrameCoupled => 1.0,
            StepMode::Normalized { reference_hz } => {
                (dt_ms * f64::from(reference_hz) / 1000.0) as f32
            }
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    /// Vehicle tunables
    pub vehicle: VehicleConfig,
    /// Audio engine settings
    pub audio: AudioConfig,
    /// Timestep handling
    pub step: StepMode,
}

impl SimConfig {
    /// Parse a configuration from JSON text; missing fields take defaults
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            DrivetoneError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_reference_tuning() {
        let cfg = VehicleConfig::default();
        assert_eq!(cfg.max_speed, 200.0);
        assert_eq!(cfg.acceleration, 0.2);
        assert_eq!(cfg.deceleration, 0.1);
        assert_eq!(cfg.brake_force, 0.8);
        assert_eq!(cfg.handling, 0.03);
        assert_eq!(cfg.distance_scale, 0.01);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let cfg = SimConfig::from_json_str(r#"{ "vehicle": { "max_speed": 300.0 } }"#).unwrap();
        assert_eq!(cfg.vehicle.max_speed, 300.0);
        assert_eq!(cfg.vehicle.acceleration, 0.2);
        assert_eq!(cfg.audio.sample_rate, 44_100);
        assert_eq!(cfg.step, StepMode::FrameCoupled);
    }

    #[test]
    fn test_normalized_step_json() {
        let cfg =
            SimConfig::from_json_str(r#"{ "step": { "mode": "normalized", "reference_hz": 60.0 } }"#)
                .unwrap();
        assert_eq!(cfg.step, StepMode::Normalized { reference_hz: 60.0 });
    }

    #[test]
    fn test_json_roundtrip() {
        let mut cfg = SimConfig::default();
        cfg.audio.noise_seed = Some(7);
        let text = cfg.to_json_pretty().unwrap();
        assert_eq!(SimConfig::from_json_str(&text).unwrap(), cfg);
    }

    #[test]
    fn test_step_scale() {
        assert_eq!(StepMode::FrameCoupled.scale(33.3), 1.0);
        let normalized = StepMode::Normalized { reference_hz: 60.0 };
        assert_relative_eq!(normalized.scale(1000.0 / 60.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(normalized.scale(1000.0 / 30.0), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SimConfig::from_json_file("/nonexistent/drivetone.json").unwrap_err();
        assert!(matches!(err, DrivetoneError::ConfigError(_)));
    }
}
