//! Vehicle state to synthesizer parameter mapping

use crate::input::Controls;
use crate::synth::AudioSynthesisEngine;
use crate::vehicle::rpm::{IDLE_RPM, MAX_RPM};
use crate::vehicle::{RpmReading, VehicleState};

/// Engine pitch at idle and at the bottom of the RPM range
pub const BASE_FREQ_HZ: f32 = 30.0;
/// Pitch span added between 0 RPM and `MAX_RPM`
pub const FREQ_SPAN_HZ: f32 = 120.0;
/// Engine master gain while idling
pub const IDLE_VOLUME: f32 = 0.05;
/// Loudness multiplier while speed is rising
pub const ACCEL_BIAS: f32 = 1.2;
/// Loudness multiplier while speed is falling
pub const DECEL_BIAS: f32 = 0.8;
/// Brake noise ceiling
pub const MAX_BRAKE_VOLUME: f32 = 0.3;
/// Speed above which brakes are audible
pub const BRAKE_MIN_SPEED: f32 = 10.0;
/// Tire squeal ceiling
pub const MAX_TIRE_VOLUME: f32 = 0.2;
/// Speed above which cornering squeals
pub const TIRE_MIN_SPEED: f32 = 50.0;

/// Engine pitch for an RPM value; 30–150 Hz over the whole RPM range
pub fn engine_frequency(rpm: f32) -> f32 {
    BASE_FREQ_HZ + (rpm / MAX_RPM) * FREQ_SPAN_HZ
}

/// Parameter values pushed to the synthesizer for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundLevels {
    /// Engine base frequency in Hz
    pub engine_freq: f32,
    /// Engine master gain
    pub engine_volume: f32,
    /// RPM driving the timbre balance
    pub engine_rpm: f32,
    /// Brake noise gain
    pub brake_volume: f32,
    /// Tire squeal gain
    pub tire_volume: f32,
}

/// Computes and applies per-tick sound levels
#[derive(Debug, Clone, Copy)]
pub struct Sonifier {
    max_speed: f32,
}

impl Sonifier {
    /// Sonifier for a car with the given top speed
    pub fn new(max_speed: f32) -> Self {
        Sonifier { max_speed }
    }

    /// Sound levels for the current state, without touching the synth
    pub fn levels(&self, state: &VehicleState, rpm: &RpmReading, controls: Controls) -> SoundLevels {
        let abs_speed = state.abs_speed();
        let speed_factor = abs_speed / self.max_speed;

        let (engine_freq, engine_volume, engine_rpm) = if rpm.idle {
            (BASE_FREQ_HZ, IDLE_VOLUME, IDLE_RPM)
        } else {
            let base = 0.05 + speed_factor * 0.2;
            let volume = if state.is_accelerating() {
                base * ACCEL_BIAS
            } else if state.is_decelerating() {
                base * DECEL_BIAS
            } else {
                base
            };
            (engine_frequency(rpm.rpm), volume, rpm.rpm)
        };

        let brake_volume = if state.is_braking && abs_speed > BRAKE_MIN_SPEED {
            (speed_factor * MAX_BRAKE_VOLUME).min(MAX_BRAKE_VOLUME)
        } else {
            0.0
        };

        let tire_volume = if state.is_moving && controls.is_turning() && abs_speed > TIRE_MIN_SPEED
        {
            (speed_factor * MAX_TIRE_VOLUME).min(MAX_TIRE_VOLUME)
        } else {
            0.0
        };

        SoundLevels {
            engine_freq,
            engine_volume,
            engine_rpm,
            brake_volume,
            tire_volume,
        }
    }

    /// Push `levels` into the synthesizer
    pub fn apply(&self, synth: &mut AudioSynthesisEngine, levels: &SoundLevels) {
        synth.set_frequency(levels.engine_freq);
        synth.set_volume(levels.engine_volume);
        synth.set_rpm(levels.engine_rpm);
        synth.brake().set_volume(levels.brake_volume);
        synth.tire().set_volume(levels.tire_volume);
    }
}

impl Default for Sonifier {
    fn default() -> Self {
        Self::new(200.0)
    }
}
