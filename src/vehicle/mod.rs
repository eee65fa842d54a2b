//! Vehicle Domain
//!
//! One persistent car, mutated once per tick by three stages in a fixed order:
//! [`VehicleDynamics`] (speed, heading, position), [`GearBox`] (gear selection
//! with hysteresis) and [`RpmEstimator`] (per-gear RPM with shift dip).
//! All stages share a single owned [`VehicleState`] passed by reference.

pub mod dynamics;
pub mod gearbox;
pub mod rpm;

pub use dynamics::VehicleDynamics;
pub use gearbox::{GearBox, GearShift};
pub use rpm::{RpmEstimator, RpmReading};

/// Lowest gear
pub const MIN_GEAR: u8 = 1;
/// Highest gear
pub const MAX_GEAR: u8 = 6;

/// Position and orientation exposed to renderers and follow cameras
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World X
    pub x: f32,
    /// World Y (ground height, constant)
    pub y: f32,
    /// World Z
    pub z: f32,
    /// Heading in radians (unnormalized)
    pub heading: f32,
}

/// Complete simulated vehicle state
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// Signed speed, km/h-equivalent; negative while reversing
    pub speed: f32,
    /// Speed at the start of the current tick
    pub prev_speed: f32,
    /// Heading in radians
    pub heading: f32,
    /// World position `[x, y, z]`
    pub position: [f32; 3],
    /// Throttle/reverse engaged and not yet coasted to a stop
    pub is_moving: bool,
    /// Brake held while faster than 1 km/h
    pub is_braking: bool,
    /// Active gear, 1..=6
    pub gear: u8,
    /// Gear as of the previous tick (edge detection)
    pub prev_gear: u8,
    /// Time of the most recent gear change in milliseconds
    pub gear_change_ms: Option<f64>,
    /// `|speed|` captured at the most recent gear change
    pub last_gear_change_speed: f32,
    /// Most recent RPM computed in each gear (index 0 unused)
    pub rpm_per_gear: [f32; 7],
}

impl VehicleState {
    /// Standstill in first gear at the origin
    pub fn new() -> Self {
        VehicleState {
            speed: 0.0,
            prev_speed: 0.0,
            heading: 0.0,
            position: [0.0; 3],
            is_moving: false,
            is_braking: false,
            gear: MIN_GEAR,
            prev_gear: MIN_GEAR,
            gear_change_ms: None,
            last_gear_change_speed: 0.0,
            rpm_per_gear: [0.0; 7],
        }
    }

    /// Current pose for the render boundary
    pub fn pose(&self) -> Pose {
        Pose {
            x: self.position[0],
            y: self.position[1],
            z: self.position[2],
            heading: self.heading,
        }
    }

    /// Absolute speed
    pub fn abs_speed(&self) -> f32 {
        self.speed.abs()
    }

    /// Milliseconds since the last gear change, `None` before the first one
    pub fn ms_since_gear_change(&self, now_ms: f64) -> Option<f64> {
        self.gear_change_ms.map(|t| now_ms - t)
    }

    /// Speed increased during the current tick
    pub fn is_accelerating(&self) -> bool {
        self.speed > self.prev_speed
    }

    /// Speed decreased during the current tick
    pub fn is_decelerating(&self) -> bool {
        self.speed < self.prev_speed
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = VehicleState::new();
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.gear, 1);
        assert_eq!(state.prev_gear, 1);
        assert!(state.gear_change_ms.is_none());
        assert_eq!(state.rpm_per_gear, [0.0; 7]);
        assert_eq!(state.pose(), Pose::default());
    }

    #[test]
    fn test_acceleration_flags() {
        let mut state = VehicleState::new();
        state.prev_speed = 10.0;
        state.speed = 10.2;
        assert!(state.is_accelerating());
        state.speed = 9.9;
        assert!(state.is_decelerating());
        state.speed = 10.0;
        assert!(!state.is_accelerating() && !state.is_decelerating());
    }
}
