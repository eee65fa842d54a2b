//! RPM estimation
//!
//! Each gear spans `MIN_RPM..MAX_RPM` over its own speed range
//! (`max_speed * GEAR_RATIOS[gear]`). For `SHIFT_DIP_MS` after a gear change
//! the reading is pulled down by `1 - 0.3 * exp(-t / 100ms)`.

use super::VehicleState;

/// Fraction of `max_speed` each gear reaches at `MAX_RPM` (index 0 unused)
pub const GEAR_RATIOS: [f32; 7] = [0.0, 0.9, 0.7, 0.5, 0.35, 0.25, 0.2];

/// RPM at the bottom of every gear
pub const MIN_RPM: f32 = 1_000.0;
/// RPM at the top of every gear
pub const MAX_RPM: f32 = 12_000.0;
/// Reported RPM at a standstill
pub const IDLE_RPM: f32 = 800.0;
/// Speed at or below which the engine idles
pub const IDLE_SPEED: f32 = 0.1;

/// Duration of the shift dip
pub const SHIFT_DIP_MS: f64 = 300.0;
/// Time constant of the shift dip recovery
pub const SHIFT_DIP_TAU_MS: f64 = 100.0;
/// Depth of the shift dip at the instant of the change
pub const SHIFT_DIP_DEPTH: f32 = 0.3;

/// RPM computed for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpmReading {
    /// RPM after shift-dip shaping (drives the audio)
    pub rpm: f32,
    /// RPM before shaping (stored per gear)
    pub undamped: f32,
    /// The engine is idling
    pub idle: bool,
}

impl RpmReading {
    /// Fixed idle reading
    pub fn idle() -> Self {
        RpmReading {
            rpm: IDLE_RPM,
            undamped: IDLE_RPM,
            idle: true,
        }
    }
}

/// Shift-dip multiplier `t` milliseconds after a gear change
pub fn shift_dip_factor(t_ms: f64) -> f32 {
    if (0.0..SHIFT_DIP_MS).contains(&t_ms) {
        1.0 - (-t_ms / SHIFT_DIP_TAU_MS).exp() as f32 * SHIFT_DIP_DEPTH
    } else {
        1.0
    }
}

/// Derives engine RPM from gear and speed
#[derive(Debug, Clone, Copy)]
pub struct RpmEstimator {
    max_speed: f32,
}

impl RpmEstimator {
    /// Create an estimator for a car with the given top speed
    pub fn new(max_speed: f32) -> Self {
        RpmEstimator { max_speed }
    }

    /// Undamped RPM for `gear` at `abs_speed`
    pub fn gear_rpm(&self, gear: u8, abs_speed: f32) -> f32 {
        let gear_top_speed = self.max_speed * GEAR_RATIOS[usize::from(gear)];
        let gear_speed_factor = (abs_speed / gear_top_speed).clamp(0.0, 1.0);
        MIN_RPM + gear_speed_factor * (MAX_RPM - MIN_RPM)
    }

    /// Compute this tick's RPM and record it for the active gear
    pub fn update(&self, state: &mut VehicleState, now_ms: f64) -> RpmReading {
        let abs_speed = state.abs_speed();
        if abs_speed <= IDLE_SPEED {
            return RpmReading::idle();
        }

        let undamped = self.gear_rpm(state.gear, abs_speed);
        state.rpm_per_gear[usize::from(state.gear)] = undamped;

        let factor = state
            .ms_since_gear_change(now_ms)
            .map_or(1.0, shift_dip_factor);

        RpmReading {
            rpm: undamped * factor,
            undamped,
            idle: false,
        }
    }
}

impl Default for RpmEstimator {
    fn default() -> Self {
        Self::new(200.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gear_rpm_range() {
        let est = RpmEstimator::default();
        assert_relative_eq!(est.gear_rpm(1, 0.0), MIN_RPM);
        assert_relative_eq!(est.gear_rpm(1, 180.0), MAX_RPM, epsilon = 0.01);
        assert_relative_eq!(est.gear_rpm(1, 500.0), MAX_RPM);
        // 4th gear tops out at 70
        assert_relative_eq!(est.gear_rpm(4, 35.0), 6_500.0, epsilon = 0.01);
    }

    #[test]
    fn test_idle_reports_fixed_rpm() {
        let est = RpmEstimator::default();
        let mut state = VehicleState::new();
        let reading = est.update(&mut state, 0.0);
        assert_eq!(reading.rpm, 800.0);
        assert!(reading.idle);
        assert_eq!(state.rpm_per_gear, [0.0; 7]);
    }

    #[test]
    fn test_rpm_stored_per_gear() {
        let est = RpmEstimator::default();
        let mut state = VehicleState::new();
        state.speed = 90.0;
        state.gear = 2;
        let reading = est.update(&mut state, 0.0);
        assert_relative_eq!(state.rpm_per_gear[2], reading.undamped);
        assert_eq!(state.rpm_per_gear[1], 0.0);
    }

    #[test]
    fn test_shift_dip_at_change_instant() {
        let est = RpmEstimator::default();
        let mut state = VehicleState::new();
        state.speed = 40.0;
        state.gear = 2;
        state.gear_change_ms = Some(5_000.0);
        let reading = est.update(&mut state, 5_000.0);
        assert_relative_eq!(reading.rpm, reading.undamped * 0.7, epsilon = 1e-3);
    }

    #[test]
    fn test_shift_dip_recovers() {
        assert_relative_eq!(shift_dip_factor(0.0), 0.7, epsilon = 1e-6);
        assert!(shift_dip_factor(100.0) > 0.88 && shift_dip_factor(100.0) < 0.9);
        assert!(shift_dip_factor(299.0) > 0.98);
        assert_eq!(shift_dip_factor(300.0), 1.0);
        assert_eq!(shift_dip_factor(10_000.0), 1.0);
    }

    #[test]
    fn test_no_dip_before_first_change() {
        let est = RpmEstimator::default();
        let mut state = VehicleState::new();
        state.speed = 20.0;
        let reading = est.update(&mut state, 10.0);
        assert_eq!(reading.rpm, reading.undamped);
    }
}
