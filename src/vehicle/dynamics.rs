//! Longitudinal dynamics and steering
//!
//! Deltas are per tick, not per second: with `StepMode::FrameCoupled` the car
//! accelerates twice as fast at 120 fps as at 60 fps. `step_scale` lets the
//! caller normalize by elapsed time instead.

use super::VehicleState;
use crate::config::VehicleConfig;
use crate::input::Controls;

/// Move `value` toward zero by `amount` without crossing it
fn approach_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        0.0
    }
}

/// Integrates input into speed, heading and position
#[derive(Debug, Clone, Copy)]
pub struct VehicleDynamics {
    config: VehicleConfig,
}

impl VehicleDynamics {
    /// Create dynamics with the given tunables
    pub fn new(config: VehicleConfig) -> Self {
        VehicleDynamics { config }
    }

    /// Tunables in use
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Reverse top speed (half of forward)
    pub fn min_speed(&self) -> f32 {
        -self.config.max_speed / 2.0
    }

    /// Advance the vehicle by one tick
    pub fn tick(&self, state: &mut VehicleState, controls: Controls, step_scale: f32) {
        let cfg = &self.config;
        state.prev_speed = state.speed;

        let direction = controls.drive_direction();
        if direction != 0 {
            state.speed += f32::from(direction) * cfg.acceleration * step_scale;
            state.is_moving = true;
        } else {
            state.speed = approach_zero(state.speed, cfg.deceleration * step_scale);
        }

        let brake_held = controls.contains(Controls::BRAKE);
        state.is_braking = brake_held && state.speed.abs() > 1.0;
        if brake_held {
            state.speed = approach_zero(state.speed, cfg.brake_force * step_scale);
        }

        if direction == 0 && state.speed.abs() < cfg.stop_threshold {
            state.speed = 0.0;
            state.is_moving = false;
        }

        state.speed = state.speed.clamp(self.min_speed(), cfg.max_speed);

        if state.is_moving {
            // Reversing inverts the steering feel
            let sign = if state.speed < 0.0 { -1.0 } else { 1.0 };
            let turn = cfg.handling * sign * step_scale;
            if controls.contains(Controls::LEFT) {
                state.heading += turn;
            }
            if controls.contains(Controls::RIGHT) {
                state.heading -= turn;
            }
        }

        let move_distance = state.speed * cfg.distance_scale * step_scale;
        state.position[0] += state.heading.sin() * move_distance;
        state.position[2] += state.heading.cos() * move_distance;
    }
}

impl Default for VehicleDynamics {
    fn default() -> Self {
        Self::new(VehicleConfig::default())
    }
}
