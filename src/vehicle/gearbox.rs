//! Gear-shift state machine
//!
//! Gear follows speed through a fixed threshold table, with two gates that
//! form the only hysteresis in the system:
//! - upshift only once the current gear has been revved to `UPSHIFT_RPM`
//! - downshift only after `DOWNSHIFT_DELAY_MS` and a `DOWNSHIFT_SPEED_DROP`
//!   loss of speed since the last change
//!
//! Either way the gear moves by at most one step per tick.

use super::{VehicleState, MAX_GEAR, MIN_GEAR};

/// Speed fraction of `max_speed` at which gears 1..=6 become the candidate
pub const GEAR_THRESHOLDS: [f32; 6] = [0.0, 0.15, 0.30, 0.45, 0.60, 0.75];

/// RPM the current gear must have reached before an upshift is accepted
pub const UPSHIFT_RPM: f32 = 10_000.0;

/// Minimum time between a gear change and a following downshift
pub const DOWNSHIFT_DELAY_MS: f64 = 500.0;

/// Speed that must be shed since the last change before a downshift
pub const DOWNSHIFT_SPEED_DROP: f32 = 10.0;

/// An accepted gear change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearShift {
    /// Gear before the change
    pub from: u8,
    /// Gear after the change
    pub to: u8,
    /// Time of the change in milliseconds
    pub at_ms: f64,
    /// `|speed|` at the change
    pub speed: f32,
}

impl GearShift {
    /// True for an upshift
    pub fn is_upshift(&self) -> bool {
        self.to > self.from
    }
}

/// Gear the threshold table asks for at `speed_percent` (no gating)
pub fn candidate_gear(speed_percent: f32) -> u8 {
    GEAR_THRESHOLDS
        .iter()
        .rposition(|&threshold| speed_percent >= threshold)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(MIN_GEAR)
}

/// Selects the active gear once per tick
#[derive(Debug, Clone, Copy)]
pub struct GearBox {
    max_speed: f32,
}

impl GearBox {
    /// Create a gearbox for a car with the given top speed
    pub fn new(max_speed: f32) -> Self {
        GearBox { max_speed }
    }

    /// Gear the gates allow this tick, without mutating state
    pub fn select(&self, state: &VehicleState, now_ms: f64) -> u8 {
        let gear = state.gear;
        let abs_speed = state.abs_speed();
        let mut target = candidate_gear(abs_speed / self.max_speed);

        if target > gear {
            let current_rpm = state.rpm_per_gear[usize::from(gear)];
            target = if current_rpm < UPSHIFT_RPM {
                gear
            } else {
                gear + 1
            };
        } else if target < gear {
            let settled = state
                .ms_since_gear_change(now_ms)
                .map_or(true, |elapsed| elapsed >= DOWNSHIFT_DELAY_MS);
            let speed_drop = state.last_gear_change_speed - abs_speed;
            target = if settled && speed_drop >= DOWNSHIFT_SPEED_DROP {
                gear - 1
            } else {
                gear
            };
        }

        target.clamp(MIN_GEAR, MAX_GEAR)
    }

    /// Apply gear selection and record the change edge
    ///
    /// Returns the shift when the gear changed this tick.
    pub fn update(&self, state: &mut VehicleState, now_ms: f64) -> Option<GearShift> {
        state.gear = self.select(state, now_ms);

        let shift = if state.gear != state.prev_gear {
            state.gear_change_ms = Some(now_ms);
            state.last_gear_change_speed = state.abs_speed();
            let shift = GearShift {
                from: state.prev_gear,
                to: state.gear,
                at_ms: now_ms,
                speed: state.last_gear_change_speed,
            };
            tracing::debug!(
                from = shift.from,
                to = shift.to,
                speed = shift.speed,
                "gear change"
            );
            Some(shift)
        } else {
            None
        };

        state.prev_gear = state.gear;
        shift
    }
}

impl Default for GearBox {
    fn default() -> Self {
        Self::new(200.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(speed: f32, gear: u8) -> VehicleState {
        let mut state = VehicleState::new();
        state.speed = speed;
        state.gear = gear;
        state.prev_gear = gear;
        state
    }

    #[test]
    fn test_candidate_gear_table() {
        assert_eq!(candidate_gear(0.0), 1);
        assert_eq!(candidate_gear(0.149), 1);
        assert_eq!(candidate_gear(0.15), 2);
        assert_eq!(candidate_gear(0.30), 3);
        assert_eq!(candidate_gear(0.45), 4);
        assert_eq!(candidate_gear(0.6), 5);
        assert_eq!(candidate_gear(0.75), 6);
        assert_eq!(candidate_gear(1.0), 6);
    }

    #[test]
    fn test_upshift_rejected_below_rpm_ceiling() {
        let gearbox = GearBox::default();
        let mut state = state_at(60.0, 2); // 0.3 → candidate 3
        state.rpm_per_gear[2] = 9_000.0;
        assert!(gearbox.update(&mut state, 1_000.0).is_none());
        assert_eq!(state.gear, 2);
    }

    #[test]
    fn test_upshift_accepted_at_rpm_ceiling() {
        let gearbox = GearBox::default();
        let mut state = state_at(60.0, 2);
        state.rpm_per_gear[2] = 10_000.0;
        let shift = gearbox.update(&mut state, 1_000.0).unwrap();
        assert_eq!(state.gear, 3);
        assert!(shift.is_upshift());
        assert_eq!(state.gear_change_ms, Some(1_000.0));
        assert_eq!(state.last_gear_change_speed, 60.0);
    }

    #[test]
    fn test_upshift_advances_one_gear_per_tick() {
        let gearbox = GearBox::default();
        let mut state = state_at(180.0, 1); // candidate 6
        state.rpm_per_gear = [0.0, 12_000.0, 12_000.0, 12_000.0, 12_000.0, 12_000.0, 12_000.0];
        gearbox.update(&mut state, 0.0);
        assert_eq!(state.gear, 2);
        gearbox.update(&mut state, 16.0);
        assert_eq!(state.gear, 3);
    }

    #[test]
    fn test_downshift_rejected_within_delay() {
        let gearbox = GearBox::default();
        let mut state = state_at(20.0, 4);
        state.gear_change_ms = Some(1_000.0);
        state.last_gear_change_speed = 100.0;
        gearbox.update(&mut state, 1_400.0);
        assert_eq!(state.gear, 4);
    }

    #[test]
    fn test_downshift_rejected_without_speed_drop() {
        let gearbox = GearBox::default();
        // 0.3 → candidate 3 while in 4th
        let mut state = state_at(60.0, 4);
        state.gear_change_ms = Some(0.0);
        state.last_gear_change_speed = 65.0;
        gearbox.update(&mut state, 5_000.0);
        assert_eq!(state.gear, 4);
    }

    #[test]
    fn test_downshift_one_gear_per_tick() {
        let gearbox = GearBox::default();
        let mut state = state_at(5.0, 5); // candidate 1
        state.gear_change_ms = Some(0.0);
        state.last_gear_change_speed = 150.0;
        let shift = gearbox.update(&mut state, 1_000.0).unwrap();
        assert_eq!(state.gear, 4);
        assert!(!shift.is_upshift());
        assert_eq!(state.last_gear_change_speed, 5.0);

        // The change just reset the gates
        gearbox.update(&mut state, 1_100.0);
        assert_eq!(state.gear, 4);
    }

    #[test]
    fn test_downshift_uses_absolute_speed() {
        let gearbox = GearBox::default();
        let mut state = state_at(-5.0, 2);
        state.gear_change_ms = Some(0.0);
        state.last_gear_change_speed = 40.0;
        gearbox.update(&mut state, 1_000.0);
        assert_eq!(state.gear, 1);
    }

    #[test]
    fn test_no_downshift_before_first_change() {
        // last_gear_change_speed starts at 0, so no speed has been "shed" yet
        let gearbox = GearBox::default();
        let mut state = state_at(0.0, 3);
        gearbox.update(&mut state, 10_000.0);
        assert_eq!(state.gear, 3);
    }

    #[test]
    fn test_prev_gear_tracks_gear() {
        let gearbox = GearBox::default();
        let mut state = state_at(60.0, 2);
        state.rpm_per_gear[2] = 11_000.0;
        gearbox.update(&mut state, 0.0);
        assert_eq!(state.prev_gear, 3);
        assert!(gearbox.update(&mut state, 16.0).is_none());
    }
}
