//! Per-tick simulation pipeline
//!
//! One [`Simulation::tick`] per display frame runs, in order:
//! input snapshot → dynamics → gearbox → RPM → sonification.
//! The vehicle state is owned here and lent to each stage in turn.

use std::fmt;

use crate::config::SimConfig;
use crate::input::{Controls, InputSnapshot};
use crate::sonify::{SoundLevels, SoundSystem, Sonifier};
use crate::streaming::AudioBackend;
use crate::timing::FrameTime;
use crate::vehicle::{
    GearBox, GearShift, Pose, RpmEstimator, RpmReading, VehicleDynamics, VehicleState,
};
use crate::Result;

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Frame time the tick ran at
    pub time: FrameTime,
    /// Controls decoded from the input snapshot
    pub controls: Controls,
    /// Signed speed after the tick
    pub speed: f32,
    /// Gear after the tick
    pub gear: u8,
    /// Gear change accepted this tick
    pub shift: Option<GearShift>,
    /// Engine RPM
    pub rpm: RpmReading,
    /// Sound levels computed for this tick
    pub levels: SoundLevels,
    /// The levels reached a live synthesizer
    pub audible: bool,
    /// Pose for renderers
    pub pose: Pose,
}

impl TickReport {
    /// HUD text for this tick
    pub fn hud(&self) -> HudReadout {
        HudReadout::new(self.speed, self.gear)
    }
}

/// Speed and gear readout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudReadout {
    /// Speed rounded to whole km/h (half rounds up)
    pub speed_kmh: i32,
    /// Active gear
    pub gear: u8,
}

impl HudReadout {
    /// Readout for a signed speed and gear
    pub fn new(speed: f32, gear: u8) -> Self {
        HudReadout {
            speed_kmh: (speed + 0.5).floor() as i32,
            gear,
        }
    }

    /// Speed line, e.g. `"87 km/h"`
    pub fn speed_text(&self) -> String {
        format!("{} km/h", self.speed_kmh)
    }

    /// Gear line, e.g. `"Gear: 3"`
    pub fn gear_text(&self) -> String {
        format!("Gear: {}", self.gear)
    }
}

impl fmt::Display for HudReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km/h | Gear: {}", self.speed_kmh, self.gear)
    }
}

/// Vehicle plus sound, advanced once per frame
pub struct Simulation<B: AudioBackend> {
    config: SimConfig,
    state: VehicleState,
    dynamics: VehicleDynamics,
    gearbox: GearBox,
    rpm: RpmEstimator,
    sonifier: Sonifier,
    sound: SoundSystem<B>,
    ticks: u64,
}

impl<B: AudioBackend> Simulation<B> {
    /// Car at rest in first gear; audio waits for a user gesture
    pub fn new(config: SimConfig, backend: B) -> Self {
        let max_speed = config.vehicle.max_speed;
        Simulation {
            state: VehicleState::new(),
            dynamics: VehicleDynamics::new(config.vehicle),
            gearbox: GearBox::new(max_speed),
            rpm: RpmEstimator::new(max_speed),
            sonifier: Sonifier::new(max_speed),
            sound: SoundSystem::new(config.audio, backend),
            ticks: 0,
            config,
        }
    }

    /// Report a user gesture (click or key press); initializes audio once
    pub fn user_gesture(&mut self) -> Result<()> {
        self.sound.init_on_gesture()
    }

    /// Advance the simulation by one frame
    pub fn tick(&mut self, time: FrameTime, input: &InputSnapshot) -> TickReport {
        let controls = input.controls();
        let step_scale = self.config.step.scale(time.dt_ms);

        self.dynamics.tick(&mut self.state, controls, step_scale);
        let shift = self.gearbox.update(&mut self.state, time.now_ms);
        let rpm = self.rpm.update(&mut self.state, time.now_ms);
        let levels = self.sonifier.levels(&self.state, &rpm, controls);

        let audible = match self.sound.synth_mut() {
            Some(synth) => {
                self.sonifier.apply(synth, &levels);
                true
            }
            None => false,
        };

        self.ticks += 1;
        TickReport {
            tick: self.ticks,
            time,
            controls,
            speed: self.state.speed,
            gear: self.state.gear,
            shift,
            rpm,
            levels,
            audible,
            pose: self.state.pose(),
        }
    }

    /// Current vehicle state
    pub fn vehicle(&self) -> &VehicleState {
        &self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Sound system
    pub fn sound(&self) -> &SoundSystem<B> {
        &self.sound
    }

    /// Audio backend
    pub fn backend(&self) -> &B {
        self.sound.backend()
    }

    /// Mutable audio backend (offline rendering pulls samples here)
    pub fn backend_mut(&mut self) -> &mut B {
        self.sound.backend_mut()
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Stop every oscillator; the only teardown path
    pub fn shutdown(&mut self) {
        self.sound.stop();
    }
}
