//! Scripted drives rendered offline

use crate::config::SimConfig;
use crate::input::InputSnapshot;
use crate::sim::{Simulation, TickReport};
use crate::streaming::OfflineBackend;
use crate::timing::FrameClock;
use crate::Result;

/// Keys held for a stretch of time
#[derive(Debug, Clone, PartialEq)]
pub struct DriveSegment {
    /// Key identities held throughout the segment
    pub keys: Vec<String>,
    /// Segment length in seconds
    pub seconds: f64,
}

/// Sequence of timed key holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriveScript {
    segments: Vec<DriveSegment>,
}

impl DriveScript {
    /// Empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment holding `keys` for `seconds`
    pub fn then(mut self, keys: &[&str], seconds: f64) -> Self {
        self.segments.push(DriveSegment {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            seconds,
        });
        self
    }

    /// Flat-out run through the gears, a corner, hard braking, then a coast
    pub fn demo() -> Self {
        Self::new()
            .then(&["w"], 15.0)
            .then(&["w", "a"], 3.0)
            .then(&[" "], 4.0)
            .then(&[], 3.0)
    }

    /// Cut the script at `seconds`, or pad it with coasting to reach it
    pub fn with_duration(mut self, seconds: f64) -> Self {
        let mut remaining = seconds.max(0.0);
        self.segments.retain_mut(|segment| {
            if remaining <= 0.0 {
                return false;
            }
            segment.seconds = segment.seconds.min(remaining);
            remaining -= segment.seconds;
            true
        });
        if remaining > 0.0 {
            self = self.then(&[], remaining);
        }
        self
    }

    /// Segments in order
    pub fn segments(&self) -> &[DriveSegment] {
        &self.segments
    }

    /// Total length in seconds
    pub fn duration_s(&self) -> f64 {
        self.segments.iter().map(|s| s.seconds).sum()
    }

    /// Segment active at `t_ms`, `None` past the end
    pub fn segment_at(&self, t_ms: f64) -> Option<&DriveSegment> {
        let mut end_ms = 0.0;
        for segment in &self.segments {
            end_ms += segment.seconds * 1000.0;
            if t_ms < end_ms {
                return Some(segment);
            }
        }
        None
    }

    /// Input snapshot at `t_ms` (nothing held past the end)
    pub fn input_at(&self, t_ms: f64) -> InputSnapshot {
        self.segment_at(t_ms)
            .map(|segment| segment.keys.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Audio and telemetry of one scripted drive
#[derive(Debug, Clone)]
pub struct Recording {
    /// Mono samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// One report per tick
    pub ticks: Vec<TickReport>,
}

impl Recording {
    /// Audio length in seconds
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Run `script` at `fps` ticks per second and capture audio and telemetry
///
/// The script starts with a user gesture, so audio is live from the first
/// tick. Each tick's audio covers the frame that follows it.
pub fn record_drive(config: SimConfig, script: &DriveScript, fps: f64) -> Result<Recording> {
    let sample_rate = config.audio.sample_rate;
    let mut sim = Simulation::new(config, OfflineBackend::with_sample_rate(sample_rate));
    sim.user_gesture()?;

    let mut clock = FrameClock::fixed(fps);
    // tolerance keeps float drift from adding a trailing frame
    let total_ms = script.duration_s() * 1000.0 - 1e-6;
    let mut samples = Vec::with_capacity((script.duration_s() * f64::from(sample_rate)) as usize);
    let mut ticks = Vec::new();

    while clock.elapsed_ms() < total_ms {
        let input = script.input_at(clock.elapsed_ms());
        let frame = clock.next_frame();
        let report = sim.tick(frame, &input);
        samples.extend(sim.backend_mut().render_frame(frame.dt_ms));
        ticks.push(report);
    }
    sim.shutdown();

    tracing::info!(
        ticks = ticks.len(),
        seconds = samples.len() as f64 / f64::from(sample_rate),
        "drive recorded"
    );

    Ok(Recording {
        samples,
        sample_rate,
        ticks,
    })
}
