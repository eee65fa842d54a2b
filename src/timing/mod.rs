//! Frame Clock
//!
//! Supplies the simulation with a monotonically increasing time and the delta
//! since the previous frame. The simulation ticks once per display frame; there
//! is no fixed physics step, so the real-time clock reports whatever the host
//! loop delivers.

use std::time::Instant;

/// Time of one simulation frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Milliseconds since the clock started
    pub now_ms: f64,
    /// Milliseconds since the previous frame
    pub dt_ms: f64,
}

impl FrameTime {
    /// Build a frame time from explicit values
    pub fn new(now_ms: f64, dt_ms: f64) -> Self {
        FrameTime { now_ms, dt_ms }
    }
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Realtime(Instant),
    Fixed { frame_ms: f64 },
}

/// Frame clock driving the tick loop
#[derive(Debug, Clone)]
pub struct FrameClock {
    source: Source,
    last_ms: f64,
    frame_count: u64,
}

impl FrameClock {
    /// Wall-clock frame timing (monotonic)
    pub fn realtime() -> Self {
        FrameClock {
            source: Source::Realtime(Instant::now()),
            last_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Deterministic frame timing at `hz` frames per second
    pub fn fixed(hz: f64) -> Self {
        FrameClock {
            source: Source::Fixed {
                frame_ms: 1000.0 / hz,
            },
            last_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to the next frame
    pub fn next_frame(&mut self) -> FrameTime {
        let now_ms = match self.source {
            Source::Realtime(start) => start.elapsed().as_secs_f64() * 1000.0,
            Source::Fixed { frame_ms } => (self.frame_count + 1) as f64 * frame_ms,
        };
        // Monotonic even if the host hands us a stale reading
        let now_ms = now_ms.max(self.last_ms);
        let frame = FrameTime::new(now_ms, now_ms - self.last_ms);
        self.last_ms = now_ms;
        self.frame_count += 1;
        frame
    }

    /// Number of frames produced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time of the most recent frame in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.last_ms
    }
}
