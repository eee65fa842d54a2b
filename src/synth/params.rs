//! Lock-free parameter handoff between the simulation and the audio path
//!
//! Every parameter is a single `f32` stored as bits in an `AtomicU32`. The
//! simulation tick is the only writer and the renderer the only reader, so a
//! relaxed load/store pair is enough: the reader sees either the old or the
//! new value, never a torn mix, at its next render quantum.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::{HARMONIC_COUNT, VOICE_COUNT};

/// One scalar parameter shared with the audio path
#[derive(Debug)]
pub struct ParamCell(AtomicU32);

impl ParamCell {
    /// Create a cell holding `value`
    pub fn new(value: f32) -> Self {
        ParamCell(AtomicU32::new(value.to_bits()))
    }

    /// Publish a new value (writer side)
    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Read the latest value (reader side)
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl Default for ParamCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Engine voice parameters
#[derive(Debug)]
pub struct EngineParams {
    /// Per-voice oscillator frequency; fundamental first, then harmonics
    pub frequencies: [ParamCell; VOICE_COUNT - 1],
    /// Per-voice gain; fundamental, harmonics, then the noise floor
    pub gains: [ParamCell; VOICE_COUNT],
    /// Gain applied to the summed voices before distortion
    pub master: ParamCell,
    /// Centre frequency of the engine noise band-pass
    pub noise_center: ParamCell,
}

/// All parameters read by the renderer
#[derive(Debug)]
pub struct SynthParams {
    /// Engine voice
    pub engine: EngineParams,
    /// Brake noise gain
    pub brake_gain: ParamCell,
    /// Tire squeal noise gain
    pub tire_gain: ParamCell,
    running: AtomicBool,
}

impl SynthParams {
    /// Parameters at their power-on values
    pub fn new(
        frequencies: [f32; VOICE_COUNT - 1],
        gains: [f32; VOICE_COUNT],
        noise_center: f32,
    ) -> Self {
        SynthParams {
            engine: EngineParams {
                frequencies: frequencies.map(ParamCell::new),
                gains: gains.map(ParamCell::new),
                master: ParamCell::new(0.0),
                noise_center: ParamCell::new(noise_center),
            },
            brake_gain: ParamCell::new(0.0),
            tire_gain: ParamCell::new(0.0),
            running: AtomicBool::new(true),
        }
    }

    /// Oscillators are still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop all oscillators; irreversible
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Snapshot of harmonic frequencies (test and telemetry helper)
    pub fn harmonic_frequencies(&self) -> [f32; HARMONIC_COUNT] {
        std::array::from_fn(|i| self.engine.frequencies[i + 1].get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_param_cell_roundtrip() {
        let cell = ParamCell::new(0.25);
        assert_eq!(cell.get(), 0.25);
        cell.set(-3.5);
        assert_eq!(cell.get(), -3.5);
    }

    #[test]
    fn test_writes_visible_across_threads() {
        let params = Arc::new(SynthParams::new([80.0; 6], [0.1; 7], 240.0));
        let writer = Arc::clone(&params);
        std::thread::spawn(move || {
            writer.engine.master.set(0.42);
            writer.brake_gain.set(0.3);
        })
        .join()
        .unwrap();
        assert_eq!(params.engine.master.get(), 0.42);
        assert_eq!(params.brake_gain.get(), 0.3);
    }

    #[test]
    fn test_stop_is_sticky() {
        let params = SynthParams::new([80.0; 6], [0.0; 7], 240.0);
        assert!(params.is_running());
        params.stop();
        params.stop();
        assert!(!params.is_running());
    }
}
