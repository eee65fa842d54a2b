//! Per-tick telemetry as CSV

use serde::Serialize;
use std::io;
use std::path::Path;

use crate::sim::TickReport;
use crate::Result;

/// One CSV row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceRow {
    /// Tick number
    pub tick: u64,
    /// Frame time in milliseconds
    pub time_ms: f64,
    /// Signed speed
    pub speed: f32,
    /// Active gear
    pub gear: u8,
    /// A gear change happened this tick
    pub shifted: bool,
    /// Engine RPM after shift-dip shaping
    pub rpm: f32,
    /// Engine base frequency in Hz
    pub engine_freq: f32,
    /// Engine master gain
    pub engine_volume: f32,
    /// Brake noise gain
    pub brake_volume: f32,
    /// Tire squeal gain
    pub tire_volume: f32,
    /// World X
    pub x: f32,
    /// World Z
    pub z: f32,
    /// Heading in radians
    pub heading: f32,
}

impl From<&TickReport> for TraceRow {
    fn from(report: &TickReport) -> Self {
        TraceRow {
            tick: report.tick,
            time_ms: report.time.now_ms,
            speed: report.speed,
            gear: report.gear,
            shifted: report.shift.is_some(),
            rpm: report.rpm.rpm,
            engine_freq: report.levels.engine_freq,
            engine_volume: report.levels.engine_volume,
            brake_volume: report.levels.brake_volume,
            tire_volume: report.levels.tire_volume,
            x: report.pose.x,
            z: report.pose.z,
            heading: report.pose.heading,
        }
    }
}

/// Write tick reports as CSV to any writer
pub fn write_trace_to<W: io::Write>(writer: W, reports: &[TickReport]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for report in reports {
        csv_writer.serialize(TraceRow::from(report))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write tick reports as a CSV file
pub fn write_trace<P: AsRef<Path>>(path: P, reports: &[TickReport]) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_trace_to(io::BufWriter::new(file), reports)?;
    tracing::info!(path = %path.as_ref().display(), rows = reports.len(), "trace written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AudioConfig, SimConfig};
    use crate::export::{record_drive, DriveScript};

    fn short_drive() -> Vec<TickReport> {
        let config = SimConfig {
            audio: AudioConfig {
                noise_seed: Some(4),
                ..AudioConfig::default()
            },
            ..SimConfig::default()
        };
        let script = DriveScript::new().then(&["w"], 0.5);
        record_drive(config, &script, 60.0).unwrap().ticks
    }

    #[test]
    fn test_trace_header_and_rows() {
        let reports = short_drive();
        let mut out = Vec::new();
        write_trace_to(&mut out, &reports).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "tick,time_ms,speed,gear,shifted,rpm,engine_freq,engine_volume,\
             brake_volume,tire_volume,x,z,heading"
        );
        assert_eq!(lines.count(), reports.len());
    }

    #[test]
    fn test_trace_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.csv");
        let reports = short_drive();
        write_trace(&path, &reports).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), reports.len());
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][3], "1");
    }
}
