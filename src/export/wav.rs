//! WAV file export functionality

use super::{apply_fade_out, normalize_samples, ExportConfig, Recording};
use crate::{DrivetoneError, Result};
use std::path::Path;

/// Write a recording to a 16-bit PCM WAV file
///
/// # Examples
///
/// ```no_run
/// use drivetone::export::{export_to_wav, record_drive, DriveScript, ExportConfig};
/// use drivetone::SimConfig;
///
/// # fn main() -> drivetone::Result<()> {
/// let recording = record_drive(SimConfig::default(), &DriveScript::demo(), 60.0)?;
/// export_to_wav(&recording, "drive.wav", ExportConfig::stereo().fade_out(1.0))?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<P: AsRef<Path>>(
    recording: &Recording,
    output_path: P,
    config: ExportConfig,
) -> Result<()> {
    let mut samples = recording.samples.clone();

    if config.normalize {
        normalize_samples(&mut samples);
    }
    if config.fade_out_duration > 0.0 {
        apply_fade_out(&mut samples, config.fade_out_duration, recording.sample_rate);
    }

    let final_samples = if config.channels == 2 {
        mono_to_stereo(&samples)
    } else {
        samples
    };

    tracing::info!(
        path = %output_path.as_ref().display(),
        seconds = recording.duration_s(),
        channels = config.channels,
        "writing WAV"
    );
    write_wav_file(
        output_path.as_ref(),
        &final_samples,
        recording.sample_rate,
        config.channels,
    )
}

/// Duplicate each mono sample into an interleaved stereo pair
pub fn mono_to_stereo(mono: &[f32]) -> Vec<f32> {
    let mut stereo = Vec::with_capacity(mono.len() * 2);
    for &sample in mono {
        stereo.push(sample);
        stereo.push(sample);
    }
    stereo
}

/// Write samples to WAV file
fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        DrivetoneError::AudioFileError(format!("Failed to create WAV file: {}", e))
    })?;

    for &sample in samples {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| DrivetoneError::AudioFileError(format!("Failed to write sample: {}", e)))?;
    }

    writer.finalize().map_err(|e| {
        DrivetoneError::AudioFileError(format!("Failed to finalize WAV file: {}", e))
    })?;

    Ok(())
}
