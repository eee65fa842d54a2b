//! Audio device integration using rodio
//!
//! The renderer is moved into a rodio [`Source`] and pulled from the output
//! thread in batches of `StreamConfig::batch_size` samples.

use super::{AudioBackend, StreamConfig};
use crate::synth::SynthRenderer;
use crate::{DrivetoneError, Result};
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Audio source that renders straight from the synthesizer
struct SynthSource {
    renderer: SynthRenderer,
    channels: u16,
    finished: Arc<AtomicBool>,
    /// Internal buffer for batch rendering
    buffer: Vec<f32>,
    /// Current position in the internal buffer
    buffer_pos: usize,
}

impl SynthSource {
    fn new(renderer: SynthRenderer, config: &StreamConfig, finished: Arc<AtomicBool>) -> Self {
        let batch = config.batch_size.max(1);
        SynthSource {
            renderer,
            channels: config.channels,
            finished,
            buffer: vec![0.0f32; batch],
            buffer_pos: batch, // Start by rendering a new batch
        }
    }
}

impl Source for SynthSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.buffer.len())
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.renderer.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for SynthSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.finished.load(Ordering::Relaxed) {
            return None;
        }

        if self.buffer_pos >= self.buffer.len() {
            self.renderer.render(&mut self.buffer);
            self.buffer_pos = 0;
        }

        let sample = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        Some(sample)
    }
}

struct OpenStream {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

/// Audio playback device using rodio
///
/// Nothing touches the system audio stack until [`AudioBackend::open`].
pub struct AudioDevice {
    config: StreamConfig,
    stream: Option<OpenStream>,
}

impl AudioDevice {
    /// Create a closed device
    pub fn new(config: StreamConfig) -> Self {
        AudioDevice {
            config,
            stream: None,
        }
    }

    /// Stream configuration in use
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Pause playback
    pub fn pause(&self) {
        if let Some(open) = &self.stream {
            open.sink.pause();
        }
    }

    /// Resume playback
    pub fn play(&self) {
        if let Some(open) = &self.stream {
            open.sink.play();
        }
    }
}

impl AudioBackend for AudioDevice {
    fn open(&mut self, renderer: SynthRenderer) -> Result<()> {
        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| {
            DrivetoneError::AudioDeviceError(format!("Failed to create audio stream: {}", e))
        })?;

        let sink = Sink::try_new(&stream_handle).map_err(|e| {
            DrivetoneError::AudioDeviceError(format!("Failed to create audio sink: {}", e))
        })?;

        let finished = Arc::new(AtomicBool::new(false));
        let source = SynthSource::new(renderer, &self.config, Arc::clone(&finished));
        sink.append(source);

        self.stream = Some(OpenStream {
            _stream: stream,
            sink,
            finished,
        });
        Ok(())
    }

    fn close(&mut self) {
        if let Some(open) = self.stream.take() {
            open.finished.store(true, Ordering::Relaxed);
            open.sink.stop();
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.close();
    }
}
