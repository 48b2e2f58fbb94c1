//! Sinks for alert cues.
//!
//! The scheduler emits bare frequencies; a [`ToneSink`] turns each one into
//! an actual short tone. On a phone that is an oscillator tap; here the two
//! bundled sinks either log the cue or render it into a WAV file through
//! hound, using the canonical cue shape: a 100 ms sine burst starting at
//! amplitude 0.05 and decaying exponentially to 0.001.

use hound::{SampleFormat, WavSpec, WavWriter};
use log::{info, warn};
use std::f32::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Duration of one cue, in milliseconds.
pub const CUE_DURATION_MS: u64 = 100;

/// Sample rate cues are rendered at.
pub const CUE_SAMPLE_RATE: u32 = 44_100;

const CUE_PEAK_AMPLITUDE: f32 = 0.05;
const CUE_FLOOR_AMPLITUDE: f32 = 0.001;

/// Consumes alert cues, fire-and-forget. Implementations must not block
/// the caller for longer than one cue and must swallow their own delivery
/// failures; the scheduler never retries a dropped cue.
pub trait ToneSink {
    /// Emits one tone at `frequency_hz` lasting `duration_ms`.
    fn emit_tone(&mut self, frequency_hz: f64, duration_ms: u64);
}

/// A [`ToneSink`] that just logs each cue. The default for headless runs.
#[derive(Debug, Default)]
pub struct LogSink;

impl ToneSink for LogSink {
    fn emit_tone(&mut self, frequency_hz: f64, duration_ms: u64) {
        info!("ping at {:.0} Hz for {} ms", frequency_hz, duration_ms);
    }
}

/// A [`ToneSink`] that appends each cue to a mono WAV file, so a whole
/// approach can be listened back to.
pub struct WavSink {
    writer: Option<WavWriter<BufWriter<File>>>,
}

impl WavSink {
    /// Creates the output file. Mono, 32-bit float, [`CUE_SAMPLE_RATE`].
    pub fn create(path: impl AsRef<Path>) -> Result<Self, hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: CUE_SAMPLE_RATE,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, spec)?;
        Ok(Self {
            writer: Some(writer),
        })
    }

    /// Finishes the WAV header. Dropping the sink does this too; calling it
    /// gives us controlled error checking.
    pub fn finalize(mut self) -> Result<(), hound::Error> {
        match self.writer.take() {
            Some(writer) => writer.finalize(),
            None => Ok(()),
        }
    }
}

impl ToneSink for WavSink {
    fn emit_tone(&mut self, frequency_hz: f64, duration_ms: u64) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        for sample in render_cue(frequency_hz, duration_ms) {
            if let Err(error) = writer.write_sample(sample) {
                warn!("dropping cue, wav write failed: {}", error);
                return;
            }
        }
        // Flush after each cue to keep the header consistent on disk
        if let Err(error) = writer.flush() {
            warn!("wav flush failed: {}", error);
        }
    }
}

/// Renders one cue as mono samples: a sine at `frequency_hz` under an
/// exponential decay envelope.
fn render_cue(frequency_hz: f64, duration_ms: u64) -> Vec<f32> {
    let total = (CUE_SAMPLE_RATE as u64 * duration_ms / 1000) as usize;
    if total < 2 {
        return Vec::new();
    }
    // Per-sample decay ratio that lands exactly on the floor at the last
    // sample
    let decay = (CUE_FLOOR_AMPLITUDE / CUE_PEAK_AMPLITUDE).powf(1.0 / (total - 1) as f32);
    let mut amplitude = CUE_PEAK_AMPLITUDE;
    (0..total)
        .map(|n| {
            let t = n as f32 / CUE_SAMPLE_RATE as f32;
            let sample = (t * frequency_hz as f32 * 2.0 * PI).sin() * amplitude;
            amplitude *= decay;
            sample
        })
        .collect()
}
