mod decode;
mod resample;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use decode::decode_file;
pub use resample::resample;

/// Whisper's required input sample rate
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Audio file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to decode audio: {0}")]
    Decode(String),
    #[error("No audio samples decoded")]
    Empty,
    #[error("Failed to resample audio: {0}")]
    Resample(String),
}

/// Load an audio file as mono f32 samples at 16kHz, ready for Whisper.
pub fn load_mono_16khz(path: &Path) -> Result<Vec<f32>, AudioError> {
    let (samples, source_rate) = decode_file(path)?;

    if source_rate == WHISPER_SAMPLE_RATE {
        return Ok(samples);
    }

    resample(&samples, source_rate, WHISPER_SAMPLE_RATE)
}
