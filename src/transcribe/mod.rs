mod chunk;
mod model;
mod whisper;

pub use chunk::{AudioChunk, MIN_SILENCE_DURATION_SECS, split_on_silence};
pub use model::{ModelError, WhisperModel, download_model, is_model_downloaded, model_path};
pub use whisper::{Transcriber, WhisperError};
