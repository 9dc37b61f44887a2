//! Whisper.cpp inference via the whisper-rs bindings.

use std::time::Instant;

use thiserror::Error;
use tracing::info;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::chunk::{AudioChunk, MIN_SILENCE_DURATION_SECS, split_on_silence};
use super::model::{ModelError, WhisperModel, download_model};
use crate::audio::WHISPER_SAMPLE_RATE;
use crate::transcript::{Segment, Transcript};

#[derive(Error, Debug)]
pub enum WhisperError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Failed to initialize Whisper: {0}")]
    Init(String),
    #[error("Transcription failed: {0}")]
    Transcription(String),
}

/// Consecutive identical segments allowed before the rest are dropped as
/// hallucinations
const MAX_REPEATS: usize = 2;

/// Whisper transcriber holding a loaded model for the process lifetime
pub struct Transcriber {
    ctx: WhisperContext,
    model: WhisperModel,
    /// Number of threads whisper.cpp runs inference on
    n_threads: i32,
}

impl Transcriber {
    /// Load the named model, downloading the weights first if needed
    pub fn new(model: WhisperModel) -> Result<Self, WhisperError> {
        let path = download_model(model)?;

        info!("Loading Whisper {} model...", model);

        let ctx = WhisperContext::new_with_params(
            &path.to_string_lossy(),
            WhisperContextParameters::default(),
        )
        .map_err(|e| WhisperError::Init(format!("Failed to load model: {}", e)))?;

        let n_threads = std::thread::available_parallelism()
            .map(|p| (p.get() as i32).max(1))
            .unwrap_or(4);

        info!("Whisper model loaded successfully (using {} threads)", n_threads);

        Ok(Self {
            ctx,
            model,
            n_threads,
        })
    }

    /// Transcribe mono 16kHz samples into a full transcript.
    ///
    /// Long recordings are split at silence gaps and transcribed
    /// sequentially; segment timestamps are shifted back to the
    /// recording's timeline.
    pub fn transcribe(&self, samples: &[f32]) -> Result<Transcript, WhisperError> {
        let total_secs = samples.len() as f32 / WHISPER_SAMPLE_RATE as f32;
        let chunks = split_on_silence(samples, MIN_SILENCE_DURATION_SECS);

        info!(
            "Transcribing {:.1}s of audio in {} chunk(s)",
            total_secs,
            chunks.len()
        );

        let start_time = Instant::now();
        let mut segments = Vec::new();
        let mut language: Option<String> = None;

        for chunk in &chunks {
            let (chunk_segments, chunk_language) = self.transcribe_chunk(chunk)?;

            for seg in chunk_segments {
                // Shift from chunk-relative to recording-relative time
                segments.push(Segment {
                    start_secs: chunk.start_secs + seg.start_secs,
                    end_secs: chunk.start_secs + seg.end_secs,
                    text: seg.text,
                });
            }

            if language.is_none() {
                language = chunk_language;
            }
        }

        let elapsed = start_time.elapsed().as_secs_f32();
        info!(
            "Transcribed {:.1}s in {:.1}s ({:.1}x realtime): {} segments",
            total_secs,
            elapsed,
            total_secs / elapsed.max(0.001),
            segments.len()
        );

        Ok(Transcript::from_segments(
            self.model.to_string(),
            total_secs,
            language,
            segments,
        ))
    }

    /// Run inference on a single chunk.
    ///
    /// Returns chunk-relative segments plus the detected language.
    fn transcribe_chunk(
        &self,
        chunk: &AudioChunk,
    ) -> Result<(Vec<Segment>, Option<String>), WhisperError> {
        info!(
            "Transcribing chunk {} ({:.2}s audio)",
            chunk.index,
            chunk.duration_secs()
        );

        // Greedy sampling: beam search is 2-3x slower
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        params.set_n_threads(self.n_threads);

        // Single segment mode for shorter chunks (faster)
        if chunk.duration_secs() < 30.0 {
            params.set_single_segment(true);
        }

        // Segment-level timestamps are enough
        params.set_token_timestamps(false);

        // Hallucination guards: skip likely-silent segments, stop on
        // repetitive or low-confidence output
        params.set_no_speech_thold(0.6);
        params.set_entropy_thold(2.4);
        params.set_logprob_thold(-1.0);
        params.set_temperature(0.0);
        params.set_temperature_inc(0.2);
        params.set_no_context(true);
        params.set_suppress_non_speech_tokens(true);
        params.set_max_len(80);

        params.set_language(Some("auto"));
        params.set_translate(false);

        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| WhisperError::Transcription(format!("Failed to create state: {}", e)))?;

        state
            .full(params, &chunk.samples)
            .map_err(|e| WhisperError::Transcription(format!("Inference failed: {}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| WhisperError::Transcription(format!("Failed to get segments: {}", e)))?;

        let mut segments = Vec::new();
        let mut last_text: Option<String> = None;
        let mut repeat_count = 0;

        for i in 0..num_segments {
            let start_ts = state
                .full_get_segment_t0(i)
                .map_err(|e| WhisperError::Transcription(format!("Failed to get start time: {}", e)))?;
            let end_ts = state
                .full_get_segment_t1(i)
                .map_err(|e| WhisperError::Transcription(format!("Failed to get end time: {}", e)))?;
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| WhisperError::Transcription(format!("Failed to get text: {}", e)))?;

            let text = text.trim().to_string();
            if text.is_empty() {
                continue;
            }

            // Repeated text is a hallucination symptom
            let is_repeat = last_text.as_ref().is_some_and(|lt| lt == &text);
            if is_repeat {
                repeat_count += 1;
                if repeat_count >= MAX_REPEATS {
                    continue;
                }
            } else {
                repeat_count = 0;
            }
            last_text = Some(text.clone());

            // Whisper timestamps are in centiseconds
            segments.push(Segment {
                start_secs: start_ts as f32 / 100.0,
                end_secs: end_ts as f32 / 100.0,
                text,
            });
        }

        let language = state
            .full_lang_id_from_state()
            .ok()
            .and_then(|id| whisper_rs::get_lang_str(id).map(|s| s.to_string()));

        Ok((segments, language))
    }

    /// Get the model being used
    pub fn model(&self) -> WhisperModel {
        self.model
    }

    /// Get number of threads being used
    pub fn threads(&self) -> i32 {
        self.n_threads
    }
}
