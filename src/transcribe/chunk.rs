//! Silence-based chunking of long audio.
//!
//! Whisper degrades on very long inputs, so recordings are split at
//! silence gaps and transcribed chunk by chunk. Each chunk keeps its
//! offset into the recording for timestamp reconstruction.

use crate::audio::WHISPER_SAMPLE_RATE;

/// Minimum silence duration that triggers a split (in seconds)
pub const MIN_SILENCE_DURATION_SECS: f32 = 2.0;
/// Silence threshold - windows with RMS below this are considered silence
/// (normalized samples, so 0.01 is about -40dB)
const SILENCE_THRESHOLD: f32 = 0.01;
/// Window size for silence detection: 100ms at 16kHz
const SILENCE_WINDOW_SIZE: usize = 1600;
/// Chunks shorter than half a second are dropped
const MIN_CHUNK_SAMPLES: usize = (WHISPER_SAMPLE_RATE / 2) as usize;

/// A stretch of speech between silence gaps
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Chunk index (0-based)
    pub index: usize,
    /// Audio samples at 16kHz
    pub samples: Vec<f32>,
    /// Start time offset in seconds (relative to the recording start)
    pub start_secs: f32,
    /// End time offset in seconds
    pub end_secs: f32,
}

impl AudioChunk {
    pub fn duration_secs(&self) -> f32 {
        self.end_secs - self.start_secs
    }
}

/// Check if a window of samples is silence (RMS below threshold)
fn is_silence(samples: &[f32]) -> bool {
    if samples.is_empty() {
        return true;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    let rms = (sum_squares / samples.len() as f32).sqrt();

    rms < SILENCE_THRESHOLD
}

/// Find silence regions of at least `min_silence_samples`.
/// Returns (start_sample, end_sample) pairs.
fn find_silence_regions(samples: &[f32], min_silence_samples: usize) -> Vec<(usize, usize)> {
    let mut regions = Vec::new();
    let mut in_silence = false;
    let mut silence_start = 0;

    let mut i = 0;
    while i < samples.len() {
        let window_end = (i + SILENCE_WINDOW_SIZE).min(samples.len());
        let is_silent = is_silence(&samples[i..window_end]);

        if is_silent && !in_silence {
            in_silence = true;
            silence_start = i;
        } else if !is_silent && in_silence {
            in_silence = false;
            if i - silence_start >= min_silence_samples {
                regions.push((silence_start, i));
            }
        }

        i += SILENCE_WINDOW_SIZE;
    }

    // Audio may end inside a silence region
    if in_silence && samples.len() - silence_start >= min_silence_samples {
        regions.push((silence_start, samples.len()));
    }

    regions
}

fn chunk_at(samples: &[f32], start: usize, end: usize, index: usize) -> Option<AudioChunk> {
    let chunk_samples = &samples[start..end];

    if chunk_samples.len() < MIN_CHUNK_SAMPLES || is_silence(chunk_samples) {
        return None;
    }

    Some(AudioChunk {
        index,
        samples: chunk_samples.to_vec(),
        start_secs: start as f32 / WHISPER_SAMPLE_RATE as f32,
        end_secs: end as f32 / WHISPER_SAMPLE_RATE as f32,
    })
}

/// Split 16kHz samples into chunks at silence gaps of at least
/// `min_silence_secs`. Splits land in the middle of each gap; chunks that
/// are too short or entirely silent are dropped.
pub fn split_on_silence(samples: &[f32], min_silence_secs: f32) -> Vec<AudioChunk> {
    if samples.is_empty() {
        return Vec::new();
    }

    let min_silence_samples = (min_silence_secs * WHISPER_SAMPLE_RATE as f32) as usize;
    let silence_regions = find_silence_regions(samples, min_silence_samples);

    if silence_regions.is_empty() {
        // No usable gaps: the whole recording is one chunk, unless it is
        // all silence
        return chunk_at(samples, 0, samples.len(), 0).into_iter().collect();
    }

    let mut chunks = Vec::new();
    let mut chunk_start = 0;

    for (silence_start, silence_end) in &silence_regions {
        let split_point = silence_start + (silence_end - silence_start) / 2;

        if split_point > chunk_start {
            if let Some(chunk) = chunk_at(samples, chunk_start, split_point, chunks.len()) {
                chunks.push(chunk);
            }
        }

        chunk_start = split_point;
    }

    if chunk_start < samples.len() {
        if let Some(chunk) = chunk_at(samples, chunk_start, samples.len(), chunks.len()) {
            chunks.push(chunk);
        }
    }

    chunks
}
