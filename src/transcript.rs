//! Transcript result types.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// A stretch of transcribed speech with timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start_secs: f32,
    /// End time in seconds
    pub end_secs: f32,
    /// The transcribed text
    pub text: String,
}

impl Segment {
    /// Duration of the segment in seconds
    pub fn duration_secs(&self) -> f32 {
        self.end_secs - self.start_secs
    }
}

/// Full result of transcribing one audio file.
///
/// The CLI writes only `text`; segments and the detected language stay
/// available for callers that want them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Model the transcript was produced with
    pub model: String,
    /// Audio duration in seconds
    pub duration_secs: f32,
    /// Detected language, when the model reports one
    pub language: Option<String>,
    /// Segments in playback order, with timestamps relative to the
    /// recording start
    pub segments: Vec<Segment>,
    /// All segment text joined with single spaces
    pub text: String,
}

impl Transcript {
    /// Assemble a transcript from segments, joining their text
    pub fn from_segments(
        model: String,
        duration_secs: f32,
        language: Option<String>,
        segments: Vec<Segment>,
    ) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            model,
            duration_secs,
            language,
            segments,
            text,
        }
    }

    /// Write the plain transcript text to `path`, replacing any existing
    /// content. Nothing is added around the text itself.
    pub fn save_text(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, &self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f32, end: f32, text: &str) -> Segment {
        Segment {
            start_secs: start,
            end_secs: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_from_segments_joins_text() {
        let transcript = Transcript::from_segments(
            "turbo".to_string(),
            5.0,
            Some("en".to_string()),
            vec![segment(0.0, 2.0, "Hello"), segment(2.5, 4.0, "world.")],
        );

        assert_eq!(transcript.text, "Hello world.");
        assert_eq!(transcript.segments.len(), 2);
        assert!((transcript.segments[0].duration_secs() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_segments_give_empty_text() {
        let transcript = Transcript::from_segments("base".to_string(), 0.0, None, Vec::new());
        assert!(transcript.text.is_empty());
    }

    #[test]
    fn test_save_text_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");
        std::fs::write(&path, "old content that should disappear").unwrap();

        let transcript = Transcript::from_segments(
            "turbo".to_string(),
            1.0,
            None,
            vec![segment(0.0, 1.0, "new text")],
        );
        transcript.save_text(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new text");
    }

    #[test]
    fn test_save_text_writes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let transcript = Transcript::from_segments(
            "turbo".to_string(),
            1.0,
            None,
            vec![segment(0.0, 1.0, "no trailing newline")],
        );
        transcript.save_text(&path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, b"no trailing newline");
    }
}
