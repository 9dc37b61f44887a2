use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;

mod audio;
mod transcribe;
mod transcript;

use transcribe::{Transcriber, WhisperModel};

/// Transcribe an audio file to text with a local Whisper model.
#[derive(Parser, Debug)]
#[command(name = "scribey", version)]
struct Cli {
    /// Path to the audio file (mp3, wav, m4a, flac, ...)
    audio_file: PathBuf,

    /// Whisper model name (turbo, base, small, ...)
    #[arg(long = "model_name", default_value = "turbo")]
    model_name: String,

    /// Path the transcript is written to
    #[arg(long = "output_file", default_value = "transcript.txt")]
    output_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let model: WhisperModel = cli.model_name.parse().map_err(anyhow::Error::msg)?;

    let samples = audio::load_mono_16khz(&cli.audio_file)
        .with_context(|| format!("Failed to load audio from {}", cli.audio_file.display()))?;

    let transcriber = Transcriber::new(model).context("Failed to load Whisper model")?;
    let result = transcriber.transcribe(&samples)?;

    result
        .save_text(&cli.output_file)
        .with_context(|| format!("Failed to write transcript to {}", cli.output_file.display()))?;

    info!(
        "Wrote {} characters to {}",
        result.text.len(),
        cli.output_file.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_explicit_flags() {
        let implicit = Cli::try_parse_from(["scribey", "speech.mp3"]).unwrap();
        let explicit = Cli::try_parse_from([
            "scribey",
            "speech.mp3",
            "--model_name",
            "turbo",
            "--output_file",
            "transcript.txt",
        ])
        .unwrap();

        assert_eq!(implicit.model_name, explicit.model_name);
        assert_eq!(implicit.output_file, explicit.output_file);
        assert_eq!(implicit.model_name, "turbo");
        assert_eq!(implicit.output_file, PathBuf::from("transcript.txt"));
    }

    #[test]
    fn test_audio_file_is_required() {
        assert!(Cli::try_parse_from(["scribey"]).is_err());
    }

    #[test]
    fn test_custom_flags() {
        let cli = Cli::try_parse_from([
            "scribey",
            "talk.wav",
            "--model_name",
            "base.en",
            "--output_file",
            "custom.txt",
        ])
        .unwrap();

        assert_eq!(cli.audio_file, PathBuf::from("talk.wav"));
        assert_eq!(cli.model_name, "base.en");
        assert_eq!(cli.output_file, PathBuf::from("custom.txt"));
    }
}
