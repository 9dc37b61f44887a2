use std::fs::{self, File};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

const HF_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Pretrained ggml Whisper variants known to the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    TinyEn,
    Base,
    BaseEn,
    Small,
    SmallEn,
    Medium,
    MediumEn,
    Large,
    Turbo,
}

impl WhisperModel {
    /// Get the filename for this model
    pub fn filename(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::TinyEn => "ggml-tiny.en.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::BaseEn => "ggml-base.en.bin",
            WhisperModel::Small => "ggml-small.bin",
            WhisperModel::SmallEn => "ggml-small.en.bin",
            WhisperModel::Medium => "ggml-medium.bin",
            WhisperModel::MediumEn => "ggml-medium.en.bin",
            WhisperModel::Large => "ggml-large-v3.bin",
            WhisperModel::Turbo => "ggml-large-v3-turbo.bin",
        }
    }

    /// Get the Hugging Face URL for this model
    pub fn hf_url(&self) -> String {
        format!("{}/{}", HF_BASE_URL, self.filename())
    }

    /// Get approximate model size in MB
    pub fn size_mb(&self) -> u64 {
        match self {
            WhisperModel::Tiny | WhisperModel::TinyEn => 75,
            WhisperModel::Base | WhisperModel::BaseEn => 142,
            WhisperModel::Small | WhisperModel::SmallEn => 466,
            WhisperModel::Medium | WhisperModel::MediumEn => 1500,
            WhisperModel::Large => 3100,
            WhisperModel::Turbo => 1600,
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::TinyEn => "tiny.en",
            WhisperModel::Base => "base",
            WhisperModel::BaseEn => "base.en",
            WhisperModel::Small => "small",
            WhisperModel::SmallEn => "small.en",
            WhisperModel::Medium => "medium",
            WhisperModel::MediumEn => "medium.en",
            WhisperModel::Large => "large",
            WhisperModel::Turbo => "turbo",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(WhisperModel::Tiny),
            "tiny.en" => Ok(WhisperModel::TinyEn),
            "base" => Ok(WhisperModel::Base),
            "base.en" => Ok(WhisperModel::BaseEn),
            "small" => Ok(WhisperModel::Small),
            "small.en" => Ok(WhisperModel::SmallEn),
            "medium" => Ok(WhisperModel::Medium),
            "medium.en" => Ok(WhisperModel::MediumEn),
            "large" | "large-v3" => Ok(WhisperModel::Large),
            "turbo" | "large-v3-turbo" => Ok(WhisperModel::Turbo),
            _ => Err(format!(
                "Unknown model: {}. Use tiny, base, small, medium, large or turbo \
                 (tiny/base/small/medium also come as English-only .en variants)",
                s
            )),
        }
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to download model: {0}")]
    Download(String),
}

/// Directory where downloaded model weights are cached.
///
/// Uses the platform cache directory so repeated runs from different
/// working directories share one copy of the weights.
pub fn models_dir() -> PathBuf {
    match dirs::cache_dir() {
        Some(dir) => dir.join("scribey").join("models"),
        None => PathBuf::from("models"),
    }
}

/// Get the path to a specific model file
pub fn model_path(model: WhisperModel) -> PathBuf {
    models_dir().join(model.filename())
}

/// Check if a model is already downloaded
pub fn is_model_downloaded(model: WhisperModel) -> bool {
    let path = model_path(model);
    if !path.exists() {
        return false;
    }

    // Guard against truncated downloads: require at least half the
    // expected size
    if let Ok(metadata) = fs::metadata(&path) {
        let expected_bytes = model.size_mb() * 1024 * 1024;
        return metadata.len() >= expected_bytes / 2;
    }

    false
}

/// Download a Whisper model from Hugging Face, reusing the cached copy
/// when one is present.
pub fn download_model(model: WhisperModel) -> Result<PathBuf, ModelError> {
    let path = model_path(model);

    if is_model_downloaded(model) {
        info!("Model {} already downloaded at {:?}", model, path);
        return Ok(path);
    }

    fs::create_dir_all(models_dir())?;

    info!(
        "Downloading Whisper {} model (~{}MB)...",
        model,
        model.size_mb()
    );

    let url = model.hf_url();

    // No request timeout: the weights run into gigabytes
    let client = reqwest::blocking::Client::builder()
        .timeout(None)
        .build()
        .map_err(|e| ModelError::Download(format!("HTTP client setup failed: {}", e)))?;

    let mut response = client
        .get(&url)
        .send()
        .map_err(|e| ModelError::Download(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(ModelError::Download(format!(
            "HTTP {} from {}",
            response.status(),
            url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = indicatif::ProgressBar::new(total_size);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    // Stream into a temp file and rename, so an interrupted download
    // never passes for a complete model
    let temp_path = path.with_extension("bin.part");
    let file = File::create(&temp_path)?;

    response
        .copy_to(&mut pb.wrap_write(file))
        .map_err(|e| ModelError::Download(format!("Failed to read response: {}", e)))?;

    pb.finish_with_message("Download complete");

    fs::rename(&temp_path, &path)?;

    info!("Model downloaded to {:?}", path);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_parsing() {
        assert_eq!("turbo".parse::<WhisperModel>().unwrap(), WhisperModel::Turbo);
        assert_eq!("Turbo".parse::<WhisperModel>().unwrap(), WhisperModel::Turbo);
        assert_eq!(
            "large-v3-turbo".parse::<WhisperModel>().unwrap(),
            WhisperModel::Turbo
        );
        assert_eq!("large".parse::<WhisperModel>().unwrap(), WhisperModel::Large);
        assert_eq!(
            "tiny.en".parse::<WhisperModel>().unwrap(),
            WhisperModel::TinyEn
        );
        assert!("invalid".parse::<WhisperModel>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for model in [
            WhisperModel::Tiny,
            WhisperModel::BaseEn,
            WhisperModel::Medium,
            WhisperModel::Large,
            WhisperModel::Turbo,
        ] {
            assert_eq!(model.to_string().parse::<WhisperModel>().unwrap(), model);
        }
    }

    #[test]
    fn test_model_paths() {
        assert!(
            model_path(WhisperModel::Turbo)
                .to_str()
                .unwrap()
                .contains("ggml-large-v3-turbo.bin")
        );
    }

    #[test]
    fn test_hf_url() {
        let url = WhisperModel::Base.hf_url();
        assert!(url.starts_with("https://huggingface.co/"));
        assert!(url.ends_with("ggml-base.bin"));
    }
}
