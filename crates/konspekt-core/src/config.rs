use std::path::PathBuf;

use crate::error::{KonspektError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Runtime configuration, resolved once at startup.
///
/// Both API credentials are required; a missing one fails startup instead
/// of surfacing later as a mid-pipeline error.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub youtube_api_key: String,
    pub gemini_model: String,
    pub language: Option<String>,
    pub max_tokens: Option<i64>,
    pub output_dir: PathBuf,
    pub transcript_cache_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            gemini_api_key: required_var("GEMINI_API_KEY")?,
            youtube_api_key: required_var("YOUTUBE_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            language: std::env::var("LANGUAGE").ok().filter(|l| !l.is_empty()),
            max_tokens: std::env::var("MAX_TOKENS").ok().and_then(|v| v.parse().ok()),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
            transcript_cache_dir: std::env::var("TRANSCRIPT_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_transcript_cache_dir()),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| KonspektError::MissingEnvVar {
            name: name.to_string(),
        })
}

fn default_transcript_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("konspekt")
        .join("transcripts")
}

/// Load environment variables from an `.env` file before reading config.
///
/// Honors an explicit `ENV_FILE` path; otherwise falls back to the usual
/// `.env` discovery. A missing file is not an error.
pub fn load_environment() {
    match std::env::var("ENV_FILE") {
        Ok(path) if !path.is_empty() => {
            if dotenvy::from_path(&path).is_err() {
                tracing::warn!(%path, "could not load environment file");
            }
        }
        _ => {
            let _ = dotenvy::dotenv();
        }
    }
}
