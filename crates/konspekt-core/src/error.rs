use thiserror::Error;

#[derive(Error, Debug)]
pub enum KonspektError {
    #[error("Invalid YouTube URL: {url}")]
    InvalidVideoUrl { url: String },

    #[error("max_tokens must be positive, got {value}")]
    InvalidMaxTokens { value: i64 },

    #[error("Transcripts are disabled for video: {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("No transcript for video {video_id} in languages {requested:?} (available: {available:?})")]
    NoTranscriptAvailable {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Transcript fetch failed for {video_id}: {reason}")]
    TranscriptFetchFailed { video_id: String, reason: String },

    #[error("Summarizer returned an empty response")]
    EmptyGeneration,

    #[error("Summary generation failed: {reason}")]
    SummaryFailed { reason: String },

    #[error("Missing required environment variable: {name}")]
    MissingEnvVar { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, KonspektError>;
