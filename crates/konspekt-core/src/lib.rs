//! Konspekt Core Library
//!
//! Core functionality for fetching YouTube transcripts, summarizing them
//! with Gemini, and caching transcripts and summaries on disk.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod gemini;
pub mod pipeline;
pub mod store;
pub mod transcript;
pub mod types;
pub mod urls;

// Re-export commonly used items at crate root
pub use cache::TranscriptCache;
pub use config::{Config, DEFAULT_GEMINI_MODEL, load_environment};
pub use error::{KonspektError, Result};
pub use format::render_summary_document;
pub use gemini::{GeminiSummarizer, Summarize};
pub use pipeline::Pipeline;
pub use store::SummaryStore;
pub use transcript::{TranscriptSource, YouTubeTranscriptSource};
pub use types::{SummarizeOptions, SummaryBundle, SummaryOutcome, TranscriptRecord};
pub use urls::{extract_video_id, is_valid_url, validate_url};
