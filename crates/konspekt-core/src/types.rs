use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Contents of one transcript cache file, one file per (video, language) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub video_id: String,
    pub language: String,
    pub transcript: String,
}

/// Per-request knobs for the summarization pipeline.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Summary language override. When absent, the language is resolved by
    /// the transcript source (metadata probe, then track negotiation).
    pub language: Option<String>,
    /// Upper bound on generated tokens. Must be positive when present.
    pub max_tokens: Option<i64>,
    pub save_to_file: bool,
    /// Return the raw transcript alongside the summary.
    pub include_transcript: bool,
    /// With `include_transcript`, report a generation failure as data
    /// instead of failing the whole request.
    pub allow_summary_failure: bool,
    /// Caller-supplied metadata rendered into the persisted summary.
    /// Ordered so the rendered document is deterministic.
    pub metadata: BTreeMap<String, String>,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        SummarizeOptions {
            language: None,
            max_tokens: None,
            save_to_file: true,
            include_transcript: false,
            allow_summary_failure: false,
            metadata: BTreeMap::new(),
        }
    }
}

/// What the pipeline hands back, shaped by the caller's options.
#[derive(Debug)]
pub enum SummaryOutcome {
    /// Plain summary text, the default response shape.
    Text(String),
    /// Structured bundle, returned when the caller asked for the transcript.
    Bundle(SummaryBundle),
}

#[derive(Debug, Serialize)]
pub struct SummaryBundle {
    pub video_id: String,
    pub language: String,
    pub transcript: String,
    pub summary: Option<String>,
    pub summary_error: Option<String>,
}
