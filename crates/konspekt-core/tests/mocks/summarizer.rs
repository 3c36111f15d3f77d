use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use konspekt_core::{KonspektError, Result, Summarize};

/// Canned summarizer that records every call.
pub struct MockSummarizer {
    pub summary: String,
    pub fail_reason: Option<String>,
    /// Transcripts passed to `summarize`, in call order.
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        MockSummarizer {
            summary: summary.to_string(),
            fail_reason: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(reason: &str) -> Self {
        let mut summarizer = Self::new("");
        summarizer.fail_reason = Some(reason.to_string());
        summarizer
    }
}

#[async_trait]
impl Summarize for MockSummarizer {
    async fn summarize(
        &self,
        transcript: &str,
        _language: &str,
        _max_tokens: Option<i64>,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(transcript.to_string());

        match &self.fail_reason {
            Some(reason) => Err(KonspektError::SummaryFailed {
                reason: reason.clone(),
            }),
            None => Ok(self.summary.clone()),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["models/gemini-2.0-flash".to_string()])
    }
}
