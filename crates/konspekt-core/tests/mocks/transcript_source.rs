use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use konspekt_core::{KonspektError, Result, TranscriptSource};

/// Canned transcript source that records every fetch.
pub struct MockTranscriptSource {
    pub language: String,
    pub transcript: String,
    pub probed_language: Option<String>,
    pub fail_reason: Option<String>,
    /// Video IDs passed to `fetch`, in call order.
    pub fetch_calls: Arc<Mutex<Vec<String>>>,
}

impl MockTranscriptSource {
    pub fn new(language: &str, transcript: &str) -> Self {
        MockTranscriptSource {
            language: language.to_string(),
            transcript: transcript.to_string(),
            probed_language: None,
            fail_reason: None,
            fetch_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_probed_language(mut self, language: &str) -> Self {
        self.probed_language = Some(language.to_string());
        self
    }

    pub fn failing(reason: &str) -> Self {
        let mut source = Self::new("en", "");
        source.fail_reason = Some(reason.to_string());
        source
    }
}

#[async_trait]
impl TranscriptSource for MockTranscriptSource {
    async fn video_language(&self, _video_id: &str) -> Option<String> {
        self.probed_language.clone()
    }

    async fn fetch(&self, video_id: &str, _language: Option<&str>) -> Result<(String, String)> {
        self.fetch_calls.lock().unwrap().push(video_id.to_string());

        if let Some(reason) = &self.fail_reason {
            return Err(KonspektError::TranscriptFetchFailed {
                video_id: video_id.to_string(),
                reason: reason.clone(),
            });
        }

        Ok((self.language.clone(), self.transcript.clone()))
    }

    async fn available_languages(&self, _video_id: &str) -> Result<Vec<String>> {
        Ok(vec![self.language.clone()])
    }
}
