use std::path::{Path, PathBuf};

use tokio::fs;

use crate::types::TranscriptRecord;

/// Disk cache for fetched transcripts, one JSON file per (video, language).
///
/// Reads and writes are best-effort: a corrupt or unreadable file is a
/// cache miss, a failed write is logged and ignored. The pipeline never
/// fails because of this cache.
#[derive(Debug, Clone)]
pub struct TranscriptCache {
    dir: PathBuf,
}

impl TranscriptCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TranscriptCache { dir: dir.into() }
    }

    pub fn path_for(&self, video_id: &str, language: &str) -> PathBuf {
        self.dir.join(format!("{video_id}_{language}.json"))
    }

    pub async fn load(&self, video_id: &str, language: &str) -> Option<String> {
        let path = self.path_for(video_id, language);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "failed to read transcript cache");
                return None;
            }
        };

        match serde_json::from_str::<TranscriptRecord>(&content) {
            Ok(record) => {
                tracing::info!(video_id, language, "loaded transcript from cache");
                Some(record.transcript)
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "corrupt transcript cache entry");
                None
            }
        }
    }

    pub async fn store(&self, video_id: &str, language: &str, transcript: &str) {
        let record = TranscriptRecord {
            video_id: video_id.to_string(),
            language: language.to_string(),
            transcript: transcript.to_string(),
        };

        if let Err(e) = self.write_record(&record).await {
            tracing::warn!(error = %e, video_id, "failed to write transcript cache");
        }
    }

    async fn write_record(&self, record: &TranscriptRecord) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(record)?;
        let path = self.path_for(&record.video_id, &record.language);
        fs::write(&path, json).await?;
        tracing::info!(video_id = %record.video_id, path = %path.display(), "saved transcript to cache");
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
