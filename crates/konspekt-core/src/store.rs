use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use tokio::fs;

use crate::error::Result;
use crate::format::render_summary_document;

/// Persisted summaries on disk: `summary_{video_id}_{language}_{timestamp}.md`.
///
/// An existing entry for a (video, language) pair is never overwritten;
/// `persist` returns the existing path instead. The existence check is
/// plain check-then-write, so two processes racing on the same pair can
/// still each produce a file.
#[derive(Debug, Clone)]
pub struct SummaryStore {
    output_dir: PathBuf,
}

impl SummaryStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        SummaryStore {
            output_dir: output_dir.into(),
        }
    }

    /// Find the most recent persisted summary for a (video, language) pair.
    pub fn locate(&self, video_id: &str, language: &str) -> Option<PathBuf> {
        let prefix = format!("summary_{video_id}_{language}_");
        let entries = std::fs::read_dir(&self.output_dir).ok()?;

        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "md")
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(&prefix))
            })
            .max_by_key(|path| {
                path.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH)
            })
    }

    pub async fn load(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }

    /// Write a new summary document, unless one already exists for the pair.
    pub async fn persist(
        &self,
        video_id: &str,
        language: &str,
        summary: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<PathBuf> {
        if let Some(existing) = self.locate(video_id, language) {
            tracing::info!(video_id, language, path = %existing.display(), "summary already persisted, skipping");
            return Ok(existing);
        }

        fs::create_dir_all(&self.output_dir).await?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self
            .output_dir
            .join(format!("summary_{video_id}_{language}_{timestamp}.md"));

        let document = render_summary_document(video_id, summary, metadata, &timestamp);
        fs::write(&path, document).await?;

        tracing::info!(video_id, language, path = %path.display(), "summary saved");
        Ok(path)
    }

    /// Remove persisted summaries older than `max_age_days`.
    ///
    /// Returns how many files were removed. Per-file failures are logged
    /// and skipped.
    pub fn cleanup_old(&self, max_age_days: u64) -> Result<usize> {
        let max_age = std::time::Duration::from_secs(max_age_days * 24 * 60 * 60);
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in std::fs::read_dir(&self.output_dir)?.flatten() {
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if !name.starts_with("summary_") || path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }

            let modified = match path.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "could not stat summary file");
                    continue;
                }
            };

            let age = now.duration_since(modified).unwrap_or_default();
            if age > max_age {
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        tracing::info!(path = %path.display(), "removed old summary file");
                        removed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, path = %path.display(), "failed to remove summary file");
                    }
                }
            }
        }

        Ok(removed)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
