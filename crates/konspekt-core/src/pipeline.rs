use crate::error::{KonspektError, Result};
use crate::gemini::Summarize;
use crate::store::SummaryStore;
use crate::transcript::TranscriptSource;
use crate::types::{SummarizeOptions, SummaryBundle, SummaryOutcome};
use crate::urls;

/// The summarization pipeline.
///
/// One request runs synchronously, start to finish:
/// validate → resolve video ID → summary-cache check → fetch transcript
/// (transcript-cache aware) → generate → persist if requested.
///
/// Summary-cache keys use the resolved transcript language; the pre-fetch
/// check runs under the caller-requested or probed language when one is
/// known, and is repeated under the resolved language after the fetch.
pub struct Pipeline<T, S>
where
    T: TranscriptSource + Send + Sync,
    S: Summarize + Send + Sync,
{
    source: T,
    summarizer: S,
    store: SummaryStore,
}

impl<T, S> Pipeline<T, S>
where
    T: TranscriptSource + Send + Sync,
    S: Summarize + Send + Sync,
{
    pub fn new(source: T, summarizer: S, store: SummaryStore) -> Self {
        Pipeline {
            source,
            summarizer,
            store,
        }
    }

    pub async fn summarize_video(
        &self,
        video_url: &str,
        options: &SummarizeOptions,
    ) -> Result<SummaryOutcome> {
        let video_id = urls::validate_url(video_url)?;
        if let Some(value) = options.max_tokens {
            if value <= 0 {
                return Err(KonspektError::InvalidMaxTokens { value });
            }
        }

        tracing::info!(%video_id, "processing video");

        let known_language = match &options.language {
            Some(language) => Some(language.clone()),
            None => self.source.video_language(&video_id).await,
        };

        if let Some(language) = &known_language {
            if let Some(cached) = self.load_cached_summary(&video_id, language).await {
                tracing::info!(%video_id, %language, "returning cached summary");
                return Ok(SummaryOutcome::Text(cached));
            }
        }

        let (language, transcript) = self
            .source
            .fetch(&video_id, known_language.as_deref())
            .await?;
        tracing::info!(%video_id, %language, "extracted transcript");

        // The resolved language may differ from the one checked above, so
        // the summary cache is consulted again under the resolved key.
        let cached_summary = self.load_cached_summary(&video_id, &language).await;
        let already_cached = cached_summary.is_some();

        let (summary, summary_error) = match cached_summary {
            Some(text) => (Some(text), None),
            None => {
                match self
                    .summarizer
                    .summarize(&transcript, &language, options.max_tokens)
                    .await
                {
                    Ok(text) => (Some(text), None),
                    Err(e) if options.include_transcript && options.allow_summary_failure => {
                        tracing::warn!(error = %e, %video_id, "summary generation failed, returning transcript only");
                        (None, Some(e.to_string()))
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        if options.save_to_file && !already_cached {
            if let Some(text) = &summary {
                if let Err(e) = self
                    .store
                    .persist(&video_id, &language, text, &options.metadata)
                    .await
                {
                    tracing::warn!(error = %e, %video_id, "failed to persist summary");
                }
            }
        }

        if options.include_transcript {
            return Ok(SummaryOutcome::Bundle(SummaryBundle {
                video_id,
                language,
                transcript,
                summary,
                summary_error,
            }));
        }

        match summary {
            Some(text) => Ok(SummaryOutcome::Text(text)),
            None => Err(KonspektError::SummaryFailed {
                reason: summary_error.unwrap_or_else(|| "no summary was produced".to_string()),
            }),
        }
    }

    /// Cache lookup for an existing summary. Read problems degrade to a miss.
    async fn load_cached_summary(&self, video_id: &str, language: &str) -> Option<String> {
        let path = self.store.locate(video_id, language)?;
        match self.store.load(&path).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "could not read cached summary");
                None
            }
        }
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        self.summarizer.list_models().await
    }

    pub async fn available_languages(&self, video_url: &str) -> Result<Vec<String>> {
        let video_id = urls::validate_url(video_url)?;
        self.source.available_languages(&video_id).await
    }

    pub fn store(&self) -> &SummaryStore {
        &self.store
    }
}
