use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::cache::TranscriptCache;
use crate::error::{KonspektError, Result};

/// Languages tried, in order, when the caller did not request one and the
/// metadata probe came up empty.
const DEFAULT_LANGUAGES: [&str; 2] = ["ru", "en"];

/// Upper bound on attempts to download a caption track body.
const FETCH_ATTEMPTS: usize = 5;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const VIDEOS_API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Where transcripts come from.
///
/// The pipeline is generic over this so tests can substitute a canned
/// source for the network-backed one.
#[async_trait]
pub trait TranscriptSource {
    /// Probe the video's default language. `None` when the probe is not
    /// configured or fails; absence is not an error.
    async fn video_language(&self, video_id: &str) -> Option<String>;

    /// Fetch the transcript, returning `(resolved_language, text)`.
    async fn fetch(&self, video_id: &str, language: Option<&str>) -> Result<(String, String)>;

    /// Language codes of every available caption track.
    async fn available_languages(&self, video_id: &str) -> Result<Vec<String>>;
}

/// Network-backed transcript source.
///
/// Caption tracks are listed from the watch page, the selected track body
/// is fetched from its timedtext URL. Consults the transcript cache before
/// going to the network and writes through after a successful fetch.
pub struct YouTubeTranscriptSource {
    client: reqwest::Client,
    api_key: Option<String>,
    cache: TranscriptCache,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    default_audio_language: Option<String>,
    default_language: Option<String>,
}

impl YouTubeTranscriptSource {
    pub fn new(api_key: Option<String>, cache: TranscriptCache) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(YouTubeTranscriptSource {
            client,
            api_key,
            cache,
        })
    }

    async fn list_caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>> {
        let html = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let json = extract_caption_tracks_json(&html).ok_or_else(|| {
            KonspektError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            }
        })?;

        Ok(serde_json::from_str(json)?)
    }

    fn select_track<'a>(
        video_id: &str,
        tracks: &'a [CaptionTrack],
        requested: Option<&str>,
    ) -> Result<&'a CaptionTrack> {
        let candidates: Vec<String> = match requested {
            Some(lang) => vec![lang.to_string()],
            None => DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        };

        for lang in &candidates {
            if let Some(track) = tracks.iter().find(|t| &t.language_code == lang) {
                return Ok(track);
            }
        }

        Err(KonspektError::NoTranscriptAvailable {
            video_id: video_id.to_string(),
            requested: candidates,
            available: tracks.iter().map(|t| t.language_code.clone()).collect(),
        })
    }

    async fn download_track(&self, base_url: &str) -> Result<String> {
        let xml = self
            .client
            .get(base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(xml)
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptSource {
    async fn video_language(&self, video_id: &str) -> Option<String> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                tracing::warn!("YouTube API key not provided, cannot detect video language");
                return None;
            }
        };

        let response = self
            .client
            .get(VIDEOS_API_URL)
            .query(&[("part", "snippet"), ("id", video_id), ("key", api_key.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, video_id, "video metadata probe failed");
                return None;
            }
        };

        match response.json::<VideoListResponse>().await {
            Ok(listing) => listing.items.into_iter().next().and_then(|item| {
                item.snippet
                    .default_audio_language
                    .or(item.snippet.default_language)
            }),
            Err(e) => {
                tracing::warn!(error = %e, video_id, "could not parse video metadata");
                None
            }
        }
    }

    async fn fetch(&self, video_id: &str, language: Option<&str>) -> Result<(String, String)> {
        if let Some(lang) = language {
            if let Some(cached) = self.cache.load(video_id, lang).await {
                return Ok((lang.to_string(), cached));
            }
        }

        let tracks = self
            .list_caption_tracks(video_id)
            .await
            .map_err(|e| wrap_transport_error(video_id, e))?;
        let track = Self::select_track(video_id, &tracks, language)?;
        let resolved = track.language_code.clone();
        tracing::info!(video_id, language = %resolved, "using transcript language");

        if language.is_none() {
            if let Some(cached) = self.cache.load(video_id, &resolved).await {
                return Ok((resolved, cached));
            }
        }

        let xml = fetch_with_retry(FETCH_ATTEMPTS, || self.download_track(&track.base_url))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, video_id, "failed to fetch transcript after {FETCH_ATTEMPTS} attempts");
                KonspektError::TranscriptFetchFailed {
                    video_id: video_id.to_string(),
                    reason: e.to_string(),
                }
            })?;

        let text = parse_timedtext(&xml);
        self.cache.store(video_id, &resolved, &text).await;

        Ok((resolved, text))
    }

    async fn available_languages(&self, video_id: &str) -> Result<Vec<String>> {
        let tracks = self
            .list_caption_tracks(video_id)
            .await
            .map_err(|e| wrap_transport_error(video_id, e))?;
        Ok(tracks.into_iter().map(|t| t.language_code).collect())
    }
}

/// Transport and parse failures become a generic fetch error; the two
/// permanent kinds pass through untouched.
fn wrap_transport_error(video_id: &str, e: KonspektError) -> KonspektError {
    match e {
        KonspektError::TranscriptsDisabled { .. } | KonspektError::NoTranscriptAvailable { .. } => e,
        other => KonspektError::TranscriptFetchFailed {
            video_id: video_id.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Run `op` up to `attempts` times, returning the last error when every
/// attempt fails.
pub(crate) async fn fetch_with_retry<T, E, F, Fut>(
    attempts: usize,
    mut op: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!(error = %e, attempt, "retrying transcript fetch");
            }
            Err(e) => return Err(e),
        }
    }
}

/// Pull the `captionTracks` JSON array out of a watch page.
///
/// Balanced-bracket scan rather than a regex: track entries contain nested
/// arrays (e.g. `name.runs`), which a lazy match would truncate.
fn extract_caption_tracks_json(html: &str) -> Option<&str> {
    const MARKER: &str = "\"captionTracks\":";
    let start = html.find(MARKER)? + MARKER.len();
    let body = &html[start..];
    if !body.starts_with('[') {
        return None;
    }

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in body.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'[' if !in_string => depth += 1,
            b']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

static CUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("static pattern"));

/// Convert a timedtext XML document into plain text, one line per cue.
fn parse_timedtext(xml: &str) -> String {
    CUE_PATTERN
        .captures_iter(xml)
        .filter_map(|caps| {
            let cue = decode_entities(caps[1].trim());
            (!cue.is_empty()).then_some(cue)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn retry_succeeds_before_the_bound() {
        let calls = Cell::new(0usize);

        let result = fetch_with_retry(5, || {
            let n = calls.get() + 1;
            calls.set(n);
            async move {
                if n < 3 {
                    Err(format!("transient failure {n}"))
                } else {
                    Ok("body")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("body"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn retry_propagates_the_last_error() {
        let calls = Cell::new(0usize);

        let result: std::result::Result<(), String> = fetch_with_retry(5, || {
            let n = calls.get() + 1;
            calls.set(n);
            async move { Err(format!("failure {n}")) }
        })
        .await;

        assert_eq!(result, Err("failure 5".to_string()));
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn extracts_caption_tracks_with_nested_arrays() {
        let html = concat!(
            r#"var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":"#,
            r#"{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=x","#,
            r#""name":{"runs":[{"text":"English \"auto\""}]},"languageCode":"en","kind":"asr"}],"#,
            r#""audioTracks":[]}},"videoDetails":{}}"#,
        );

        let json = extract_caption_tracks_json(html).unwrap();
        let tracks: Vec<CaptionTrack> = serde_json::from_str(json).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "en");
        assert!(tracks[0].base_url.starts_with("https://"));
    }

    #[test]
    fn page_without_caption_tracks_yields_none() {
        assert!(extract_caption_tracks_json("<html><body>nothing here</body></html>").is_none());
    }

    #[test]
    fn selects_requested_language_exactly() {
        let tracks = vec![
            track("en"),
            track("ru"),
        ];

        let selected = YouTubeTranscriptSource::select_track("vid", &tracks, Some("ru")).unwrap();
        assert_eq!(selected.language_code, "ru");
    }

    #[test]
    fn falls_back_through_default_priority_list() {
        let tracks = vec![track("de"), track("en")];

        let selected = YouTubeTranscriptSource::select_track("vid", &tracks, None).unwrap();
        assert_eq!(selected.language_code, "en");
    }

    #[test]
    fn missing_language_reports_available_tracks() {
        let tracks = vec![track("de"), track("fr")];

        let err = YouTubeTranscriptSource::select_track("vid", &tracks, Some("ja")).unwrap_err();
        match err {
            KonspektError::NoTranscriptAvailable {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, vec!["ja".to_string()]);
                assert_eq!(available, vec!["de".to_string(), "fr".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parses_timedtext_cues() {
        let xml = concat!(
            r#"<?xml version="1.0" encoding="utf-8"?><transcript>"#,
            r#"<text start="0.0" dur="1.5">Hello &amp; welcome</text>"#,
            r#"<text start="1.5" dur="2.0">it&#39;s a &quot;test&quot;</text>"#,
            r#"<text start="3.5" dur="1.0">  </text>"#,
            r#"</transcript>"#,
        );

        assert_eq!(
            parse_timedtext(xml),
            "Hello & welcome\nit's a \"test\""
        );
    }

    fn track(language: &str) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://www.youtube.com/api/timedtext?lang={language}"),
            language_code: language.to_string(),
        }
    }
}
