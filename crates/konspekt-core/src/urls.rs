use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{KonspektError, Result};

/// Known YouTube URL shapes, tried in priority order.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Standard watch URL
        r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([^&\s]+)",
        // Embed URL
        r"(?:https?://)?(?:www\.)?youtube\.com/embed/([^/?\s]+)",
        // Short URL
        r"(?:https?://)?(?:www\.)?youtu\.be/([^/?\s]+)",
        // Legacy /v/ URL
        r"(?:https?://)?(?:www\.)?youtube\.com/v/([^/?\s]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Extract a video ID from a YouTube URL.
///
/// Tries each known URL shape first, then falls back to inspecting the `v`
/// query parameter of anything that parses as a youtube.com URL.
pub fn extract_video_id(reference: &str) -> Option<String> {
    for pattern in URL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(reference) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }

    let parsed = Url::parse(reference).ok()?;
    if matches!(parsed.host_str(), Some("www.youtube.com") | Some("youtube.com")) {
        if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "v") {
            if !id.is_empty() {
                return Some(id.into_owned());
            }
        }
    }

    None
}

pub fn is_valid_url(reference: &str) -> bool {
    extract_video_id(reference).is_some()
}

/// Same as [`extract_video_id`], but an unrecognized reference is an error.
pub fn validate_url(reference: &str) -> Result<String> {
    extract_video_id(reference).ok_or_else(|| KonspektError::InvalidVideoUrl {
        url: reference.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn extracts_from_watch_url() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).as_deref(), Some(ID), "url: {url}");
        }
    }

    #[test]
    fn extracts_from_embed_short_and_legacy_urls() {
        for url in [
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=30",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).as_deref(), Some(ID), "url: {url}");
        }
    }

    #[test]
    fn trailing_query_parameters_are_ignored() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=123").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLx&index=2")
                .as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn falls_back_to_generic_query_inspection() {
        assert_eq!(
            extract_video_id("https://youtube.com/some/path?feature=share&v=dQw4w9WgXcQ")
                .as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn unrecognized_references_return_none() {
        for url in [
            "",
            "https://vimeo.com/123456789",
            "https://www.youtube.com/playlist?list=PLrAXtmRdnEQy4qtr",
            "https://www.youtube.com",
            "not a url at all",
        ] {
            assert_eq!(extract_video_id(url), None, "url: {url}");
        }
    }

    #[test]
    fn validate_url_signals_invalid_reference() {
        assert!(validate_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());

        let err = validate_url("https://vimeo.com/123").unwrap_err();
        assert!(matches!(err, KonspektError::InvalidVideoUrl { .. }));
    }

    #[test]
    fn is_valid_url_matches_extraction() {
        assert!(is_valid_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_valid_url("https://example.com/watch?v=nope"));
    }
}
