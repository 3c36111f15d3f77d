mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use konspekt_core::{
    Config, GeminiSummarizer, Pipeline, SummarizeOptions, SummaryOutcome, SummaryStore,
    TranscriptCache, YouTubeTranscriptSource, extract_video_id, load_environment,
};

use error::{ApiError, ApiResult};

struct AppState {
    pipeline: Pipeline<YouTubeTranscriptSource, GeminiSummarizer>,
}

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    video_url: Option<String>,
    max_tokens: Option<i64>,
    #[serde(default)]
    include_transcript: bool,
    #[serde(default)]
    allow_summary_failure: bool,
}

#[derive(Debug, Serialize)]
struct SummarizeResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    models: Vec<String>,
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    let Some(video_url) = request.video_url.as_deref().filter(|u| !u.is_empty()) else {
        return Err(ApiError::bad_request("video_url is required"));
    };

    let options = SummarizeOptions {
        max_tokens: request.max_tokens,
        include_transcript: request.include_transcript,
        allow_summary_failure: request.allow_summary_failure,
        ..Default::default()
    };

    let outcome = state.pipeline.summarize_video(video_url, &options).await?;

    let response = match outcome {
        SummaryOutcome::Text(summary) => SummarizeResponse {
            status: "success",
            video_id: extract_video_id(video_url),
            language: None,
            summary: Some(summary),
            transcript: None,
            error: None,
        },
        SummaryOutcome::Bundle(bundle) => SummarizeResponse {
            status: "success",
            video_id: Some(bundle.video_id),
            language: Some(bundle.language),
            summary: bundle.summary,
            transcript: Some(bundle.transcript),
            error: bundle.summary_error,
        },
    };

    Ok(Json(response))
}

async fn list_models(State(state): State<Arc<AppState>>) -> ApiResult<Json<ModelsResponse>> {
    let models = state.pipeline.list_models().await?;
    Ok(Json(ModelsResponse { models }))
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/summarize", post(summarize))
        .route("/api/models", get(list_models))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let cache = TranscriptCache::new(config.transcript_cache_dir.clone());
    let source = YouTubeTranscriptSource::new(Some(config.youtube_api_key.clone()), cache)?;
    let summarizer = GeminiSummarizer::new(config.gemini_api_key.clone(), &config.gemini_model)?;
    let pipeline = Pipeline::new(source, summarizer, SummaryStore::new(config.output_dir.clone()));

    let state = Arc::new(AppState { pipeline });
    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5100);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "starting konspekt server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_with_only_a_video_url() {
        let request: SummarizeRequest =
            serde_json::from_str(r#"{"video_url": "https://youtu.be/dQw4w9WgXcQ"}"#).unwrap();

        assert_eq!(request.video_url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(request.max_tokens, None);
        assert!(!request.include_transcript);
        assert!(!request.allow_summary_failure);
    }

    #[test]
    fn response_omits_absent_fields() {
        let response = SummarizeResponse {
            status: "success",
            video_id: Some("dQw4w9WgXcQ".to_string()),
            language: None,
            summary: Some("text".to_string()),
            transcript: None,
            error: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["video_id"], "dQw4w9WgXcQ");
        assert_eq!(json["summary"], "text");
        assert!(json.get("transcript").is_none());
        assert!(json.get("error").is_none());
    }
}
