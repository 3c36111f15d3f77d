use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use konspekt_core::KonspektError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<KonspektError> for ApiError {
    fn from(e: KonspektError) -> Self {
        match e {
            KonspektError::InvalidVideoUrl { .. }
            | KonspektError::InvalidMaxTokens { .. } => ApiError::BadRequest(e.to_string()),
            KonspektError::TranscriptsDisabled { .. }
            | KonspektError::NoTranscriptAvailable { .. }
            | KonspektError::TranscriptFetchFailed { .. }
            | KonspektError::EmptyGeneration
            | KonspektError::SummaryFailed { .. }
            | KonspektError::ApiError(_) => ApiError::Upstream(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    status: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
            status: "error",
        };
        (status, Json(body)).into_response()
    }
}
