//! Error responses.
//!
//! # Responsibilities
//! - Map request, upstream and transcoder failures to HTTP status codes
//! - Render them as `{"error": "<message>"}`
//!
//! # Design Decisions
//! - Only used before the response head is committed; later failures abort
//!   the stream instead
//! - A failed fetch is 502 on `/play` but 500 on `/remux`
//! - A non-2xx upstream on `/remux` mirrors its 4xx/5xx code, otherwise 502

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::remux::RemuxError;
use crate::upstream::FetchError;

/// Failures reported to the client as structured JSON.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing ?url")]
    MissingUrl,

    #[error("Invalid ?url")]
    InvalidUrl,

    #[error("Host not allowed")]
    HostNotAllowed,

    #[error("Failed to fetch upstream")]
    PlayFetch(#[source] FetchError),

    #[error("Remux failed")]
    RemuxFetch(#[source] FetchError),

    #[error("Upstream error {}", .0.as_u16())]
    UpstreamStatus(StatusCode),

    #[error("Remux failed")]
    RemuxFailed(#[source] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl => StatusCode::BAD_REQUEST,
            ApiError::HostNotAllowed => StatusCode::FORBIDDEN,
            ApiError::PlayFetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::RemuxFetch(_) | ApiError::RemuxFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamStatus(status) => {
                if status.is_client_error() || status.is_server_error() {
                    *status
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
        }
    }
}

impl From<RemuxError> for ApiError {
    fn from(error: RemuxError) -> Self {
        match error {
            RemuxError::UpstreamStatus(status) => ApiError::UpstreamStatus(status),
            RemuxError::Spawn(e) => ApiError::RemuxFailed(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
