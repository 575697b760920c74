//! Route handlers: `/play`, `/remux`, `/health`.

use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::request::{request_id, RelayRequest};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay;
use crate::remux::RemuxState;

/// Pass-through relay with Range forwarded upstream.
pub async fn play(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let request_id = request_id(&headers);

    let result = async {
        let request = RelayRequest::parse(query.as_deref(), &headers, &state.gate)?;
        tracing::debug!(
            request_id = %request_id,
            target = %request.target_url,
            range = ?request.range,
            "Relaying"
        );

        let upstream = state
            .fetcher
            .fetch(&request.target_url, &request.forward_headers())
            .await
            .map_err(ApiError::PlayFetch)?;
        Ok::<_, ApiError>(relay::respond(upstream))
    }
    .await;

    finish("play", &request_id, result)
}

/// Fragmented-MP4 remux through the transcoder.
pub async fn remux(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let request_id = request_id(&headers);
    tracing::debug!(request_id = %request_id, state = %RemuxState::Idle, "Remux requested");

    let result = async {
        let request = RelayRequest::parse(query.as_deref(), &headers, &state.gate)?;
        tracing::debug!(
            request_id = %request_id,
            target = %request.target_url,
            state = %RemuxState::Fetching,
            "Remuxing"
        );

        let upstream = match state
            .fetcher
            .fetch(&request.target_url, &request.remux_forward_headers())
            .await
        {
            Ok(upstream) => upstream,
            Err(e) => {
                tracing::debug!(request_id = %request_id, state = %RemuxState::FetchFailed, "Remux not started");
                return Err(ApiError::RemuxFetch(e));
            }
        };
        Ok::<_, ApiError>(state.remux.start(upstream)?)
    }
    .await;

    finish("remux", &request_id, result)
}

/// Liveness probe. Always the same payload.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Log and count the outcome, rendering errors as JSON.
fn finish(route: &'static str, request_id: &str, result: Result<Response, ApiError>) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            match &error {
                ApiError::PlayFetch(e) | ApiError::RemuxFetch(e) => {
                    metrics::record_upstream_error(route);
                    tracing::error!(request_id = %request_id, route, error = %e, "Upstream fetch failed");
                }
                ApiError::RemuxFailed(e) => {
                    tracing::error!(request_id = %request_id, route, error = %e, "Transcoder failed to start");
                }
                other => {
                    tracing::warn!(request_id = %request_id, route, error = %other, "Request rejected");
                }
            }
            error.into_response()
        }
    };

    metrics::record_request(route, response.status().as_u16());
    response
}
