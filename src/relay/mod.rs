//! Direct relay (`/play`).
//!
//! # Responsibilities
//! - Mirror the upstream status code verbatim (200, 206, 4xx, 5xx)
//! - Copy Content-Type, Content-Length, Content-Range, Accept-Ranges when present
//! - Always mark the response uncacheable and cross-origin readable
//! - Stream the upstream body through without buffering
//!
//! # Design Decisions
//! - No Range logic here: the client's Range went upstream unchanged and the
//!   origin's answer comes back unchanged
//! - A mid-stream upstream error surfaces as a body error, which aborts the
//!   client connection (headers are already committed)
//! - Dropping the response body drops the upstream stream, releasing the socket

use axum::body::Body;
use axum::http::header::{
    HeaderValue, ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE,
};
use axum::response::Response;

use crate::upstream::UpstreamResponse;

/// Headers set on every streamed response regardless of upstream.
pub(crate) fn fixed_headers() -> [(axum::http::HeaderName, HeaderValue); 2] {
    [
        (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
    ]
}

/// Turn an upstream response into the client response.
pub fn respond(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = upstream.status;

    let headers = response.headers_mut();
    let relayed = [
        (CONTENT_TYPE, &upstream.content_type),
        (CONTENT_LENGTH, &upstream.content_length),
        (CONTENT_RANGE, &upstream.content_range),
        (ACCEPT_RANGES, &upstream.accept_ranges),
    ];
    for (name, value) in relayed {
        if let Some(value) = value {
            headers.insert(name, value.clone());
        }
    }
    for (name, value) in fixed_headers() {
        headers.insert(name, value);
    }

    *response.body_mut() = Body::from_stream(upstream.into_body());
    response
}
