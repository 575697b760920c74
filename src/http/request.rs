//! Request handling and validation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Extract the target URL from the query string
//! - Check order: missing url → host gate → url syntax
//! - Select the inbound headers forwarded upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An empty `url=` counts as missing
//! - Only http and https targets are relayed

use axum::http::header::{RANGE, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::gate::HostGate;
use crate::http::response::ApiError;
use crate::upstream::ForwardHeaders;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request ids for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRelayRequestId;

impl MakeRequestId for MakeRelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request id set by the middleware, for log events.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// A validated relay request.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub target_url: String,
    pub range: Option<HeaderValue>,
    pub user_agent: Option<HeaderValue>,
}

impl RelayRequest {
    /// Build from the raw query string and inbound headers.
    pub fn parse(
        raw_query: Option<&str>,
        headers: &HeaderMap,
        gate: &HostGate,
    ) -> Result<Self, ApiError> {
        let target_url = raw_query
            .and_then(target_from_query)
            .ok_or(ApiError::MissingUrl)?;

        if !gate.is_allowed(&target_url) {
            return Err(ApiError::HostNotAllowed);
        }

        match Url::parse(&target_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ApiError::InvalidUrl),
        }

        Ok(Self {
            target_url,
            range: headers.get(RANGE).cloned(),
            user_agent: headers
                .get(USER_AGENT)
                .filter(|value| !value.is_empty())
                .cloned(),
        })
    }

    /// Headers for the pass-through path: Range and User-Agent.
    pub fn forward_headers(&self) -> ForwardHeaders {
        ForwardHeaders {
            range: self.range.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Headers for the remux path. The transcoder needs the whole container,
    /// so Range is never forwarded.
    pub fn remux_forward_headers(&self) -> ForwardHeaders {
        ForwardHeaders {
            range: None,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// First non-empty `url` parameter, percent-decoded.
fn target_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> HostGate {
        HostGate::default()
    }

    #[test]
    fn missing_or_empty_url() {
        let headers = HeaderMap::new();
        for query in [None, Some(""), Some("url="), Some("other=1")] {
            assert!(matches!(
                RelayRequest::parse(query, &headers, &open()),
                Err(ApiError::MissingUrl)
            ));
        }
    }

    #[test]
    fn url_is_percent_decoded() {
        let request = RelayRequest::parse(
            Some("url=https%3A%2F%2Fcdn.example.com%2Fa.mkv%3Ftoken%3Dx&foo=bar"),
            &HeaderMap::new(),
            &open(),
        )
        .unwrap();
        assert_eq!(request.target_url, "https://cdn.example.com/a.mkv?token=x");
    }

    #[test]
    fn gate_runs_before_syntax_check() {
        let gate = HostGate::from_patterns(&[r"^example\.com$"]).unwrap();
        let headers = HeaderMap::new();

        assert!(matches!(
            RelayRequest::parse(Some("url=https://evil-example.com/a"), &headers, &gate),
            Err(ApiError::HostNotAllowed)
        ));
        // Unparseable URLs fail closed at the gate when patterns exist.
        assert!(matches!(
            RelayRequest::parse(Some("url=garbage"), &headers, &gate),
            Err(ApiError::HostNotAllowed)
        ));
        // With an open gate they are rejected as invalid instead.
        assert!(matches!(
            RelayRequest::parse(Some("url=garbage"), &headers, &open()),
            Err(ApiError::InvalidUrl)
        ));
    }

    #[test]
    fn non_http_schemes_are_invalid() {
        assert!(matches!(
            RelayRequest::parse(Some("url=file:///etc/passwd"), &HeaderMap::new(), &open()),
            Err(ApiError::InvalidUrl)
        ));
    }

    #[test]
    fn forward_headers_per_route() {
        let mut headers = HeaderMap::new();
        headers.insert(RANGE, HeaderValue::from_static("bytes=0-99"));
        headers.insert(USER_AGENT, HeaderValue::from_static("TestPlayer/2"));

        let request = RelayRequest::parse(Some("url=http://example.com/v.mp4"), &headers, &open()).unwrap();

        let play = request.forward_headers();
        assert_eq!(play.range.unwrap(), "bytes=0-99");
        assert_eq!(play.user_agent.unwrap(), "TestPlayer/2");

        let remux = request.remux_forward_headers();
        assert!(remux.range.is_none());
        assert_eq!(remux.user_agent.unwrap(), "TestPlayer/2");
    }

    #[test]
    fn empty_user_agent_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(""));

        let request = RelayRequest::parse(Some("url=http://example.com/v.mp4"), &headers, &open()).unwrap();
        assert!(request.user_agent.is_none());
        assert!(request.forward_headers().user_agent.is_none());
    }

    #[test]
    fn request_id_fallback() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");

        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), "abc");
    }
}
