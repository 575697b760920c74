//! Outbound request to the media origin.
//!
//! # Responsibilities
//! - Issue exactly one GET per call, no retries
//! - Forward `Range` (when present) and `User-Agent` (always)
//! - Return as soon as response headers arrive; body stays lazy
//!
//! # Design Decisions
//! - No content decoding: bytes reach the client exactly as the origin sent them
//! - Environment proxies are ignored; the gateway talks to the origin directly
//! - Every failure (DNS, connect, TLS, bad URL, timeout) is a `FetchError`

use std::io;
use std::time::Duration;

use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use futures_util::{StreamExt, TryStreamExt};

use crate::config::UpstreamConfig;
use crate::upstream::BodyStream;

/// Failure to obtain upstream response headers.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Inbound headers that are passed on to the origin.
#[derive(Debug, Clone, Default)]
pub struct ForwardHeaders {
    pub range: Option<HeaderValue>,
    pub user_agent: Option<HeaderValue>,
}

/// Upstream status, the relayable header subset, and the unread body.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub content_length: Option<HeaderValue>,
    pub content_range: Option<HeaderValue>,
    pub accept_ranges: Option<HeaderValue>,
    body: BodyStream,
}

impl UpstreamResponse {
    /// Build from a status, the full upstream header map and a body stream.
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: BodyStream) -> Self {
        Self {
            status,
            content_type: headers.get(CONTENT_TYPE).cloned(),
            content_length: headers.get(CONTENT_LENGTH).cloned(),
            content_range: headers.get(CONTENT_RANGE).cloned(),
            accept_ranges: headers.get(ACCEPT_RANGES).cloned(),
            body,
        }
    }

    /// Hand the body over to its consumer. Dropping the stream closes the
    /// upstream connection.
    pub fn into_body(self) -> BodyStream {
        self.body
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .field("accept_ranges", &self.accept_ranges)
            .finish_non_exhaustive()
    }
}

/// Shared outbound client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamFetcher {
    client: reqwest::Client,
    default_user_agent: HeaderValue,
    response_timeout: Option<Duration>,
}

impl UpstreamFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .no_proxy()
            .build()?;

        let default_user_agent = HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(crate::config::schema::DEFAULT_USER_AGENT));

        let response_timeout = match config.response_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            client,
            default_user_agent,
            response_timeout,
        })
    }

    /// Send the GET and wait for response headers.
    pub async fn fetch(
        &self,
        target_url: &str,
        headers: &ForwardHeaders,
    ) -> Result<UpstreamResponse, FetchError> {
        let user_agent = headers
            .user_agent
            .clone()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.default_user_agent.clone());

        let mut request = self.client.get(target_url).header(USER_AGENT, user_agent);
        if let Some(range) = &headers.range {
            request = request.header(RANGE, range.clone());
        }

        let pending = request.send();
        let response = match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| FetchError::Timeout(limit))??,
            None => pending.await?,
        };

        tracing::debug!(
            target = %target_url,
            status = %response.status(),
            "Upstream responded"
        );

        let status = response.status();
        let header_map = response.headers().clone();
        let body = response
            .bytes_stream()
            .map_err(io::Error::other)
            .boxed();

        Ok(UpstreamResponse::from_parts(status, &header_map, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[test]
    fn from_parts_keeps_only_relayable_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/webm"));
        headers.insert(CONTENT_RANGE, HeaderValue::from_static("bytes 0-99/1000"));
        headers.insert("set-cookie", HeaderValue::from_static("a=b"));

        let upstream = UpstreamResponse::from_parts(
            StatusCode::PARTIAL_CONTENT,
            &headers,
            stream::empty().boxed(),
        );

        assert_eq!(upstream.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(upstream.content_type.unwrap(), "video/webm");
        assert_eq!(upstream.content_range.unwrap(), "bytes 0-99/1000");
        assert!(upstream.content_length.is_none());
        assert!(upstream.accept_ranges.is_none());
    }

    #[tokio::test]
    async fn malformed_url_is_a_fetch_error() {
        let fetcher = UpstreamFetcher::new(&UpstreamConfig::default()).unwrap();
        let result = fetcher.fetch("not a url", &ForwardHeaders::default()).await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn refused_connection_is_a_fetch_error() {
        // Bind then drop to obtain a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = UpstreamFetcher::new(&UpstreamConfig::default()).unwrap();
        let result = fetcher
            .fetch(&format!("http://{addr}/video.mp4"), &ForwardHeaders::default())
            .await;
        assert!(result.is_err());
    }
}
