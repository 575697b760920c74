//! Upstream (origin) access subsystem.
//!
//! # Data Flow
//! ```text
//! RelayRequest (target url, Range, User-Agent)
//!     → ForwardHeaders
//!     → fetcher.rs (single GET, wait for headers)
//!     → UpstreamResponse (status, relayable headers, lazy body)
//!     → consumed by exactly one of: relay | remux
//! ```

pub mod fetcher;

use std::io;

use axum::body::Bytes;
use futures_util::stream::BoxStream;

pub use fetcher::{FetchError, ForwardHeaders, UpstreamFetcher, UpstreamResponse};

/// Lazily read upstream body.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;
