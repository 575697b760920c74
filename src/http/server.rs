//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, CORS, security headers)
//! - Serve the optional static directory for unrouted paths
//! - Build the shared, read-only per-process state
//! - Serve on a listener until shutdown

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{HttpConfig, RelayConfig};
use crate::gate::HostGate;
use crate::http::handlers;
use crate::http::request::{MakeRelayRequestId, X_REQUEST_ID};
use crate::remux::{RemuxPipeline, SessionTracker, TranscoderCommand};
use crate::security::with_security_headers;
use crate::upstream::{FetchError, UpstreamFetcher};

/// Failure to assemble the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid allow_hosts pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] FetchError),
}

/// Application state injected into handlers. Nothing in it is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<HostGate>,
    pub fetcher: UpstreamFetcher,
    pub remux: RemuxPipeline,
}

/// HTTP server for the media relay.
pub struct HttpServer {
    router: Router,
    sessions: SessionTracker,
}

impl HttpServer {
    /// Create a server using the configured ffmpeg transcoder.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let command = TranscoderCommand::from(&config.remux);
        Self::with_transcoder(config, command)
    }

    /// Create a server with an explicit transcoder command.
    pub fn with_transcoder(
        config: RelayConfig,
        command: TranscoderCommand,
    ) -> Result<Self, ServerError> {
        let gate = Arc::new(HostGate::from_patterns(&config.allow_hosts)?);
        let fetcher = UpstreamFetcher::new(&config.upstream)?;
        let sessions = SessionTracker::new();
        let remux = RemuxPipeline::new(command, config.remux.log_stderr, sessions.clone());

        if gate.is_open() {
            tracing::warn!("No allow_hosts configured, relaying to any host");
        }

        let state = AppState {
            gate,
            fetcher,
            remux,
        };

        if let Some(dir) = &config.http.static_dir {
            if !dir.is_dir() {
                tracing::warn!(static_dir = %dir.display(), "Static directory not found, unrouted paths will 404");
            }
        }

        let router = Self::build_router(state, &config.http);
        Ok(Self { router, sessions })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, http: &HttpConfig) -> Router {
        let mut routes = Router::new()
            .route("/play", get(handlers::play))
            .route("/remux", get(handlers::remux))
            .route("/health", get(handlers::health));
        if let Some(dir) = &http.static_dir {
            routes = routes.fallback_service(ServeDir::new(dir));
        }

        let mut router = routes.with_state(state);
        if http.security_headers {
            router = with_security_headers(router);
        }

        router
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRelayRequestId))
    }

    /// The fully layered router, e.g. for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Live transcoder accounting shared with the remux pipeline.
    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// Serve until `shutdown` resolves, then drain in-flight responses.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
