//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::Deserialize;

/// User-Agent sent upstream when the client did not supply one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; URL-Video-Player/1.0)";

/// Root configuration for the media relay.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Response headers and static assets.
    pub http: HttpConfig,

    /// Host allow-list patterns (regular expressions). Empty = allow all.
    pub allow_hosts: Vec<String>,

    /// Outbound request settings.
    pub upstream: UpstreamConfig,

    /// Transcoder settings for the remux route.
    pub remux: RemuxConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RelayConfig {
    /// Socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.bind_address, self.listener.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_address: String,

    /// TCP port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// HTTP surface configuration beyond the relay routes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Directory served for paths no route claims (player page). Unset = none.
    pub static_dir: Option<PathBuf>,

    /// Add the browser hardening headers to every response.
    pub security_headers: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            static_dir: None,
            security_headers: true,
        }
    }
}

/// Upstream fetch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// User-Agent substituted when the client sends none.
    pub user_agent: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Time allowed until upstream response headers arrive, in seconds.
    /// Zero disables the timeout.
    pub response_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 10,
            response_timeout_secs: 30,
        }
    }
}

/// Remux transcoder configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemuxConfig {
    /// Transcoder executable (name resolved via PATH, or absolute path).
    pub program: String,

    /// Value passed to ffmpeg's `-loglevel`.
    pub log_level: String,

    /// Forward transcoder stderr lines to the log at debug level.
    pub log_stderr: bool,
}

impl Default for RemuxConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            log_level: "error".to_string(),
            log_stderr: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
