//! Media relay library: host gate, upstream fetch, direct relay and
//! ffmpeg remux pipeline behind an Axum HTTP surface.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod remux;
pub mod security;
pub mod upstream;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
