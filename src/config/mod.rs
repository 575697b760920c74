//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (--config)
//!     → PORT / ALLOW_HOSTS environment or CLI flags
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start and never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError, ConfigOverrides};
pub use schema::RelayConfig;
pub use schema::HttpConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::RemuxConfig;
pub use schema::ObservabilityConfig;
