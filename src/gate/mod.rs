//! Host gate subsystem.
//!
//! # Data Flow
//! ```text
//! allow_hosts (Vec<String>, from config)
//!     → compiled once into HostGate (Vec<Regex>)
//!     → Arc<HostGate> shared read-only by all requests
//!     → matcher.rs answers allow/deny per target URL
//! ```
//!
//! # Design Decisions
//! - Compiled at startup, immutable at runtime (thread-safe without locks)
//! - Pure predicate: no I/O, deterministic

pub mod matcher;

pub use matcher::{is_allowed, HostGate};
