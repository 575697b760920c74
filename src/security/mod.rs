//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! handler response
//!     → headers.rs (hardening headers, only where the handler set none)
//!     → CORS layer (server.rs)
//!     → client
//! ```
//!
//! # Design Decisions
//! - Cross-Origin-Resource-Policy is never sent: relayed media must stay
//!   embeddable from other origins
//! - Host restriction lives in `gate`, not here

pub mod headers;

pub use headers::{with_security_headers, SECURITY_HEADERS};
