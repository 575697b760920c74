//! Remux subsystem (`/remux`).
//!
//! # Data Flow
//! ```text
//! UpstreamResponse (2xx only)
//!     → process.rs (spawn transcoder, split pipes)
//!     → pipeline.rs
//!         upstream body ──pump──▶ stdin
//!         stdout ─────────────────▶ response body
//!         stderr ──drain──▶ (discarded | debug log)
//!     → session.rs (state names, live-session accounting)
//! ```
//!
//! # Design Decisions
//! - One transcoder per request, owned by the response body
//! - Client disconnect = immediate SIGKILL, no grace period
//! - Transcoder failures after the head is sent are logged, never surfaced

pub mod command;
pub mod pipeline;
pub mod process;
pub mod session;

pub use command::TranscoderCommand;
pub use pipeline::{RemuxError, RemuxPipeline};
pub use process::{TranscoderPipes, TranscoderProcess};
pub use session::{RemuxState, SessionTracker};
