//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id + trace layers)
//!     → handlers.rs (route dispatch)
//!     → request.rs (query parsing, host gate, forwarded headers)
//!     → upstream fetch → relay | remux
//!     → response.rs (pre-stream failures as JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RelayRequest, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer, ServerError};
