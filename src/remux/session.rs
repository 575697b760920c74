//! Remux session state and lifetime tracking.
//!
//! # Responsibilities
//! - Name the per-request remux states for logging
//! - Count live transcoder sessions (spawn → reaped)
//! - Generate unique session IDs for tracing

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::observability::metrics;

/// Per-request remux state.
///
/// ```text
/// Idle → Fetching → FetchFailed                      (terminal, error response)
///                 → Piping → ProcessExited       → Done
///                          → ClientDisconnected  → Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxState {
    Idle,
    Fetching,
    FetchFailed,
    Piping,
    ProcessExited,
    ClientDisconnected,
    Done,
}

impl fmt::Display for RemuxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemuxState::Idle => "idle",
            RemuxState::Fetching => "fetching",
            RemuxState::FetchFailed => "fetch_failed",
            RemuxState::Piping => "piping",
            RemuxState::ProcessExited => "process_exited",
            RemuxState::ClientDisconnected => "client_disconnected",
            RemuxState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Global atomic counter for session IDs.
static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a remux session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new() -> Self {
        Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remux-{}", self.0)
    }
}

/// Counts transcoder sessions. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    active: Arc<AtomicU64>,
    spawned: Arc<AtomicU64>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly spawned transcoder. Returns a guard that decrements on drop.
    pub fn track(&self) -> SessionGuard {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_active_sessions(active);
        SessionGuard {
            active: Arc::clone(&self.active),
            id: SessionId::new(),
        }
    }

    /// Sessions whose transcoder has not been reaped yet.
    pub fn active_count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Transcoders spawned since startup.
    pub fn spawned_count(&self) -> u64 {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Wait until no session is active, polling. Returns false on timeout.
    pub async fn wait_idle(&self, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        while self.active_count() > 0 {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }
}

/// Held for the lifetime of one transcoder, from spawn until it is reaped.
#[derive(Debug)]
pub struct SessionGuard {
    active: Arc<AtomicU64>,
    id: SessionId,
}

impl SessionGuard {
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_active_sessions(remaining);
        tracing::trace!(session = %self.id, "Remux session released");
    }
}
