//! Upstream → transcoder → client wiring.
//!
//! Three tasks per request:
//! - stdin pump: upstream chunks written to the transcoder's stdin, one chunk
//!   in flight at a time, stdin closed on upstream EOF or error
//! - stderr drain: diagnostics read continuously so the transcoder never
//!   blocks on a full pipe; logged only when enabled
//! - stdout: read through a fixed-capacity `ReaderStream` straight into the
//!   response body, so a slow client slows the transcoder
//!
//! The session owning the process lives inside the response body. When the
//! body is dropped (stream finished, or client gone) the session tears down:
//! input pump aborted, process killed if output was cut short, process reaped.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderValue, CONTENT_TYPE, TRANSFER_ENCODING};
use axum::http::StatusCode;
use axum::response::Response;
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;

use super::command::TranscoderCommand;
use super::process::TranscoderProcess;
use super::session::{RemuxState, SessionGuard, SessionId, SessionTracker};
use crate::observability::metrics;
use crate::relay::fixed_headers;
use crate::upstream::{BodyStream, UpstreamResponse};

/// Read size for transcoder stdout.
const OUTPUT_CHUNK_SIZE: usize = 64 * 1024;

/// Errors that prevent a remux response from starting.
#[derive(Debug, thiserror::Error)]
pub enum RemuxError {
    /// Upstream answered with a non-2xx status; nothing was spawned.
    #[error("upstream answered {0}")]
    UpstreamStatus(StatusCode),

    /// The transcoder could not be started.
    #[error("failed to start transcoder: {0}")]
    Spawn(#[source] io::Error),
}

/// Spawns one transcoder per request. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RemuxPipeline {
    command: Arc<TranscoderCommand>,
    log_stderr: bool,
    sessions: SessionTracker,
}

impl RemuxPipeline {
    pub fn new(command: TranscoderCommand, log_stderr: bool, sessions: SessionTracker) -> Self {
        Self {
            command: Arc::new(command),
            log_stderr,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// Verify the upstream status, spawn the transcoder, wire the pipes and
    /// return the streaming response.
    pub fn start(&self, upstream: UpstreamResponse) -> Result<Response, RemuxError> {
        if !upstream.status.is_success() {
            tracing::debug!(
                status = %upstream.status,
                state = %RemuxState::FetchFailed,
                "Upstream refused, transcoder not started"
            );
            return Err(RemuxError::UpstreamStatus(upstream.status));
        }

        let (process, pipes) =
            TranscoderProcess::spawn(&self.command).map_err(RemuxError::Spawn)?;
        let guard = self.sessions.track();
        let session_id = guard.id();
        metrics::record_transcoder_spawned();

        tracing::info!(
            session = %session_id,
            pid = ?process.pid(),
            program = %self.command.program(),
            state = %RemuxState::Piping,
            "Transcoder started"
        );

        let pump = tokio::spawn(pump_input(upstream.into_body(), pipes.stdin, session_id));
        let drain = tokio::spawn(drain_diagnostics(pipes.stderr, self.log_stderr, session_id));

        let session = RemuxSession {
            id: session_id,
            process: Some(process),
            pump,
            drain,
            guard: Some(guard),
            output_finished: false,
        };
        let body = RemuxBody {
            output: ReaderStream::with_capacity(pipes.stdout, OUTPUT_CHUNK_SIZE),
            session,
        };

        let mut response = Response::new(Body::from_stream(body));
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        for (name, value) in fixed_headers() {
            headers.insert(name, value);
        }
        Ok(response)
    }
}

/// Copy upstream bytes into the transcoder until either side closes.
async fn pump_input(mut body: BodyStream, mut stdin: ChildStdin, session: SessionId) {
    let mut copied: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(session = %session, error = %e, "Upstream body failed mid-stream");
                break;
            }
        };
        if let Err(e) = stdin.write_all(&chunk).await {
            tracing::debug!(session = %session, error = %e, "Transcoder stopped accepting input");
            return;
        }
        copied += chunk.len() as u64;
    }

    if let Err(e) = stdin.shutdown().await {
        tracing::debug!(session = %session, error = %e, "Failed to flush transcoder input");
    }
    // Closing the pipe is the EOF that lets the transcoder finish its last fragment.
    drop(stdin);
    tracing::debug!(session = %session, bytes = copied, "Transcoder input closed");
}

/// Keep reading stderr until the transcoder closes it.
async fn drain_diagnostics(stderr: ChildStderr, log_lines: bool, session: SessionId) {
    let mut reader = BufReader::new(stderr);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                if log_lines {
                    let text = String::from_utf8_lossy(&line);
                    let text = text.trim();
                    if !text.is_empty() {
                        tracing::debug!(session = %session, "transcoder: {}", text);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(session = %session, error = %e, "Error reading transcoder stderr");
                break;
            }
        }
    }
}

/// Everything one remux request owns besides the stdout stream.
struct RemuxSession {
    id: SessionId,
    process: Option<TranscoderProcess>,
    pump: JoinHandle<()>,
    drain: JoinHandle<()>,
    guard: Option<SessionGuard>,
    output_finished: bool,
}

impl Drop for RemuxSession {
    fn drop(&mut self) {
        // Stops upstream reads, closes stdin, releases the upstream socket.
        self.pump.abort();

        let Some(mut process) = self.process.take() else {
            return;
        };
        let guard = self.guard.take();
        let id = self.id;

        let state = if self.output_finished {
            RemuxState::ProcessExited
        } else {
            self.drain.abort();
            if let Err(e) = process.kill_now() {
                tracing::warn!(session = %id, error = %e, "Failed to kill transcoder");
            }
            RemuxState::ClientDisconnected
        };
        tracing::debug!(session = %id, pid = ?process.pid(), state = %state, "Remux stream ended");

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    match process.reap().await {
                        Ok(status) => {
                            let outcome = match state {
                                RemuxState::ClientDisconnected => "killed",
                                _ if status.success() => "success",
                                _ => "failure",
                            };
                            metrics::record_transcoder_exit(outcome);
                            if outcome == "failure" {
                                tracing::warn!(session = %id, exit_status = %status, "Transcoder exited with failure");
                            } else {
                                tracing::debug!(session = %id, exit_status = %status, "Transcoder reaped");
                            }
                        }
                        Err(e) => {
                            tracing::error!(session = %id, error = %e, "Failed to wait for transcoder");
                        }
                    }
                    tracing::debug!(session = %id, state = %RemuxState::Done, "Remux session closed");
                    drop(guard);
                });
            }
            // Outside a runtime the child's kill_on_drop is the fallback.
            Err(_) => drop(process),
        }
    }
}

/// Transcoder stdout as a response body, carrying the session with it.
struct RemuxBody {
    output: ReaderStream<ChildStdout>,
    session: RemuxSession,
}

impl Stream for RemuxBody {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let item = ready!(Pin::new(&mut this.output).poll_next(cx));
        match &item {
            None => this.session.output_finished = true,
            Some(Err(e)) => {
                tracing::warn!(session = %this.session.id, error = %e, "Transcoder output failed mid-stream");
            }
            Some(Ok(_)) => {}
        }
        Poll::Ready(item)
    }
}
