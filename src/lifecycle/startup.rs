//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start the metrics exporter when enabled
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown has a deadline: streams still open after it are dropped
//! - Listener binds last (traffic only when ready)

use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::RelayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// How long in-flight streams may continue after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// How long to wait for transcoders to be reaped once serving stopped.
const REAP_GRACE: Duration = Duration::from_secs(2);

/// Run the relay with a validated configuration until a termination signal.
pub async fn run(config: RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.bind_address(),
        allow_hosts = config.allow_hosts.len(),
        transcoder = %config.remux.program,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.bind_address();
    let server = HttpServer::new(config)?;
    let sessions = server.sessions().clone();

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let serve = server.run_until(listener, shutdown.signalled());
    let deadline = {
        let signalled = shutdown.signalled();
        async move {
            signalled.await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        }
    };

    tokio::select! {
        result = serve => result?,
        _ = deadline => {
            tracing::warn!(grace = ?SHUTDOWN_GRACE, "Open streams did not drain, closing them");
        }
    }

    if !sessions.wait_idle(REAP_GRACE).await {
        tracing::warn!(
            active = sessions.active_count(),
            "Transcoders still running at exit, relying on kill on drop"
        );
    }
    Ok(())
}
