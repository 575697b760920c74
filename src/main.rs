//! Media relay gateway.
//!
//! Serves any upstream media URL either as a transparent byte relay with
//! Range support, or remuxed to fragmented MP4 through ffmpeg.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────┐
//!                       │                     MEDIA RELAY                      │
//!   GET /play?url=      │  ┌────────┐   ┌──────┐   ┌──────────┐   ┌─────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ gate │──▶│ upstream │──▶│  relay  │──┼──▶ client
//!                       │  │ server │   └──────┘   │ fetcher  │   └─────────┘  │
//!   GET /remux?url=     │  │        │              │          │   ┌─────────┐  │
//!   ────────────────────┼─▶│        │─────────────▶│          │──▶│  remux  │──┼──▶ client
//!                       │  └────────┘              └──────────┘   │ ffmpeg  │  │
//!                       │                                         └─────────┘  │
//!                       │  ┌────────────────────────────────────────────────┐  │
//!                       │  │ config │ observability │ lifecycle (signals)   │  │
//!                       │  └────────────────────────────────────────────────┘  │
//!                       └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use media_relay::config::{resolve_config, ConfigOverrides};
use media_relay::lifecycle::startup;
use media_relay::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "media-relay")]
#[command(about = "Relay or remux remote media over HTTP", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP server port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Comma separated host regex allow-list
    #[arg(long, env = "ALLOW_HOSTS")]
    allow_hosts: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        port: args.port,
        allow_hosts: args.allow_hosts,
    };
    let config = resolve_config(args.config.as_deref(), &overrides)?;

    logging::init(&config.observability);
    tracing::info!("media-relay v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
