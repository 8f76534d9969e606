//! Greeting server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ axum serve ──▶ request ID / timeout layers ──▶ Dispatcher
//!                                                               │
//!                     ┌─────────────────────────────────────────┘
//!                     ▼
//!              Instrument ──▶ Cancellation ──▶ /greet   (RequestCounter +1)
//!                                         ──▶ /stats   (RequestCounter read)
//!                                         ──▶ /        (CancellableTask)
//! ```

use std::path::PathBuf;

use clap::Parser;

use greeter::config::{load_config, validate_config, ConfigError, ServerConfig};
use greeter::http::server::bind;
use greeter::lifecycle::Shutdown;
use greeter::observability::init_logging;
use greeter::{HttpServer, RequestCounter};

#[derive(Parser)]
#[command(name = "greeter")]
#[command(about = "Concurrent greeting server with cancellable work", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address (e.g. 127.0.0.1:8080).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind_address) = cli.bind {
        config.listener.bind_address = bind_address;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability.log_level);

    match config.to_toml() {
        Ok(text) => tracing::debug!(config = %text, "Effective configuration"),
        Err(e) => tracing::warn!(error = %e, "Could not render effective configuration"),
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        work_deadline_ms = config.task.work_deadline_ms,
        poll_interval_ms = config.task.poll_interval_ms,
        request_timeout_secs = config.timeouts.request_secs,
        "Starting server..."
    );

    let listener = bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let _signals = shutdown.trigger_on_signal();

    let server = HttpServer::new(config, RequestCounter::new());
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
