//! request-timeout demo server.
//!
//! Serves simulated slow work behind the request timeout middleware.
//!
//! ```text
//! client → TraceLayer → ContextLayer → RequestTimeoutLayer → handler
//!                                         │
//!                                         └─ 504 gateway-timeout once the deadline passed
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use request_timeout::config::{load_config, AppConfig};
use request_timeout::lifecycle::{shutdown_signal, Shutdown};
use request_timeout::observability::init_logging;
use request_timeout::HttpServer;

#[derive(Parser)]
#[command(name = "request-timeout")]
#[command(about = "Demo server bounding request processing time", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Request timeout (e.g. "100ms", "5s"), overrides `timeout.duration`.
    #[arg(short, long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Log level, overrides `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout.duration = timeout;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        timeout = %config.timeout.duration_text(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        on_signal.trigger();
    });

    HttpServer::new(config).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
