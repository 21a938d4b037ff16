//! Calc HTTP Server Binary
//!
//! Serves `POST /calculate` and publishes one log event per request.
//!
//! # Usage
//!
//! ```bash
//! # Without event logging
//! cargo run --bin calc-server -- --port 8080
//!
//! # With RabbitMQ event logging
//! RABBITMQ_HOST=localhost RABBITMQ_USERNAME=guest RABBITMQ_PASSWORD=guest \
//!   RABBITMQ_QUEUE=calc-events cargo run --bin calc-server
//! ```
//!
//! # Environment Variables
//!
//! - `CALC_CONFIG`: TOML configuration file (default: `calc.toml` when present)
//! - `HOST`, `PORT`: listener address, `PORT` overrides `--port`
//! - `PUBLISHER_KIND`, `RABBITMQ_*`: event publisher, see `ServiceConfig::apply_env`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use calc_service::config::ServiceConfig;
use calc_service::evaluator::ArithmeticEvaluator;
use calc_service::http::{create_router, AppState};
use calc_service::publisher::{EventDispatcher, PublisherFactory};
use calc_service::services::ServerIdentity;

#[derive(Debug, Parser)]
#[command(name = "calc-server", version, about = "Arithmetic evaluation service")]
struct Cli {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(long, env = "CALC_CONFIG")]
    config: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::from_default_location()?.unwrap_or_default(),
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting calc HTTP server");

    let config = load_config(&cli).context("invalid configuration")?;

    let publisher = PublisherFactory::from_settings(&config.publisher)
        .await
        .with_context(|| {
            format!(
                "failed to initialize {} publisher",
                config.publisher.resolved_kind()
            )
        })?;
    let dispatcher = EventDispatcher::from_publisher(publisher)
        .with_publish_timeout(config.publisher.publish_timeout());
    info!(publisher = dispatcher.publisher_kind(), "Event publisher initialized");

    let identity = Arc::new(ServerIdentity::new());
    info!(server = identity.server_id(), "Server identity created");

    let evaluator = Arc::new(ArithmeticEvaluator::from_settings(&config.evaluator));
    let state = AppState::new(evaluator, dispatcher.clone())
        .with_identity(identity)
        .with_max_body_bytes(config.server.max_body_bytes);
    let app = create_router(state);

    let addr = config.bind_address()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Waiting for pending log events");
    if let Err(e) = dispatcher.shutdown().await {
        warn!(error = %e, "Failed to close event publisher");
    }
    info!(stats = ?dispatcher.stats(), "Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
