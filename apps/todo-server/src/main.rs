//! Todo server - HTTP API for tracking todos

use anyhow::Context;
use clap::Parser;
use todo_core::{LogFormat, TodoDatabase};
use todo_server::{app, logging::init_logging, AppState, Cli};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config().context("Invalid configuration")?;

    init_logging(cli.verbose, config.log_format == LogFormat::Json)
        .context("Failed to initialize logging")?;

    let db = TodoDatabase::new_with_config(&config.database_path, &config.pool)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    if cli.init_schema {
        db.create_schema().await?;
    }

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    info!("Todo server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(AppState::new(db.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Todo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
