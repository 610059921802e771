use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use itemflow::{InMemoryItemStore, Item, ItemStore, ServerConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "itemflow")]
#[command(about = "Item CRUD service with batch processing")]
struct Cli {
    /// Bind host (overrides APP_HOST)
    #[arg(long)]
    host: Option<String>,
    /// Bind port (overrides APP_PORT)
    #[arg(long)]
    port: Option<u16>,
    /// Batch worker count (overrides APP_WORKERS)
    #[arg(long)]
    workers: Option<usize>,
    /// Simulated latency per processed item, in milliseconds
    #[arg(long)]
    unit_delay_ms: Option<u64>,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "itemflow=info,tower_http=info")]
    log: String,
    /// Number of demo items to create at startup
    #[arg(long, default_value_t = 0)]
    seed: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let mut config = ServerConfig::from_env().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(workers) = cli.workers {
        config.processing.worker_count = workers;
    }
    if let Some(millis) = cli.unit_delay_ms {
        config.processing.unit_delay = Some(Duration::from_millis(millis));
    }
    config.validate().context("invalid configuration")?;

    let store = Arc::new(InMemoryItemStore::new());
    seed_items(store.as_ref(), cli.seed).await?;

    let app = itemflow::build_app(store, &config.processing)
        .context("failed to build application")?;

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        address = %addr,
        workers = config.processing.worker_count,
        "itemflow started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn seed_items(store: &dyn ItemStore, count: usize) -> Result<()> {
    for i in 1..=count {
        let item = Item::new(format!("Item {i}"), format!("Demo item {i}"), "NEW")
            .with_email(format!("item{i}@example.com"));
        store.save(item).await.context("failed to seed items")?;
    }
    if count > 0 {
        info!(count, "seeded demo items");
    }
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C only");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;

    info!("shutdown requested; draining in-flight requests");
}

// Never resolves if the handler cannot be installed, so the server keeps running.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "unable to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
