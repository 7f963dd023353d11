//! cartnotify server
//!
//! Accepts card events over HTTP, stores them in PostgreSQL and runs the
//! worker pool that delivers a notification for each one.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartnotify_ingest_api::{
    config::{AppConfig, DatabaseConfig},
    db::{create_pool, init_store},
    router::build_router,
    state::AppState,
};
use cartnotify_worker_pool::{notifier, EventStore, NotifierConfig, PoolConfig, WorkerPool};

/// Initialize tracing/logging.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,cartnotify_ingest_api=debug,cartnotify_worker_pool=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting cartnotify server"
    );

    let app_config = AppConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load app config, using defaults");
        AppConfig::default()
    });

    let db_config = DatabaseConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load database config, using defaults");
        DatabaseConfig::default()
    });

    let pool_config = PoolConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load worker config, using defaults");
        PoolConfig::default()
    });

    let notifier_config = NotifierConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load notifier config, using defaults");
        NotifierConfig::default()
    });

    tracing::info!(
        host = %app_config.host,
        port = app_config.port,
        workers = pool_config.count,
        batch_size = pool_config.batch_size,
        poll_interval_ms = pool_config.poll_interval_ms,
        "Configuration loaded"
    );

    // Without the store nothing can run; these are the only fatal errors.
    let db_pool = create_pool(&db_config)
        .await
        .context("failed to connect to PostgreSQL")?;
    let store: Arc<dyn EventStore> = Arc::new(
        init_store(db_pool.clone())
            .await
            .context("failed to initialize cart_events schema")?,
    );

    let notifier = notifier::from_config(&notifier_config)?;
    let workers = WorkerPool::start(&pool_config, store.clone(), notifier)?;

    let state = AppState::new(store, app_config.clone(), Some(workers.stats()));
    let app = build_router(state);

    let addr: SocketAddr = app_config.bind_address().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    // Stop accepting connections first, then drain the workers, then close
    // the store.
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    let grace = app_config.shutdown_timeout();
    let served = tokio::select! {
        result = server => result.context("HTTP server failed"),
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(
                timeout_secs = grace.as_secs(),
                "Open HTTP connections did not finish in time"
            );
            Ok(())
        }
    };

    tracing::info!("HTTP server stopped, draining worker pool");
    workers.shutdown().await;

    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    served
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
