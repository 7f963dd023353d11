//! Database connection pool management.

use cartnotify_worker_pool::{PgEventStore, StoreError};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Type alias for the PostgreSQL connection pool.
pub type DbPool = PgPool;

/// Create a new database connection pool.
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// A configured PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection options are invalid or the first
/// connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect_with(config.connect_options()?)
        .await?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        database = %config.database,
        from_url = config.url.is_some(),
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Wrap `pool` in an event store and make sure the schema exists.
///
/// Failure here is fatal for the server: without the table neither ingestion
/// nor the worker pool can run.
pub async fn init_store(pool: DbPool) -> Result<PgEventStore, StoreError> {
    let store = PgEventStore::new(pool);
    store.migrate().await?;
    Ok(store)
}
