pub mod accounting;
pub mod connection;
pub mod sync;

use ledgersync_common::error::{LedgerError, LedgerResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Create a Postgres connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> LedgerResult<PgPool> {
    tracing::info!("connecting to database");
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))
}
