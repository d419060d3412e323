use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::env_or;

/// Opens the service's Postgres pool. `DB_MAX_CONNECTIONS` and `DB_ACQUIRE_TIMEOUT_SECS`
/// tune it; each service owns its own schema.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let max_connections: u32 = env_or("DB_MAX_CONNECTIONS", 10)?;
    let acquire_timeout: u64 = env_or("DB_ACQUIRE_TIMEOUT_SECS", 5)?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout))
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(max_connections, "Database pool ready");
    Ok(pool)
}

/// True when the error is a Postgres unique-constraint violation (SQLSTATE 23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}
