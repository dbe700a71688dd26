pub mod models;
pub mod tasks;
pub mod users;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the process-wide connection pool. Connects lazily so the server can
/// start (and report degraded health) before the store is reachable.
pub fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    if config.url.is_empty() {
        return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_lazy(&config.url)?;

    info!("Created database pool (max_connections={})", config.max_connections);
    Ok(pool)
}

/// Idempotent schema bootstrap, run once at startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    const SCHEMA: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
        "CREATE TABLE IF NOT EXISTS tasks (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            owner UUID NOT NULL REFERENCES users(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
        // List endpoint always reads newest-first
        "CREATE INDEX IF NOT EXISTS tasks_created_at_idx ON tasks (created_at DESC)",
    ];

    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}

/// Pings the store to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
