use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the data access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the connection pool handed to the store at startup.
///
/// Connections are opened lazily so the server can start (and serve public pages)
/// before the database is reachable.
pub fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    if config.url.trim().is_empty() {
        return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
    }
    let url = url::Url::parse(&config.url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_lazy(url.as_str())?;

    info!(
        "Created database pool for {}{} (max {} connections)",
        url.host_str().unwrap_or("localhost"),
        url.path(),
        config.max_connections
    );
    Ok(pool)
}
