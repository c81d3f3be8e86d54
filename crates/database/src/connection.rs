use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Establishes a connection pool to the PostgreSQL database.
///
/// The URL comes from `database.url` in the settings, falling back to the
/// `DATABASE_URL` environment variable. The returned pool is cheap to clone
/// and is meant to be handed to a single `DbRepository` shared by the whole
/// application.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let database_url = settings
        .connection_url()
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect(&database_url)
        .await
        .map_err(DbError::Connection)?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Database connection pool established."
    );
    Ok(pool)
}
