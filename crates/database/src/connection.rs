use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{postgres::PgPoolOptions, PgPool};

fn pool_options(settings: &DatabaseSettings) -> Result<PgPoolOptions, DbError> {
    if settings.url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "DATABASE_URL must be set.".to_string(),
        ));
    }
    Ok(PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout()))
}

/// Establishes the connection pool to the PostgreSQL database.
///
/// Call this once at process start and hand the pool to every component that
/// needs it; there is exactly one pool per process.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let pool = pool_options(settings)?.connect(&settings.url).await?;
    tracing::info!(
        max_connections = settings.max_connections,
        "Connected to the database."
    );
    Ok(pool)
}

/// Builds the pool without opening a connection; the first query connects.
pub fn connect_lazy(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    Ok(pool_options(settings)?.connect_lazy(&settings.url)?)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Closes every pooled connection. Call at shutdown.
pub async fn close(pool: &PgPool) {
    pool.close().await;
    tracing::info!("Database pool closed.");
}
