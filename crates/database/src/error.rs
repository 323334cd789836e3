use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load configuration for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A query or statement failed. Carries only the fixed, statement-specific
    /// message; the driver error has already been logged.
    #[error("{0}")]
    Query(&'static str),
}

/// Logs the driver error and replaces it with a fixed message.
pub(crate) fn query_failed(message: &'static str) -> impl FnOnce(sqlx::Error) -> DbError {
    move |e| {
        tracing::error!(error = ?e, "Database Error: {}", message);
        DbError::Query(message)
    }
}
