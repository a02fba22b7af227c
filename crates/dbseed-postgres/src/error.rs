use thiserror::Error;

/// Errors raised while setting up the PostgreSQL row-store.
#[derive(Debug, Error)]
pub enum PgStoreError {
    #[error("invalid target: {0}")]
    Target(String),
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
