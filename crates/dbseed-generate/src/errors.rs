use thiserror::Error;

use crate::rowstore::RowStoreError;

/// Errors emitted by the seeding engine.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid schema: {0}")]
    Schema(dbseed_core::Error),
    #[error("cyclic dependency: bad schema design ({})", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
    #[error(
        "referenced row missing: {table}.{column} needs a row in {referenced_table}.{referenced_column}"
    )]
    ReferencedRowMissing {
        table: String,
        column: String,
        referenced_table: String,
        referenced_column: String,
    },
    #[error("key space exhausted: {table}.{column} already holds the largest integer key")]
    KeyExhausted { table: String, column: String },
    #[error("row store error: {0}")]
    RowStore(#[from] RowStoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<dbseed_core::Error> for SeedError {
    fn from(err: dbseed_core::Error) -> Self {
        match err {
            dbseed_core::Error::CyclicDependency { cycle } => SeedError::CyclicDependency { cycle },
            other => SeedError::Schema(other),
        }
    }
}

impl SeedError {
    /// Stable code used in report issues.
    pub fn code(&self) -> &'static str {
        match self {
            SeedError::Schema(_) => "invalid_schema",
            SeedError::CyclicDependency { .. } => "cyclic_dependency",
            SeedError::ReferencedRowMissing { .. } => "referenced_row_missing",
            SeedError::KeyExhausted { .. } => "key_exhausted",
            SeedError::RowStore(_) => "row_store",
            SeedError::Io(_) => "io",
            SeedError::Json(_) => "json",
            SeedError::Csv(_) => "csv",
        }
    }
}
