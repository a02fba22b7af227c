mod logging;
mod run;

pub use logging::init_logging;
pub use run::{RunContext, RunPaths, start_run, write_report, write_table_csvs};

use thiserror::Error;

/// Registry-level errors for run artifacts.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export error: {0}")]
    Export(#[from] dbseed_generate::SeedError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid table name for artifact: {0}")]
    TableName(#[from] dbseed_core::Error),
}

/// Result type for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
