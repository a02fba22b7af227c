use thiserror::Error;

/// Core error type shared across dbseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema description violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// Foreign keys form a cycle, so no safe seed order exists.
    #[error("cyclic dependency: bad schema design ({})", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
    /// A table or column name cannot be used safely in SQL text.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

/// Convenience alias for results returned by dbseed crates.
pub type Result<T> = std::result::Result<T, Error>;
