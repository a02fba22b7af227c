//! Core contracts and helpers for dbseed.
//!
//! This crate defines the schema description consumed by the seeding engine,
//! the foreign-key dependency graph and its ordering, and SQL identifier
//! helpers shared by row-store adapters and the CLI.

pub mod error;
pub mod graph;
pub mod identifier;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use graph::{
    DependencyGraph, GraphReport, GraphSummary, build_graph, build_graph_report,
    topological_sort,
};
pub use identifier::{quote_identifier, validate_identifier};
pub use schema::{
    ColumnDescriptor, DEFAULT_SEED_COUNT, SeedSchema, TableDescriptor, normalize_column_name,
};
pub use types::LogicalType;
pub use validation::validate_schema;

/// Current contract version for schema description documents.
pub const SCHEMA_VERSION: &str = "0.1";
