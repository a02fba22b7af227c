//! Dependency-aware seed generation for dbseed.
//!
//! This crate consumes a [`dbseed_core::SeedSchema`], orders its tables by
//! foreign-key dependencies and inserts synthetic rows through a
//! [`RowStore`], producing a per-table [`SeedReport`].

pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;
pub mod planner;
pub mod rowstore;
pub mod synthesizer;
pub mod value;

pub use engine::SeedEngine;
pub use errors::SeedError;
pub use model::{SeedIssue, SeedOptions, SeedReport, TableReport, TableStatus};
pub use planner::{PlanAction, PlanEntry, SeedPlan, plan_seed};
pub use rowstore::{BoundColumn, InMemoryRowStore, InsertStatement, Row, RowStore, RowStoreError};
pub use synthesizer::{SynthesizedRow, ValueSynthesizer};
pub use value::SeedValue;
