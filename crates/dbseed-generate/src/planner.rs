use serde::{Deserialize, Serialize};

use dbseed_core::{DependencyGraph, SeedSchema, TableDescriptor, topological_sort};

use crate::errors::SeedError;
use crate::model::SeedOptions;

/// What the engine does with one table of the ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanAction {
    Seed { rows: u32 },
    Blocked,
    /// Referenced by a foreign key but not described; queried, never seeded.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub table: String,
    #[serde(flatten)]
    pub action: PlanAction,
}

/// Ordered seeding plan derived from a schema and its dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPlan {
    pub entries: Vec<PlanEntry>,
}

impl SeedPlan {
    /// Full dependency order, blocked and external tables included.
    pub fn order(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.table.clone()).collect()
    }

    /// Tables that will be inserted into, with their row counts, in order.
    pub fn steps(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().filter_map(|entry| match entry.action {
            PlanAction::Seed { rows } => Some((entry.table.as_str(), rows)),
            _ => None,
        })
    }

    pub fn blocked(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| entry.action == PlanAction::Blocked)
            .map(|entry| entry.table.as_str())
    }

    pub fn external(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| entry.action == PlanAction::External)
            .map(|entry| entry.table.as_str())
    }
}

/// Sort the graph and decide, per table, whether and how much to seed.
///
/// A cycle aborts planning. Blocked tables keep their place in the order so
/// dependents still sort after them.
pub fn plan_seed(
    schema: &SeedSchema,
    graph: &DependencyGraph,
    options: &SeedOptions,
) -> Result<SeedPlan, SeedError> {
    let order = topological_sort(graph)?;

    let entries = order
        .into_iter()
        .map(|table| {
            let action = if options.is_blocked(&table) {
                PlanAction::Blocked
            } else {
                match schema.table(&table) {
                    Some(descriptor) => PlanAction::Seed {
                        rows: row_count(descriptor, options),
                    },
                    None => PlanAction::External,
                }
            };
            PlanEntry { table, action }
        })
        .collect();

    Ok(SeedPlan { entries })
}

fn row_count(table: &TableDescriptor, options: &SeedOptions) -> u32 {
    options
        .table_rows
        .get(&table.name)
        .copied()
        .or(table.seed_count)
        .unwrap_or(options.default_rows)
}
