use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use dbseed_core::DEFAULT_SEED_COUNT;

/// Options for the seeding engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    /// Tables kept in the ordering but never inserted into.
    pub block_list: BTreeSet<String>,
    /// Rows per table when neither an override nor the descriptor sets one.
    pub default_rows: u32,
    /// Per-table row count overrides.
    pub table_rows: BTreeMap<String, u32>,
    /// Fixed RNG seed; a time-based seed is drawn when absent.
    pub seed: Option<u64>,
    /// Reference time for generated dates; the current time when absent.
    pub base_time: Option<NaiveDateTime>,
    /// Columns the database or a trigger fills in (matched by normalized name).
    pub audit_timestamp_columns: Vec<String>,
    /// Foreign keys that always point at the administrative account.
    pub audit_actor_columns: Vec<String>,
    /// Key of the administrative account.
    pub actor_sentinel: i64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            block_list: BTreeSet::new(),
            default_rows: DEFAULT_SEED_COUNT,
            table_rows: BTreeMap::new(),
            seed: None,
            base_time: None,
            audit_timestamp_columns: vec!["createdAt".to_string(), "updatedAt".to_string()],
            audit_actor_columns: vec!["createdBy".to_string(), "updatedBy".to_string()],
            actor_sentinel: 1,
        }
    }
}

impl SeedOptions {
    pub fn is_blocked(&self, table: &str) -> bool {
        self.block_list.contains(table)
    }
}

/// Terminal state of one table in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Every requested row was inserted.
    Seeded,
    /// A row failed after at least one row was inserted.
    Partial,
    /// The first row failed.
    Failed,
    /// On the block-list.
    Blocked,
    /// Every column was skipped, so there was nothing to insert.
    Empty,
}

/// Outcome for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub status: TableStatus,
    pub rows_requested: u32,
    pub rows_inserted: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableReport {
    pub fn blocked(table: &str) -> Self {
        Self {
            table: table.to_string(),
            status: TableStatus::Blocked,
            rows_requested: 0,
            rows_inserted: 0,
            error: None,
        }
    }
}

/// Structured seeding issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

/// Report for a seeding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedReport {
    pub run_id: String,
    pub seed: u64,
    pub order: Vec<String>,
    pub tables: Vec<TableReport>,
    pub tables_attempted: u32,
    pub tables_seeded: u32,
    pub tables_partial: u32,
    pub tables_failed: u32,
    pub tables_skipped: u32,
    pub rows_inserted: u64,
    pub fallback_count: u64,
    pub warnings: Vec<SeedIssue>,
}

impl SeedReport {
    pub fn new(run_id: String, seed: u64, order: Vec<String>) -> Self {
        Self {
            run_id,
            seed,
            order,
            tables: Vec::new(),
            tables_attempted: 0,
            tables_seeded: 0,
            tables_partial: 0,
            tables_failed: 0,
            tables_skipped: 0,
            rows_inserted: 0,
            fallback_count: 0,
            warnings: Vec::new(),
        }
    }

    pub fn record_table(&mut self, table: TableReport) {
        match table.status {
            TableStatus::Blocked => self.tables_skipped += 1,
            TableStatus::Empty => {
                self.tables_attempted += 1;
                self.tables_skipped += 1;
            }
            TableStatus::Seeded => {
                self.tables_attempted += 1;
                self.tables_seeded += 1;
            }
            TableStatus::Partial => {
                self.tables_attempted += 1;
                self.tables_partial += 1;
            }
            TableStatus::Failed => {
                self.tables_attempted += 1;
                self.tables_failed += 1;
            }
        }
        self.rows_inserted += u64::from(table.rows_inserted);
        self.tables.push(table);
    }

    pub fn record_fallback(&mut self) {
        self.fallback_count += 1;
    }

    pub fn record_warning(&mut self, issue: SeedIssue) {
        self.warnings.push(issue);
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.table == name)
    }

    /// Tables that stopped on an error, with the error text.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables.iter().filter_map(|table| {
            table
                .error
                .as_deref()
                .map(|error| (table.table.as_str(), error))
        })
    }

    pub fn is_complete(&self) -> bool {
        self.tables_partial == 0 && self.tables_failed == 0
    }
}
