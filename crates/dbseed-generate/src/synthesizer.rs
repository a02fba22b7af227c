use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rand::RngCore;
use tracing::{debug, warn};

use dbseed_core::{ColumnDescriptor, TableDescriptor, normalize_column_name};

use crate::errors::SeedError;
use crate::generators::{GeneratorContext, GeneratorRegistry};
use crate::model::SeedOptions;
use crate::rowstore::{BoundColumn, InsertStatement, RowStore};
use crate::value::SeedValue;

/// Column values for one row, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesizedRow {
    pub columns: Vec<BoundColumn>,
    /// Columns whose type had no generation rule.
    pub fallbacks: Vec<String>,
}

impl SynthesizedRow {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn value(&self, column: &str) -> Option<&SeedValue> {
        self.columns
            .iter()
            .find(|bound| bound.name == column)
            .map(|bound| &bound.value)
    }

    pub fn into_insert(self, table: &str) -> InsertStatement {
        InsertStatement {
            table: table.to_string(),
            columns: self.columns,
        }
    }
}

/// How one column is filled.
enum ColumnRule {
    /// Supplied by the database: identity keys and audit timestamps.
    Skip,
    /// Integer key without identity: current maximum plus one.
    NextKey,
    /// Administrative account key for actor audit columns.
    Actor,
    /// Existing value from the referenced table.
    Reference { table: String, column: String },
    /// Type-driven generation.
    Generate,
}

/// Produces one row of column values at a time for a table.
#[derive(Debug)]
pub struct ValueSynthesizer<'a> {
    registry: &'a GeneratorRegistry,
    audit_timestamps: BTreeSet<String>,
    audit_actors: BTreeSet<String>,
    actor_sentinel: i64,
    base_time: NaiveDateTime,
}

impl<'a> ValueSynthesizer<'a> {
    pub fn new(
        registry: &'a GeneratorRegistry,
        options: &SeedOptions,
        base_time: NaiveDateTime,
    ) -> Self {
        Self {
            registry,
            audit_timestamps: normalized(&options.audit_timestamp_columns),
            audit_actors: normalized(&options.audit_actor_columns),
            actor_sentinel: options.actor_sentinel,
            base_time,
        }
    }

    /// Build one row for `table`, querying `store` for keys and references.
    ///
    /// A self-referencing column is NULL until the table has a row to point
    /// at. Any other reference into an empty table is an error.
    pub fn synthesize_row(
        &self,
        table: &TableDescriptor,
        store: &mut dyn RowStore,
        rng: &mut dyn RngCore,
    ) -> Result<SynthesizedRow, SeedError> {
        let mut row = SynthesizedRow::default();

        for column in &table.columns {
            let value = match self.rule_for(column) {
                ColumnRule::Skip => continue,
                ColumnRule::NextKey => {
                    let current = store.max_value(&table.name, &column.name)?;
                    let next = match current {
                        None => Some(1),
                        Some(max) => max.checked_add(1),
                    };
                    let next = next.ok_or_else(|| SeedError::KeyExhausted {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    })?;
                    SeedValue::Int(next)
                }
                ColumnRule::Actor => SeedValue::Int(self.actor_sentinel),
                ColumnRule::Reference {
                    table: referenced_table,
                    column: referenced_column,
                } => {
                    let existing =
                        store.random_value(&referenced_table, &referenced_column, rng)?;
                    match existing {
                        Some(value) => value,
                        None if referenced_table == table.name => SeedValue::Null,
                        None => {
                            return Err(SeedError::ReferencedRowMissing {
                                table: table.name.clone(),
                                column: column.name.clone(),
                                referenced_table,
                                referenced_column,
                            });
                        }
                    }
                }
                ColumnRule::Generate => {
                    let ctx = GeneratorContext {
                        table,
                        column,
                        base_time: self.base_time,
                    };
                    let generated = self.registry.generate(&ctx, rng);
                    if generated.fallback {
                        warn!(
                            table = %table.name,
                            column = %column.name,
                            data_type = %column.data_type,
                            generator = generated.generator_id,
                            "unhandled type, using fallback value"
                        );
                        row.fallbacks.push(column.name.clone());
                    }
                    generated.value
                }
            };

            row.columns.push(BoundColumn {
                name: column.name.clone(),
                logical_type: column.logical_type(),
                value,
            });
        }

        debug!(table = %table.name, columns = row.columns.len(), "row synthesized");
        Ok(row)
    }

    fn rule_for(&self, column: &ColumnDescriptor) -> ColumnRule {
        let name = normalize_column_name(&column.name);
        let is_foreign_key = column.is_foreign_key();

        if column.is_primary_key && column.has_default() && !is_foreign_key {
            return ColumnRule::Skip;
        }
        if self.audit_timestamps.contains(&name) {
            return ColumnRule::Skip;
        }

        if is_foreign_key {
            if self.audit_actors.contains(&name) {
                return ColumnRule::Actor;
            }
            if let (Some(referenced_table), Some(referenced_column)) =
                (column.referenced_table(), column.referenced_column())
            {
                return ColumnRule::Reference {
                    table: referenced_table.to_string(),
                    column: referenced_column.to_string(),
                };
            }
        }

        if column.is_primary_key && !column.has_default() && column.logical_type().is_integer() {
            return ColumnRule::NextKey;
        }

        ColumnRule::Generate
    }
}

fn normalized(names: &[String]) -> BTreeSet<String> {
    names.iter().map(|name| normalize_column_name(name)).collect()
}
