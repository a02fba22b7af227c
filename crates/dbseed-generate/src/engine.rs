use std::collections::BTreeSet;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use chrono::{NaiveDateTime, Timelike, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use dbseed_core::{TableDescriptor, build_graph, validate_schema};

use crate::errors::SeedError;
use crate::generators::GeneratorRegistry;
use crate::model::{SeedIssue, SeedOptions, SeedReport, TableReport, TableStatus};
use crate::planner::{PlanAction, SeedPlan, plan_seed};
use crate::rowstore::RowStore;
use crate::synthesizer::ValueSynthesizer;

/// Entry point for seeding a database described by a schema.
#[derive(Debug)]
pub struct SeedEngine {
    options: SeedOptions,
    registry: GeneratorRegistry,
}

impl SeedEngine {
    pub fn new(options: SeedOptions) -> Self {
        Self {
            options,
            registry: GeneratorRegistry::new(),
        }
    }

    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &SeedOptions {
        &self.options
    }

    /// Validate the schema and derive the seeding plan without touching a store.
    pub fn plan(&self, schema: &dbseed_core::SeedSchema) -> Result<SeedPlan, SeedError> {
        validate_schema(schema)?;
        let graph = build_graph(&schema.tables);
        plan_seed(schema, &graph, &self.options)
    }

    /// Seed every planned table in dependency order.
    ///
    /// A cycle or invalid schema aborts before anything is inserted. Row-level
    /// failures stop the affected table only and are recorded in the report.
    pub fn run(
        &self,
        schema: &dbseed_core::SeedSchema,
        store: &mut dyn RowStore,
    ) -> Result<SeedReport, SeedError> {
        let start = Instant::now();
        let plan = self.plan(schema)?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self.options.seed.unwrap_or_else(time_seed);
        let base_time = self.options.base_time.unwrap_or_else(current_time);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let synthesizer = ValueSynthesizer::new(&self.registry, &self.options, base_time);
        let mut report = SeedReport::new(run_id.clone(), seed, plan.order());

        info!(
            run_id = %run_id,
            tables = plan.steps().count(),
            blocked = plan.blocked().count(),
            seed,
            "seeding started"
        );

        for entry in &plan.entries {
            match entry.action {
                PlanAction::Blocked => {
                    info!(table = %entry.table, "table blocked, not seeding");
                    report.record_table(TableReport::blocked(&entry.table));
                }
                PlanAction::External => {
                    debug!(table = %entry.table, "table not described, not seeding");
                }
                PlanAction::Seed { rows } => {
                    let Some(table) = schema.table(&entry.table) else {
                        continue;
                    };
                    let table_report =
                        seed_table(table, rows, &synthesizer, store, &mut rng, &mut report);
                    report.record_table(table_report);
                }
            }
        }

        info!(
            run_id = %run_id,
            tables_seeded = report.tables_seeded,
            tables_attempted = report.tables_attempted,
            rows_inserted = report.rows_inserted,
            duration_ms = start.elapsed().as_millis() as u64,
            "seeded {} of {} tables",
            report.tables_seeded,
            report.tables_attempted
        );

        Ok(report)
    }
}

fn seed_table(
    table: &TableDescriptor,
    rows: u32,
    synthesizer: &ValueSynthesizer<'_>,
    store: &mut dyn RowStore,
    rng: &mut dyn RngCore,
    report: &mut SeedReport,
) -> TableReport {
    info!(table = %table.name, rows, "seeding table");

    let mut inserted = 0_u32;
    let mut fallback_columns = BTreeSet::new();
    let mut outcome: Result<TableStatus, SeedError> = Ok(TableStatus::Seeded);

    for row_index in 0..rows {
        let row = match synthesizer.synthesize_row(table, store, rng) {
            Ok(row) => row,
            Err(err) => {
                outcome = Err(err);
                break;
            }
        };

        if row.is_empty() {
            warn!(
                table = %table.name,
                "skipped seeding: no values were generated"
            );
            outcome = Ok(TableStatus::Empty);
            break;
        }

        for column in &row.fallbacks {
            report.record_fallback();
            fallback_columns.insert(column.clone());
        }

        if let Err(err) = store.insert(&row.into_insert(&table.name)) {
            outcome = Err(err.into());
            break;
        }
        inserted += 1;
        debug!(table = %table.name, row = row_index, "row inserted");
    }

    for column in fallback_columns {
        report.record_warning(SeedIssue {
            level: "warning".to_string(),
            code: "unhandled_type".to_string(),
            message: "no generation rule for column type; fallback value used".to_string(),
            table: Some(table.name.clone()),
            column: Some(column),
        });
    }

    match outcome {
        Ok(status) => {
            info!(table = %table.name, rows_inserted = inserted, ?status, "table finished");
            TableReport {
                table: table.name.clone(),
                status,
                rows_requested: rows,
                rows_inserted: inserted,
                error: None,
            }
        }
        Err(err) => {
            let status = if inserted == 0 {
                TableStatus::Failed
            } else {
                TableStatus::Partial
            };
            warn!(
                table = %table.name,
                rows_inserted = inserted,
                rows_requested = rows,
                code = err.code(),
                error = %err,
                "table seeding stopped"
            );
            report.record_warning(SeedIssue {
                level: "error".to_string(),
                code: err.code().to_string(),
                message: err.to_string(),
                table: Some(table.name.clone()),
                column: None,
            });
            TableReport {
                table: table.name.clone(),
                status,
                rows_requested: rows,
                rows_inserted: inserted,
                error: Some(err.to_string()),
            }
        }
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn current_time() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}
