mod config;
mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use dbseed_core::{SCHEMA_VERSION, SeedSchema, build_graph_report};
use dbseed_generate::{InMemoryRowStore, RowStore, SeedEngine, SeedError, SeedOptions};
use dbseed_postgres::{PgRowStore, PgStoreError, PgTarget};
use registry::{RunContext, init_logging, start_run, write_report, write_table_csvs};
use schemars::schema_for;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ConfigError, SeedConfig};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Seed(#[from] SeedError),
    #[error("database error: {0}")]
    Database(#[from] PgStoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "dbseed", version, about = "Dependency-aware database seeding")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dependency graph and seed plan without inserting anything.
    Plan(PlanArgs),
    /// Insert synthetic rows into every table in dependency order.
    Seed(SeedArgs),
    /// Print the JSON Schema of the schema description format.
    JsonSchema(JsonSchemaArgs),
}

#[derive(Args, Debug)]
struct SchemaSource {
    /// Path to the schema description (JSON).
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
    /// Optional seed.toml with block-list, row counts and target.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Table to leave unseeded (repeatable).
    #[arg(long = "block", value_name = "TABLE")]
    block: Vec<String>,
    /// Rows per table when not configured per table.
    #[arg(long, value_name = "N")]
    rows: Option<u32>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    source: SchemaSource,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[command(flatten)]
    source: SchemaSource,
    /// Target database connection string.
    #[arg(long, env = "DBSEED_DATABASE_URL", value_name = "CONNECTION_STRING")]
    conn: Option<String>,
    /// Seed an in-memory store and export CSVs instead of touching a database.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Fixed random seed for reproducible data.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct JsonSchemaArgs {
    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Seed(args) => run_seed(args),
        Command::JsonSchema(args) => run_json_schema(args),
    }
}

fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    init_logging(None)?;
    let (schema, config) = load_inputs(&args.source)?;
    let options = merge_options(&config, &args.source, None);

    let graph = build_graph_report(&schema.tables);
    let plan = match SeedEngine::new(options).plan(&schema) {
        Ok(plan) => Some(plan),
        Err(SeedError::CyclicDependency { .. }) => None,
        Err(err) => return Err(err.into()),
    };

    let output = serde_json::json!({ "graph": graph, "plan": plan });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(cycle) = graph.cycle {
        return Err(SeedError::CyclicDependency { cycle }.into());
    }
    Ok(())
}

fn run_seed(args: SeedArgs) -> Result<(), CliError> {
    let SeedArgs {
        source,
        conn,
        dry_run,
        run_dir,
        seed,
    } = args;

    let (schema, config) = load_inputs(&source)?;
    let options = merge_options(&config, &source, seed);

    let target = match (dry_run, conn) {
        (true, _) => None,
        (false, Some(url)) => Some(PgTarget::from_url(url)),
        (false, None) if !config.target.is_empty() => Some(config.target.clone()),
        (false, None) => {
            return Err(CliError::InvalidConfig(
                "connection string is required (use --conn, DBSEED_DATABASE_URL, [target] or --dry-run)"
                    .to_string(),
            ));
        }
    };

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir,
        schema_path: source.schema.clone(),
        schema_version: schema.schema_version.clone(),
        dry_run,
        target: target.as_ref().map(PgTarget::redacted),
        options: options.clone(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_logging(Some(&run_paths.logs_path))?;

    tracing::info!(event = "run_started", run_id = %run_id, dry_run, tables = schema.tables.len());
    if schema.schema_version != SCHEMA_VERSION {
        tracing::warn!(
            event = "schema_version_mismatch",
            found = %schema.schema_version,
            expected = SCHEMA_VERSION
        );
    }

    let timer = Instant::now();
    let engine = SeedEngine::new(options);

    let report = match target {
        None => {
            let mut store = InMemoryRowStore::from_schema(&schema);
            let report = seed_with(&engine, &schema, &mut store)?;
            let bytes = write_table_csvs(&run_paths, &schema, &store)?;
            tracing::info!(event = "csv_written", bytes, dir = %run_paths.root.display());
            report
        }
        Some(target) => {
            let mut store = PgRowStore::connect(&target)?;
            let report = seed_with(&engine, &schema, &mut store)?;
            store.close();
            report
        }
    };

    write_report(&run_paths, &report)?;

    println!(
        "Seeded {} of {} tables ({} rows) -> {}",
        report.tables_seeded,
        report.tables_attempted,
        report.rows_inserted,
        run_paths.root.display()
    );
    for (table, error) in report.failures() {
        eprintln!("  {table}: {error}");
    }

    let status = if report.is_complete() {
        "success"
    } else {
        "partial"
    };
    tracing::info!(
        event = "run_finished",
        status,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    Ok(())
}

fn seed_with(
    engine: &SeedEngine,
    schema: &SeedSchema,
    store: &mut dyn RowStore,
) -> Result<dbseed_generate::SeedReport, CliError> {
    engine.run(schema, store).map_err(|err| {
        tracing::error!(event = "run_aborted", code = err.code(), error = %err);
        CliError::from(err)
    })
}

fn run_json_schema(args: JsonSchemaArgs) -> Result<(), CliError> {
    let schema = schema_for!(SeedSchema);
    let json = serde_json::to_string_pretty(&schema)?;
    match args.out {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn load_inputs(source: &SchemaSource) -> Result<(SeedSchema, SeedConfig), CliError> {
    let schema = load_schema(&source.schema)?;
    let config = match source.config.as_deref() {
        Some(path) => SeedConfig::load(path)?,
        None => SeedConfig::default(),
    };
    Ok((schema, config))
}

fn load_schema(path: &Path) -> Result<SeedSchema, CliError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Config file values, overridden by command-line flags.
fn merge_options(config: &SeedConfig, source: &SchemaSource, seed: Option<u64>) -> SeedOptions {
    let mut options = config.to_options();
    options.block_list.extend(source.block.iter().cloned());
    if let Some(rows) = source.rows {
        options.default_rows = rows;
    }
    if seed.is_some() {
        options.seed = seed;
    }
    options
}
