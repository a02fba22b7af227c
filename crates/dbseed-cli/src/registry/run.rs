use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use dbseed_core::{SeedSchema, validate_identifier};
use dbseed_generate::output::csv::write_table_csv;
use dbseed_generate::{InMemoryRowStore, SeedOptions, SeedReport};

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub schema_path: PathBuf,
    pub schema_version: String,
    pub dry_run: bool,
    /// Redacted connection description; `None` for dry runs.
    pub target: Option<String>,
    pub options: SeedOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    schema_path: String,
    schema_version: &'a str,
    dry_run: bool,
    target: Option<&'a str>,
    options: &'a SeedOptions,
    git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
struct GitInfo {
    commit: Option<String>,
    dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");
    let report_path = root.join("report.json");

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        schema_path: ctx.schema_path.display().to_string(),
        schema_version: &ctx.schema_version,
        dry_run: ctx.dry_run,
        target: ctx.target.as_deref(),
        options: &ctx.options,
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        logs_path,
        report_path,
    })
}

pub fn write_report(paths: &RunPaths, report: &SeedReport) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

/// Export every described table held by an in-memory store as `<table>.csv`.
pub fn write_table_csvs(
    paths: &RunPaths,
    schema: &SeedSchema,
    store: &InMemoryRowStore,
) -> RegistryResult<u64> {
    let mut bytes = 0_u64;
    for table in &schema.tables {
        // Table names become file names.
        validate_identifier(&table.name)?;
        let path = paths.root.join(format!("{}.csv", table.name));
        bytes += write_table_csv(&path, table, store.rows(&table.name))
            .map_err(dbseed_generate::SeedError::from)?;
    }
    Ok(bytes)
}

fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
