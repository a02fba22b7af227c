use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dbseed_core::DEFAULT_SEED_COUNT;
use dbseed_generate::SeedOptions;
use dbseed_postgres::PgTarget;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Contents of `seed.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub block_list: Vec<String>,
    pub default_rows: Option<u32>,
    pub seed: Option<u64>,
    pub tables: BTreeMap<String, TableConfig>,
    pub audit: AuditConfig,
    pub target: PgTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub rows: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub timestamp_columns: Vec<String>,
    pub actor_columns: Vec<String>,
    pub actor_sentinel: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        let defaults = SeedOptions::default();
        Self {
            timestamp_columns: defaults.audit_timestamp_columns,
            actor_columns: defaults.audit_actor_columns,
            actor_sentinel: defaults.actor_sentinel,
        }
    }
}

impl SeedConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_options(&self) -> SeedOptions {
        SeedOptions {
            block_list: self.block_list.iter().cloned().collect::<BTreeSet<_>>(),
            default_rows: self.default_rows.unwrap_or(DEFAULT_SEED_COUNT),
            table_rows: self
                .tables
                .iter()
                .filter_map(|(name, table)| table.rows.map(|rows| (name.clone(), rows)))
                .collect(),
            seed: self.seed,
            base_time: None,
            audit_timestamp_columns: self.audit.timestamp_columns.clone(),
            audit_actor_columns: self.audit.actor_columns.clone(),
            actor_sentinel: self.audit.actor_sentinel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = SeedConfig::parse(
            r#"
block_list = ["Roles", "Migrations"]
default_rows = 5
seed = 42

[tables.Users]
rows = 10

[audit]
timestamp_columns = ["inserted_at"]
actor_columns = ["owner_id"]
actor_sentinel = 7

[target]
host = "localhost"
port = 5433
database = "shop"
username = "seed"
password = "secret"
"#,
        )
        .expect("parse config");

        let options = config.to_options();
        assert!(options.is_blocked("Roles"));
        assert_eq!(options.default_rows, 5);
        assert_eq!(options.table_rows.get("Users"), Some(&10));
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.audit_timestamp_columns, vec!["inserted_at".to_string()]);
        assert_eq!(options.actor_sentinel, 7);
        assert_eq!(config.target.port, Some(5433));
    }

    #[test]
    fn empty_config_keeps_defaults() {
        let options = SeedConfig::parse("").expect("parse config").to_options();
        assert_eq!(options.default_rows, DEFAULT_SEED_COUNT);
        assert!(options.block_list.is_empty());
        assert_eq!(
            options.audit_actor_columns,
            vec!["createdBy".to_string(), "updatedBy".to_string()]
        );
        assert!(SeedConfig::default().target.is_empty());
    }

    #[test]
    fn rejects_unknown_value_types() {
        assert!(matches!(
            SeedConfig::parse("default_rows = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
