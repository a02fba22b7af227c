use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::LogicalType;

/// Rows synthesized per table when nothing else is configured.
pub const DEFAULT_SEED_COUNT: u32 = 3;

/// Top-level schema description consumed by the seeding engine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SeedSchema {
    /// Contract version for this document format.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Database the description was read from, when known.
    #[serde(default)]
    pub database: Option<String>,
    /// Tables, deduplicated by name, in declaration order.
    pub tables: Vec<TableDescriptor>,
}

impl SeedSchema {
    pub fn new(tables: Vec<TableDescriptor>) -> Self {
        Self {
            schema_version: default_schema_version(),
            database: None,
            tables,
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|table| table.name == name)
    }
}

fn default_schema_version() -> String {
    crate::SCHEMA_VERSION.to_string()
}

/// A table to be populated with synthetic rows.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Rows to synthesize; falls back to the run default when absent.
    #[serde(default, alias = "seedCount", skip_serializing_if = "Option::is_none")]
    pub seed_count: Option<u32>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
            seed_count: None,
        }
    }

    pub fn with_seed_count(mut self, seed_count: u32) -> Self {
        self.seed_count = Some(seed_count);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Foreign-key columns that point back at this same table.
    pub fn self_referencing_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|column| column.is_self_reference(&self.name))
    }
}

/// Column metadata for a table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Raw database type name (e.g. `nvarchar(255)`, `integer`).
    #[serde(alias = "type")]
    pub data_type: String,
    #[serde(default, alias = "isPrimaryKey")]
    pub is_primary_key: bool,
    #[serde(default, alias = "referencedTable", skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,
    #[serde(default, alias = "referencedColumn", skip_serializing_if = "Option::is_none")]
    pub referenced_column: Option<String>,
    #[serde(default, alias = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Database-side default; a non-empty value means the database can supply it.
    #[serde(default, alias = "defaultExpression", skip_serializing_if = "Option::is_none")]
    pub default_expression: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            referenced_table: None,
            referenced_column: None,
            max_length: None,
            default_expression: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.referenced_table = Some(table.into());
        self.referenced_column = Some(column.into());
        self
    }

    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = Some(expression.into());
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn logical_type(&self) -> LogicalType {
        LogicalType::parse(&self.data_type)
    }

    /// Referenced table, ignoring empty strings left by introspection.
    pub fn referenced_table(&self) -> Option<&str> {
        non_empty(self.referenced_table.as_deref())
    }

    pub fn referenced_column(&self) -> Option<&str> {
        non_empty(self.referenced_column.as_deref())
    }

    pub fn is_foreign_key(&self) -> bool {
        self.referenced_table().is_some() && self.referenced_column().is_some()
    }

    pub fn has_default(&self) -> bool {
        non_empty(self.default_expression.as_deref()).is_some()
    }

    pub fn is_self_reference(&self, table: &str) -> bool {
        self.is_foreign_key() && self.referenced_table() == Some(table)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Normalize a column name for convention lookups (`created_at` == `createdAt`).
pub fn normalize_column_name(name: &str) -> String {
    name.chars()
        .filter(|ch| *ch != '_' && *ch != '-' && !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
