use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use dbseed_core::{LogicalType, SeedSchema};

use crate::value::SeedValue;

/// One stored row keyed by column name.
pub type Row = BTreeMap<String, SeedValue>;

/// A column bound to a value in an insert.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    pub name: String,
    pub logical_type: LogicalType,
    pub value: SeedValue,
}

/// One parameterized insert: table name, ordered columns and their values.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<BoundColumn>,
}

/// Errors raised by a row-store while querying or inserting.
#[derive(Debug, Error)]
pub enum RowStoreError {
    #[error("invalid identifier: {0}")]
    Identifier(#[from] dbseed_core::Error),
    #[error("query on {table} failed: {message}")]
    Query { table: String, message: String },
    #[error("insert into {table} failed: {message}")]
    Insert { table: String, message: String },
}

/// Query and insert access to the target database.
///
/// Calls are synchronous; the seeding engine issues them one at a time in
/// table order.
pub trait RowStore {
    /// Current maximum integer value of `column`, or `None` when `table` is empty.
    fn max_value(&mut self, table: &str, column: &str) -> Result<Option<i64>, RowStoreError>;

    /// One existing non-null value of `column`, chosen uniformly at random.
    fn random_value(
        &mut self,
        table: &str,
        column: &str,
        rng: &mut dyn RngCore,
    ) -> Result<Option<SeedValue>, RowStoreError>;

    fn insert(&mut self, statement: &InsertStatement) -> Result<(), RowStoreError>;
}

#[derive(Debug, Default)]
struct StoredTable {
    /// Known columns; empty when the table was not registered from a schema.
    columns: Vec<String>,
    /// Columns the database would fill in when omitted.
    defaults: Vec<(String, LogicalType)>,
    rows: Vec<Row>,
}

/// Row-store kept entirely in memory.
///
/// Used for dry runs and tests. When built from a schema it fills omitted
/// columns that carry a default expression the way a database would: an
/// increasing sequence for integer columns, UUIDs, the base timestamp for
/// date/time columns and NULL otherwise.
#[derive(Debug)]
pub struct InMemoryRowStore {
    tables: BTreeMap<String, StoredTable>,
    base_time: NaiveDateTime,
    rng: ChaCha8Rng,
}

impl Default for InMemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRowStore {
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
            base_time: NaiveDateTime::default(),
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    pub fn from_schema(schema: &SeedSchema) -> Self {
        let mut store = Self::new();
        for table in &schema.tables {
            let stored = store.tables.entry(table.name.clone()).or_default();
            stored.columns = table.columns.iter().map(|col| col.name.clone()).collect();
            stored.defaults = table
                .columns
                .iter()
                .filter(|col| col.has_default())
                .map(|col| (col.name.clone(), col.logical_type()))
                .collect();
        }
        store
    }

    pub fn with_base_time(mut self, base_time: NaiveDateTime) -> Self {
        self.base_time = base_time;
        self
    }

    /// Pre-populate a table, e.g. with the administrative account that actor
    /// audit columns point at.
    pub fn seed_rows(&mut self, table: &str, rows: Vec<Row>) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .rows
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables
            .get(table)
            .map(|stored| stored.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    /// Non-null values of one column, in insertion order.
    pub fn column_values(&self, table: &str, column: &str) -> Vec<&SeedValue> {
        self.rows(table)
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|value| !value.is_null())
            .collect()
    }

    fn database_default(
        &mut self,
        table: &str,
        column: &str,
        logical: LogicalType,
    ) -> Result<SeedValue, RowStoreError> {
        let value = match logical {
            logical if logical.is_integer() => {
                let current = max_int(self.rows(table), column).unwrap_or(0);
                let next = current.checked_add(1).ok_or_else(|| RowStoreError::Insert {
                    table: table.to_string(),
                    message: format!("identity overflow on column {column}"),
                })?;
                SeedValue::Int(next)
            }
            LogicalType::Uuid => {
                let mut bytes = [0_u8; 16];
                self.rng.fill_bytes(&mut bytes);
                SeedValue::Uuid(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }
            LogicalType::Date => SeedValue::Date(self.base_time.date()),
            LogicalType::Time => SeedValue::Time(self.base_time.time()),
            LogicalType::Timestamp | LogicalType::TimestampTz => {
                SeedValue::Timestamp(self.base_time)
            }
            _ => SeedValue::Null,
        };
        Ok(value)
    }
}

impl RowStore for InMemoryRowStore {
    fn max_value(&mut self, table: &str, column: &str) -> Result<Option<i64>, RowStoreError> {
        Ok(max_int(self.rows(table), column))
    }

    fn random_value(
        &mut self,
        table: &str,
        column: &str,
        rng: &mut dyn RngCore,
    ) -> Result<Option<SeedValue>, RowStoreError> {
        let values = self.column_values(table, column);
        if values.is_empty() {
            return Ok(None);
        }
        let idx = rng.random_range(0..values.len());
        Ok(values.get(idx).map(|value| (*value).clone()))
    }

    fn insert(&mut self, statement: &InsertStatement) -> Result<(), RowStoreError> {
        let (known, defaults) = match self.tables.get(&statement.table) {
            Some(stored) => (stored.columns.clone(), stored.defaults.clone()),
            None => (Vec::new(), Vec::new()),
        };

        let mut row = Row::new();
        for column in &statement.columns {
            if !known.is_empty() && !known.contains(&column.name) {
                return Err(RowStoreError::Insert {
                    table: statement.table.clone(),
                    message: format!("unknown column {}", column.name),
                });
            }
            row.insert(column.name.clone(), column.value.clone());
        }

        for (column, logical) in defaults {
            if row.contains_key(&column) {
                continue;
            }
            let value = self.database_default(&statement.table, &column, logical)?;
            row.insert(column, value);
        }

        self.tables
            .entry(statement.table.clone())
            .or_default()
            .rows
            .push(row);
        Ok(())
    }
}

fn max_int(rows: &[Row], column: &str) -> Option<i64> {
    rows.iter()
        .filter_map(|row| row.get(column).and_then(SeedValue::as_i64))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbseed_core::{ColumnDescriptor, TableDescriptor};

    fn users_schema() -> SeedSchema {
        SeedSchema::new(vec![TableDescriptor::new(
            "Users",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
                ColumnDescriptor::new("name", "varchar"),
            ],
        )])
    }

    fn insert_name(store: &mut InMemoryRowStore, name: &str) {
        let statement = InsertStatement {
            table: "Users".to_string(),
            columns: vec![BoundColumn {
                name: "name".to_string(),
                logical_type: LogicalType::Text,
                value: SeedValue::Text(name.to_string()),
            }],
        };
        store.insert(&statement).expect("insert");
    }

    #[test]
    fn identity_overflow_fails_the_insert() {
        let mut store = InMemoryRowStore::from_schema(&users_schema());
        let mut existing = Row::new();
        existing.insert("id".to_string(), SeedValue::Int(i64::MAX));
        store.seed_rows("Users", vec![existing]);

        let statement = InsertStatement {
            table: "Users".to_string(),
            columns: Vec::new(),
        };
        assert!(matches!(
            store.insert(&statement),
            Err(RowStoreError::Insert { ref table, .. }) if table == "Users"
        ));
        assert_eq!(store.row_count("Users"), 1);
    }

    #[test]
    fn identity_defaults_increase() {
        let mut store = InMemoryRowStore::from_schema(&users_schema());
        insert_name(&mut store, "a");
        insert_name(&mut store, "b");
        let ids: Vec<i64> = store
            .column_values("Users", "id")
            .into_iter()
            .filter_map(SeedValue::as_i64)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.max_value("Users", "id").expect("max"), Some(2));
    }

    #[test]
    fn empty_table_has_no_values() {
        let mut store = InMemoryRowStore::from_schema(&users_schema());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(store.max_value("Users", "id").expect("max"), None);
        assert!(
            store
                .random_value("Users", "id", &mut rng)
                .expect("query")
                .is_none()
        );
        assert!(
            store
                .random_value("Unknown", "id", &mut rng)
                .expect("query")
                .is_none()
        );
    }

    #[test]
    fn rejects_unknown_columns() {
        let mut store = InMemoryRowStore::from_schema(&users_schema());
        let statement = InsertStatement {
            table: "Users".to_string(),
            columns: vec![BoundColumn {
                name: "missing".to_string(),
                logical_type: LogicalType::Text,
                value: SeedValue::Null,
            }],
        };
        assert!(matches!(
            store.insert(&statement),
            Err(RowStoreError::Insert { .. })
        ));
    }
}
