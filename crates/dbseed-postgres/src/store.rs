use std::time::Duration;

use rand::{Rng, RngCore};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use dbseed_generate::{InsertStatement, RowStore, RowStoreError, SeedValue};

use crate::error::PgStoreError;
use crate::sql::{
    count_values_sql, decode_text_value, insert_sql, max_value_sql, value_at_offset_sql,
};
use crate::target::PgTarget;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Row-store backed by one PostgreSQL connection.
///
/// Seeding is strictly sequential, so the pool holds a single connection and
/// every call blocks on the private runtime until the statement completes.
pub struct PgRowStore {
    runtime: Runtime,
    pool: PgPool,
}

impl std::fmt::Debug for PgRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRowStore").finish_non_exhaustive()
    }
}

impl PgRowStore {
    /// Connect to `target`. Must not be called from inside an async runtime.
    pub fn connect(target: &PgTarget) -> Result<Self, PgStoreError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let options = target.connect_options()?;
        let pool = runtime.block_on(
            PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect_with(options),
        )?;
        info!(target = %target.redacted(), "connected to target database");
        Ok(Self { runtime, pool })
    }

    /// Run a multi-statement SQL script, e.g. a fixture, in one round trip.
    /// Statement splitting is left to the server, so semicolons inside
    /// literals or function bodies are safe.
    pub fn execute_script(&mut self, script: &str) -> Result<(), PgStoreError> {
        self.runtime
            .block_on(sqlx::raw_sql(script).execute(&self.pool))?;
        Ok(())
    }

    pub fn close(self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl RowStore for PgRowStore {
    fn max_value(&mut self, table: &str, column: &str) -> Result<Option<i64>, RowStoreError> {
        let sql = max_value_sql(table, column)?;
        debug!(sql = %sql, "max value");
        self.runtime
            .block_on(sqlx::query_scalar::<_, Option<i64>>(&sql).fetch_one(&self.pool))
            .map_err(|err| query_error(table, err))
    }

    fn random_value(
        &mut self,
        table: &str,
        column: &str,
        rng: &mut dyn RngCore,
    ) -> Result<Option<SeedValue>, RowStoreError> {
        let count_sql = count_values_sql(table, column)?;
        let count = self
            .runtime
            .block_on(sqlx::query_scalar::<_, i64>(&count_sql).fetch_one(&self.pool))
            .map_err(|err| query_error(table, err))?;
        if count <= 0 {
            return Ok(None);
        }

        let offset = rng.random_range(0..count);
        let sql = value_at_offset_sql(table, column)?;
        debug!(sql = %sql, offset, "random value");
        let row = self
            .runtime
            .block_on(
                sqlx::query_as::<_, (String, String)>(&sql)
                    .bind(offset)
                    .fetch_optional(&self.pool),
            )
            .map_err(|err| query_error(table, err))?;

        Ok(row.map(|(text, type_name)| decode_text_value(&text, &type_name)))
    }

    fn insert(&mut self, statement: &InsertStatement) -> Result<(), RowStoreError> {
        let (sql, values) = insert_sql(statement)?;
        debug!(sql = %sql, binds = values.len(), "insert");

        let mut query = sqlx::query(&sql);
        for value in values {
            query = bind_value(query, value);
        }

        self.runtime
            .block_on(query.execute(&self.pool))
            .map(|_| ())
            .map_err(|err| RowStoreError::Insert {
                table: statement.table.clone(),
                message: err.to_string(),
            })
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SeedValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SeedValue::Null => query.bind(Option::<String>::None),
        SeedValue::Bool(value) => query.bind(*value),
        SeedValue::Int(value) => query.bind(*value),
        SeedValue::Float(value) => query.bind(*value),
        SeedValue::Text(value) => query.bind(value.clone()),
        SeedValue::Uuid(value) => query.bind(*value),
        SeedValue::Date(value) => query.bind(*value),
        SeedValue::Time(value) => query.bind(*value),
        SeedValue::Timestamp(value) => query.bind(*value),
        SeedValue::Json(value) => query.bind(Json(value.clone())),
        SeedValue::Bytes(value) => query.bind(value.clone()),
    }
}

fn query_error(table: &str, err: sqlx::Error) -> RowStoreError {
    RowStoreError::Query {
        table: table.to_string(),
        message: err.to_string(),
    }
}
