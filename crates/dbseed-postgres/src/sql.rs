//! SQL text for row-store queries.
//!
//! Identifiers are validated and quoted; values are always bound as `$n`
//! parameters except NULL, which is written as a literal.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use dbseed_core::{LogicalType, Result, quote_identifier};
use dbseed_generate::{InsertStatement, SeedValue};

pub fn max_value_sql(table: &str, column: &str) -> Result<String> {
    let table = quote_identifier(table)?;
    let column = quote_identifier(column)?;
    Ok(format!("SELECT MAX({column})::bigint FROM {table}"))
}

/// Number of non-null values, used to pick a random offset.
pub fn count_values_sql(table: &str, column: &str) -> Result<String> {
    let table = quote_identifier(table)?;
    let column = quote_identifier(column)?;
    Ok(format!(
        "SELECT COUNT({column}) FROM {table} WHERE {column} IS NOT NULL"
    ))
}

/// Value at offset `$1` among non-null values, with its type name.
pub fn value_at_offset_sql(table: &str, column: &str) -> Result<String> {
    let table = quote_identifier(table)?;
    let column = quote_identifier(column)?;
    Ok(format!(
        "SELECT {column}::text, pg_typeof({column})::text FROM {table} \
         WHERE {column} IS NOT NULL ORDER BY {column}::text OFFSET $1 LIMIT 1"
    ))
}

/// Render an insert and the values to bind, in placeholder order.
pub fn insert_sql(statement: &InsertStatement) -> Result<(String, Vec<&SeedValue>)> {
    let table = quote_identifier(&statement.table)?;
    if statement.columns.is_empty() {
        return Ok((format!("INSERT INTO {table} DEFAULT VALUES"), Vec::new()));
    }

    let mut names = Vec::with_capacity(statement.columns.len());
    let mut placeholders = Vec::with_capacity(statement.columns.len());
    let mut binds = Vec::new();

    for column in &statement.columns {
        names.push(quote_identifier(&column.name)?);
        if column.value.is_null() {
            placeholders.push("NULL".to_string());
            continue;
        }
        binds.push(&column.value);
        placeholders.push(format!(
            "${}{}",
            binds.len(),
            cast_for(column.logical_type, &column.value)
        ));
    }

    Ok((
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            names.join(", "),
            placeholders.join(", ")
        ),
        binds,
    ))
}

/// Explicit casts for types with no assignment cast from the bound type.
fn cast_for(logical: LogicalType, value: &SeedValue) -> &'static str {
    match (logical, value) {
        (LogicalType::Xml, SeedValue::Text(_)) => "::xml",
        (LogicalType::Geometry, SeedValue::Text(_)) => "::geometry",
        (LogicalType::Money, SeedValue::Float(_)) => "::numeric",
        (LogicalType::Json, _) => "::json",
        _ => "",
    }
}

/// Decode a value read back as text, using the name from `pg_typeof`.
pub fn decode_text_value(text: &str, type_name: &str) -> SeedValue {
    let decoded = match type_name {
        "smallint" | "integer" | "bigint" => text.parse().ok().map(SeedValue::Int),
        "real" | "double precision" | "numeric" => text.parse().ok().map(SeedValue::Float),
        "boolean" => match text {
            "true" | "t" => Some(SeedValue::Bool(true)),
            "false" | "f" => Some(SeedValue::Bool(false)),
            _ => None,
        },
        "uuid" => uuid::Uuid::parse_str(text).ok().map(SeedValue::Uuid),
        "json" | "jsonb" => serde_json::from_str(text).ok().map(SeedValue::Json),
        "date" => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(SeedValue::Date),
        "time without time zone" => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .ok()
            .map(SeedValue::Time),
        "timestamp without time zone" => {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(SeedValue::Timestamp)
        }
        _ => None,
    };
    decoded.unwrap_or_else(|| SeedValue::Text(text.to_string()))
}
