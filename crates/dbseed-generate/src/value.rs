use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A single synthesized or stored column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(uuid::Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl SeedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SeedValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SeedValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SeedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Text form used for CSV output and logs. NULL renders as an empty string.
    pub fn render(&self) -> String {
        match self {
            SeedValue::Null => String::new(),
            SeedValue::Bool(value) => value.to_string(),
            SeedValue::Int(value) => value.to_string(),
            SeedValue::Float(value) => value.to_string(),
            SeedValue::Text(value) => value.clone(),
            SeedValue::Uuid(value) => value.to_string(),
            SeedValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            SeedValue::Time(value) => value.format("%H:%M:%S").to_string(),
            SeedValue::Timestamp(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
            SeedValue::Json(value) => value.to_string(),
            SeedValue::Bytes(bytes) => format!("\\x{}", hex::encode(bytes)),
        }
    }
}

impl fmt::Display for SeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedValue::Null => f.write_str("NULL"),
            other => f.write_str(&other.render()),
        }
    }
}
