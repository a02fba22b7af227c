use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Logical database type of a column, normalized across engines.
///
/// Parsed from the raw type name reported by introspection. Both SQL Server
/// (`nvarchar`, `datetime2`, `uniqueidentifier`) and PostgreSQL
/// (`character varying`, `timestamptz`, `uuid`) spellings are recognized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Boolean,
    Float,
    Decimal,
    Money,
    Text,
    Char,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Binary,
    Json,
    Xml,
    Geometry,
    Unknown,
}

impl LogicalType {
    /// Every known type, in a stable order.
    pub const ALL: &'static [LogicalType] = &[
        LogicalType::TinyInt,
        LogicalType::SmallInt,
        LogicalType::Integer,
        LogicalType::BigInt,
        LogicalType::Boolean,
        LogicalType::Float,
        LogicalType::Decimal,
        LogicalType::Money,
        LogicalType::Text,
        LogicalType::Char,
        LogicalType::Date,
        LogicalType::Time,
        LogicalType::Timestamp,
        LogicalType::TimestampTz,
        LogicalType::Uuid,
        LogicalType::Binary,
        LogicalType::Json,
        LogicalType::Xml,
        LogicalType::Geometry,
        LogicalType::Unknown,
    ];

    /// Parse a raw database type name such as `nvarchar(255)` or `int4`.
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_type_name(raw);
        match normalized.as_str() {
            "tinyint" => Self::TinyInt,
            "smallint" | "int2" | "smallserial" => Self::SmallInt,
            "int" | "integer" | "int4" | "serial" | "mediumint" => Self::Integer,
            "bigint" | "int8" | "bigserial" => Self::BigInt,
            "bit" | "bool" | "boolean" => Self::Boolean,
            "float" | "real" | "double" | "double precision" | "float4" | "float8" => Self::Float,
            "decimal" | "numeric" => Self::Decimal,
            "money" | "smallmoney" => Self::Money,
            "varchar" | "nvarchar" | "text" | "ntext" | "character varying" | "citext"
            | "string" | "sysname" => Self::Text,
            "char" | "nchar" | "character" | "bpchar" => Self::Char,
            "date" => Self::Date,
            "time" | "time without time zone" | "time with time zone" | "timetz" => Self::Time,
            "datetime" | "datetime2" | "smalldatetime" | "timestamp"
            | "timestamp without time zone" => Self::Timestamp,
            "datetimeoffset" | "timestamptz" | "timestamp with time zone" => Self::TimestampTz,
            "uuid" | "uniqueidentifier" => Self::Uuid,
            "binary" | "varbinary" | "image" | "bytea" | "blob" => Self::Binary,
            "json" | "jsonb" => Self::Json,
            "xml" => Self::Xml,
            "geometry" | "geography" | "point" | "polygon" | "linestring" => Self::Geometry,
            _ => Self::Unknown,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }

    pub fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Char)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TinyInt => "tiny_int",
            Self::SmallInt => "small_int",
            Self::Integer => "integer",
            Self::BigInt => "big_int",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Money => "money",
            Self::Text => "text",
            Self::Char => "char",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamp_tz",
            Self::Uuid => "uuid",
            Self::Binary => "binary",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Geometry => "geometry",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, strip a `(...)` size suffix and a `schema.` qualifier.
fn normalize_type_name(raw: &str) -> String {
    let base = raw.split('(').next().unwrap_or(raw).trim().to_lowercase();
    let base = base.trim_start_matches("pg_catalog.");
    base.trim_start_matches("public.").trim().to_string()
}
