//! SQL identifier handling.
//!
//! Table and column names come from schema metadata and end up inside SQL
//! text, where they cannot be bound as parameters. They are checked against
//! a strict pattern and quoted before use.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// PostgreSQL truncates identifiers beyond this many bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

fn is_valid_part(part: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").ok())
        .as_ref()
        .map(|re| part.len() <= MAX_IDENTIFIER_LEN && re.is_match(part))
        .unwrap_or(false)
}

/// Validate a possibly schema-qualified identifier (`table` or `schema.table`).
pub fn validate_identifier(name: &str) -> Result<()> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    for part in parts {
        if !is_valid_part(part) {
            return Err(Error::InvalidIdentifier(name.to_string()));
        }
    }
    Ok(())
}

/// Validate and double-quote an identifier, quoting each dotted part.
pub fn quote_identifier(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(name
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join("."))
}
