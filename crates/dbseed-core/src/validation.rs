use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::SeedSchema;

/// Validate internal consistency of a schema description.
///
/// This checks:
/// - duplicate table names
/// - duplicate column names within a table
/// - foreign keys that name a referenced table without a column (or vice versa)
///
/// Tables referenced but not described are allowed; they are ordered like
/// any other table but never seeded.
pub fn validate_schema(schema: &SeedSchema) -> Result<()> {
    let mut tables = BTreeSet::new();

    for table in &schema.tables {
        if table.name.trim().is_empty() {
            return Err(Error::InvalidSchema("table with empty name".to_string()));
        }
        if !tables.insert(table.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}",
                table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {}.{}",
                    table.name, column.name
                )));
            }

            if column.referenced_table().is_some() != column.referenced_column().is_some() {
                return Err(Error::InvalidSchema(format!(
                    "foreign key {}.{} must name both a referenced table and column",
                    table.name, column.name
                )));
            }
        }
    }

    Ok(())
}
