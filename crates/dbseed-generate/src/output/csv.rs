use std::fs::File;
use std::path::Path;

use dbseed_core::TableDescriptor;

use crate::rowstore::Row;

/// CSV sink for one table. Columns follow descriptor declaration order and
/// absent or NULL values are written as empty fields.
pub struct TableCsvWriter<'a> {
    columns: Vec<&'a str>,
    writer: csv::Writer<File>,
}

impl<'a> TableCsvWriter<'a> {
    /// Create `path` and write the header record.
    pub fn create(path: &Path, table: &'a TableDescriptor) -> Result<Self, csv::Error> {
        let columns: Vec<&str> = table.columns.iter().map(|col| col.name.as_str()).collect();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(&columns)?;
        Ok(Self { columns, writer })
    }

    pub fn write_row(&mut self, row: &Row) -> Result<(), csv::Error> {
        let record = self
            .columns
            .iter()
            .map(|name| row.get(*name).map(|value| value.render()).unwrap_or_default());
        self.writer.write_record(record)
    }

    /// Flush and return the size of the written file in bytes.
    pub fn finish(self) -> Result<u64, csv::Error> {
        let file = self.writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        Ok(file.metadata()?.len())
    }
}

/// Write stored rows of `table` to `path`, returning bytes written.
pub fn write_table_csv(
    path: &Path,
    table: &TableDescriptor,
    rows: &[Row],
) -> Result<u64, csv::Error> {
    let mut writer = TableCsvWriter::create(path, table)?;
    for row in rows {
        writer.write_row(row)?;
    }
    writer.finish()
}
