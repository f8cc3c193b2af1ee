use crate::flatten::table::Table;
use anyhow::{Context, Result};
use std::io::Write;

/// Writes table rows as JSON Lines, one object per row with every column present
pub struct JsonLinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesWriter { writer }
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        for row in table.rows() {
            let json = serde_json::to_string(&row.to_value())
                .context("Failed to serialize row")?;
            writeln!(self.writer, "{}", json)
                .context("Failed to write row")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}

/// Writes a table as CSV with a header row
///
/// Absent cells and explicit nulls are both written as empty fields.
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        CsvWriter {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        self.writer
            .write_record(table.columns())
            .context("Failed to write CSV header")?;

        for row in table.rows() {
            let fields = row.cells().iter().map(|cell| match cell {
                Some(scalar) if !scalar.is_null() => scalar.to_string(),
                _ => String::new(),
            });
            self.writer
                .write_record(fields)
                .context("Failed to write CSV row")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush CSV writer")
    }
}
