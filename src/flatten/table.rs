use crate::error::Result;
use crate::flatten::extractor::Flattener;
use crate::types::{Cell, FlatRecord, FlattenConfig};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Rows aligned on the union of every record's path keys
///
/// Columns appear in first-seen order across the batch. A cell is `None`
/// when its record never had that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from already flattened records
    pub fn from_flat_records(records: Vec<FlatRecord>) -> Self {
        // First pass: the column set depends on every record
        let mut columns = Vec::new();
        let mut column_index = HashMap::new();
        for record in &records {
            for key in record.keys() {
                if !column_index.contains_key(key) {
                    column_index.insert(key.to_string(), columns.len());
                    columns.push(key.to_string());
                }
            }
        }

        // Second pass: align each record, leaving absent keys as None
        let rows = records
            .into_iter()
            .map(|record| {
                let mut cells: Vec<Cell> = vec![None; columns.len()];
                for (key, value) in record {
                    cells[column_index[&key]] = Some(value);
                }
                cells
            })
            .collect();

        Table {
            columns,
            column_index,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<RowView<'_>> {
        self.rows.get(idx).map(|cells| RowView { table: self, cells })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |cells| RowView { table: self, cells })
    }

    /// Keep only the columns whose name matches `pattern`
    pub fn select(&self, pattern: &Regex) -> Table {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| pattern.is_match(name))
            .map(|(idx, _)| idx)
            .collect();

        let columns: Vec<String> = keep.iter().map(|&idx| self.columns[idx].clone()).collect();
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|cells| keep.iter().map(|&idx| cells[idx].clone()).collect())
            .collect();

        Table {
            columns,
            column_index,
            rows,
        }
    }
}

/// A borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    /// The cell under `column`, or `None` if the table has no such column
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table.column_index(column).map(|idx| &self.cells[idx])
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> {
        self.table
            .columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    /// Every column as a JSON object; absent cells become null
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.cells.len());
        for (column, cell) in self.iter() {
            let value = cell.clone().map(Value::from).unwrap_or(Value::Null);
            map.insert(column.to_string(), value);
        }
        Value::Object(map)
    }
}

/// Flattens a batch of records and assembles them into a `Table`
#[derive(Debug, Clone, Default)]
pub struct Tabularizer {
    flattener: Flattener,
}

impl Tabularizer {
    pub fn new(config: FlattenConfig) -> Result<Self> {
        Ok(Tabularizer {
            flattener: Flattener::new(config)?,
        })
    }

    pub fn config(&self) -> &FlattenConfig {
        self.flattener.config()
    }

    /// Tabularize a whole payload: an array is a batch of records,
    /// anything else is a batch of one
    pub fn tabularize(&self, payload: Value) -> Result<Table> {
        self.tabularize_records(normalize(payload))
    }

    /// Tabularize records that are already split apart
    pub fn tabularize_records<I>(&self, records: I) -> Result<Table>
    where
        I: IntoIterator<Item = Value>,
    {
        let flat = records
            .into_iter()
            .map(|record| self.flattener.flatten(record))
            .collect::<Result<Vec<_>>>()?;

        let table = Table::from_flat_records(flat);
        debug!(
            rows = table.len(),
            columns = table.columns().len(),
            "tabularized batch"
        );
        Ok(table)
    }
}

/// Split a top-level payload into its records
pub fn normalize(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        other => vec![other],
    }
}
