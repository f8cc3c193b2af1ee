//! Flattening - turn nested JSON records into one flat table
//!
//! A `Flattener` walks one record and produces a `FlatRecord` keyed by
//! dotted paths (`"user.tags.0"`). A `Tabularizer` flattens a whole batch
//! and unions the path keys into the columns of a `Table`, filling the
//! cells a record does not have with `None`.

pub mod extractor;
pub mod table;
pub mod writer;

pub use extractor::Flattener;
pub use table::{normalize, RowView, Table, Tabularizer};
pub use writer::{CsvWriter, JsonLinesWriter};
