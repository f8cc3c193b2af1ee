//! # Anvil - hammer nested JSON flat
//!
//! Turns arbitrarily nested, schema-less JSON records into a flat table of
//! scalar columns suitable for tabular analysis.
//!
//! ## Modules
//!
//! - **flatten**: flatten records into path-keyed maps and union them into a table
//! - **decode**: parse JSON documents and NDJSON streams into nodes
//!
//! ## Quick Start
//!
//! ```rust
//! use anvil::{Flattener, Tabularizer};
//! use serde_json::json;
//!
//! # fn main() -> anvil::Result<()> {
//! let record = Flattener::default().flatten(json!({"a": 1, "b": {"c": [2, 3]}}))?;
//! // record = {"a": 1, "b.c.0": 2, "b.c.1": 3}
//! assert_eq!(record.len(), 3);
//!
//! let table = Tabularizer::default().tabularize(json!([{"x": 1}, {"y": 2}]))?;
//! // columns = ["x", "y"], row 0 = {x: 1, y: None}, row 1 = {x: None, y: 2}
//! assert_eq!(table.columns(), &["x", "y"]);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use tracing::debug;

pub mod decode;
pub mod error;
pub mod flatten;
pub mod types;

pub use error::{Error, Result};
pub use flatten::{CsvWriter, Flattener, JsonLinesWriter, RowView, Table, Tabularizer};
pub use types::{Cell, FlatRecord, FlattenConfig, Scalar, Shape};

/// Flatten one record with the default configuration
pub fn flatten(value: Value) -> Result<FlatRecord> {
    Flattener::default().flatten(value)
}

/// Tabularize a payload with the default configuration
pub fn tabularize(payload: Value) -> Result<Table> {
    Tabularizer::default().tabularize(payload)
}

/// Main entry point: decode a JSON document of unknown structure into a table
///
/// A top-level array is a batch of records; a single object (or scalar)
/// becomes a one-row table.
pub fn load_hierarchical_json(content: impl AsRef<[u8]>) -> Result<Table> {
    load_hierarchical_json_with(content, FlattenConfig::default())
}

/// [`load_hierarchical_json`] for text input
pub fn load_hierarchical_json_str(content: &str) -> Result<Table> {
    load_hierarchical_json_with(content, FlattenConfig::default())
}

/// Same as [`load_hierarchical_json`] with an explicit configuration
pub fn load_hierarchical_json_with(
    content: impl AsRef<[u8]>,
    config: FlattenConfig,
) -> Result<Table> {
    // Config and decoding are both checked before any flattening starts
    let tabularizer = Tabularizer::new(config)?;
    let max_depth = tabularizer.config().max_depth;
    let payload = decode::parse_document_with_depth(content.as_ref(), max_depth)?;
    debug!(bytes = content.as_ref().len(), "decoded JSON payload");
    tabularizer.tabularize(payload)
}
