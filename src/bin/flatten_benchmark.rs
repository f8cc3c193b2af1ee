//! Benchmark for flattening and tabularizing a synthetic batch
//!
//! Times the two phases separately: per-record flattening, then the
//! column union and row alignment over the whole batch.

use anvil::{FlatRecord, Flattener, Table};
use serde_json::{json, Value};
use std::time::Instant;

const RECORDS: usize = 10_000;

fn main() -> anyhow::Result<()> {
    println!("=== Anvil Flatten Benchmark ===\n");

    // Generate test data; odd records carry extra columns to exercise null-fill
    let mut test_data: Vec<Value> = Vec::with_capacity(RECORDS);
    for i in 0..RECORDS {
        let mut record = json!({
            "id": i,
            "username": format!("user{}", i),
            "profile": {
                "bio": format!("I am user {}", i),
                "location": "San Francisco",
                "joined": "2024-01-01"
            },
            "posts": [
                {"id": i * 10, "title": "First", "tags": ["rust", "json"]},
                {"id": i * 10 + 1, "title": "Second", "tags": ["perf"]}
            ]
        });
        if i % 2 == 1 {
            record["referrer"] = json!({"source": "newsletter", "campaign": i % 7});
        }
        test_data.push(record);
    }

    let flattener = Flattener::default();

    println!("Flattening {} records...", RECORDS);
    let start = Instant::now();
    let flat: Vec<FlatRecord> = test_data
        .into_iter()
        .map(|record| flattener.flatten(record))
        .collect::<anvil::Result<_>>()?;
    let flatten_duration = start.elapsed();

    let leaves: usize = flat.iter().map(FlatRecord::len).sum();
    println!("Time: {:?}", flatten_duration);
    println!("Leaves: {}", leaves);
    println!(
        "Average per record: {:.2}us\n",
        flatten_duration.as_micros() as f64 / RECORDS as f64
    );

    println!("Building table...");
    let start = Instant::now();
    let table = Table::from_flat_records(flat);
    let table_duration = start.elapsed();

    let absent = table
        .rows()
        .flat_map(|row| row.cells().iter())
        .filter(|cell| cell.is_none())
        .count();
    println!("Time: {:?}", table_duration);
    println!("Rows: {}, columns: {}", table.len(), table.columns().len());
    println!("Null-filled cells: {}", absent);

    Ok(())
}
