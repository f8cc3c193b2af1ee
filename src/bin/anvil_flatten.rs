//! anvil-flatten: Flatten nested JSON into a single table
//!
//! Usage:
//!   # Read from file, write JSON Lines rows to stdout
//!   anvil-flatten data.json
//!
//!   # Read from stdin
//!   echo '[{"id": 1, "user": {"name": "Alice"}}, {"id": 2}]' | anvil-flatten
//!
//!   # Process NDJSON and write CSV
//!   anvil-flatten --ndjson events.jsonl --format csv -o events.csv
//!
//!   # Keep only the columns under "user"
//!   anvil-flatten data.json --select '^user\.'

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anvil::{decode, CsvWriter, FlattenConfig, JsonLinesWriter, Table, Tabularizer};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One JSON object per row
    Jsonl,
    /// Comma-separated values with a header row
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "anvil-flatten")]
#[command(about = "Flatten nested JSON into a single table", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one record per line)
    #[arg(long)]
    ndjson: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Output file (use stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Separator joining path segments (default: ".")
    #[arg(long)]
    separator: Option<String>,

    /// Maximum nesting depth accepted (default: 512)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Only keep columns whose name matches this regex
    #[arg(long)]
    select: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Build config
    let mut config = FlattenConfig::default();
    if let Some(sep) = args.separator {
        config.separator = sep;
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    let tabularizer = Tabularizer::new(config)?;

    let content = read_input(args.input.as_deref())?;

    let mut table = if args.ndjson {
        tabularizer.tabularize_records(decode::parse_ndjson_bytes(&content)?)?
    } else {
        let max_depth = tabularizer.config().max_depth;
        tabularizer.tabularize(decode::parse_document_with_depth(&content, max_depth)?)?
    };

    if let Some(pattern) = args.select {
        let regex = Regex::new(&pattern)
            .with_context(|| format!("Invalid --select pattern: {}", pattern))?;
        table = table.select(&regex);
    }

    info!(
        rows = table.len(),
        columns = table.columns().len(),
        "writing table"
    );

    let output: Box<dyn Write> = if let Some(path) = &args.output {
        Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create file: {}", path))?,
        ))
    } else {
        Box::new(BufWriter::new(std::io::stdout().lock()))
    };

    write_table(output, &table, args.format)
}

/// Read the whole input, from a file or stdin
fn read_input(input_file: Option<&str>) -> Result<Vec<u8>> {
    let reader = if let Some(file_path) = input_file {
        Box::new(BufReader::new(
            File::open(file_path).with_context(|| format!("Failed to open file: {}", file_path))?,
        )) as Box<dyn Read>
    } else {
        Box::new(std::io::stdin()) as Box<dyn Read>
    };

    let mut content = Vec::new();
    BufReader::new(reader)
        .read_to_end(&mut content)
        .context("Failed to read input")?;
    Ok(content)
}

fn write_table(output: Box<dyn Write>, table: &Table, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Jsonl => {
            let mut writer = JsonLinesWriter::new(output);
            writer.write_table(table)?;
            writer.flush()
        }
        OutputFormat::Csv => {
            let mut writer = CsvWriter::new(output);
            writer.write_table(table)?;
            writer.flush()
        }
    }
}
