//! Decoding raw JSON text into nodes
//!
//! Whole documents go through simd-json first and fall back to serde_json
//! when the SIMD parser rejects them. Documents nested deeper than the
//! flattener would accept are refused before any parser sees them. Every
//! decoding failure is reported as `Error::InvalidInputFormat`.

use crate::error::{Error, Result};
use crate::types::FlattenConfig;
use serde_json::Value;
use tracing::debug;

/// Hard ceiling on document nesting; the document parsers recurse per level
pub const MAX_DECODE_DEPTH: usize = 1024;

/// Parse a single JSON document with the default depth limit
pub fn parse_document(bytes: &[u8]) -> Result<Value> {
    parse_document_with_depth(bytes, FlattenConfig::default().max_depth)
}

/// Parse a single JSON document, refusing nesting beyond `max_depth`
///
/// `max_depth` counts path segments like `FlattenConfig::max_depth`, so a
/// document may open at most `max_depth + 1` containers. Limits above
/// `MAX_DECODE_DEPTH` are lowered to it.
pub fn parse_document_with_depth(bytes: &[u8], max_depth: usize) -> Result<Value> {
    let text = as_utf8(bytes)?;
    check_nesting(text, max_depth.min(MAX_DECODE_DEPTH))?;

    // simd-json parses in place, so it gets a scratch copy
    let mut scratch = text.as_bytes().to_vec();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(simd_err) => {
            debug!(error = %simd_err, "SIMD decode failed, retrying with serde_json");
            serde_json::from_str(text).map_err(|e| Error::InvalidInputFormat(e.to_string()))
        }
    }
}

/// Parse newline-delimited JSON from raw bytes
pub fn parse_ndjson_bytes(bytes: &[u8]) -> Result<Vec<Value>> {
    parse_ndjson(as_utf8(bytes)?)
}

/// Parse newline-delimited JSON, one document per non-blank line
pub fn parse_ndjson(text: &str) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line)
            .map_err(|e| Error::InvalidInputFormat(format!("line {}: {}", idx + 1, e)))?;
        records.push(value);
    }
    debug!(records = records.len(), "parsed NDJSON input");
    Ok(records)
}

fn as_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| Error::InvalidInputFormat(format!("input is not valid UTF-8: {}", e)))
}

/// Scan bracket nesting outside of string literals
fn check_nesting(text: &str, max_depth: usize) -> Result<()> {
    let max_nesting = max_depth.saturating_add(1);
    let mut nesting = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                nesting += 1;
                if nesting > max_nesting {
                    return Err(Error::InvalidInputFormat(format!(
                        "nesting deeper than {} levels at byte {}",
                        max_depth, offset
                    )));
                }
            }
            b']' | b'}' => nesting = nesting.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}
