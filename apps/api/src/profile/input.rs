//! Batch decoding — CSV payloads and JSON rows into `RawRecord`s.
//!
//! This is the only place where a batch can be rejected. Rejection is all or
//! nothing: a single undecodable row fails the whole batch.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

use crate::profile::RawRecord;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("CSV payload could not be decoded: {0}")]
    Csv(#[from] csv::Error),

    #[error("base64 payload could not be decoded: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("rows must be a JSON array of objects")]
    NotAnArray,

    #[error("row {row} is not an object")]
    NotAnObject { row: usize },

    #[error("row {row}, column '{column}': nested values cannot be read as text")]
    NestedValue { row: usize, column: String },
}

/// Decodes a UTF-8 CSV payload with a header row.
///
/// Empty lines and rows whose cells are all blank are skipped. Ragged rows are
/// tolerated: missing trailing cells are simply absent from the record.
pub fn records_from_csv(bytes: &[u8]) -> Result<Vec<RawRecord>, BatchError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.clone(), cell.to_string()))
                .collect(),
        );
    }

    Ok(records)
}

/// Decodes a base64 (standard alphabet) CSV payload, tolerating a `data:` URL prefix.
pub fn records_from_base64(encoded: &str) -> Result<Vec<RawRecord>, BatchError> {
    let encoded = encoded.trim();
    let encoded = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let bytes = STANDARD.decode(encoded)?;
    records_from_csv(&bytes)
}

/// Coerces a JSON array of objects into records.
///
/// Strings pass through, numbers and booleans are rendered as text, `null`
/// cells are dropped. Arrays or objects inside a cell reject the batch.
pub fn records_from_json(rows: &Value) -> Result<Vec<RawRecord>, BatchError> {
    let rows = rows.as_array().ok_or(BatchError::NotAnArray)?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let object = row
                .as_object()
                .ok_or(BatchError::NotAnObject { row: index })?;

            let mut record = RawRecord::new();
            for (column, value) in object {
                let text = match value {
                    Value::Null => continue,
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(BatchError::NestedValue {
                            row: index,
                            column: column.clone(),
                        })
                    }
                };
                record.push(column.as_str(), text);
            }
            Ok(record)
        })
        .collect()
}
