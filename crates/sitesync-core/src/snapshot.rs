//! Snapshot file helpers.
//!
//! Snapshots are stored either as a JSON array of records or, as the
//! Realtime Database exports them, as an object keyed by record id.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{json_type_name, Record};

/// Parse a snapshot from raw JSON.
///
/// `null` holes in arrays are skipped. In the keyed form the object key
/// becomes the record's `id` when the record has none.
pub fn parse_snapshot(raw: &str) -> Result<Vec<Record>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(position, item)| {
                if item.is_null() {
                    debug!(position, "skipping null snapshot entry");
                }
                !item.is_null()
            })
            .map(|(position, item)| snapshot_entry(&position, item))
            .collect(),
        Value::Object(entries) => entries
            .into_iter()
            .filter(|(_, item)| !item.is_null())
            .map(|(key, item)| {
                let mut record = snapshot_entry(&key, item)?;
                if record.id().is_none() {
                    record.insert("id", Value::String(key));
                }
                Ok(record)
            })
            .collect(),
        other => Err(Error::InvalidSnapshot(format!(
            "expected an array or object of records, found {}",
            json_type_name(&other)
        ))),
    }
}

fn snapshot_entry(label: &dyn std::fmt::Display, item: Value) -> Result<Record> {
    if item.is_object() {
        Record::from_value(item)
    } else {
        Err(Error::InvalidSnapshot(format!(
            "entry {label} is a {}, expected a record object",
            json_type_name(&item)
        )))
    }
}

/// Read and parse a snapshot file
pub fn load_snapshot(path: &Path) -> Result<Vec<Record>> {
    let raw = std::fs::read_to_string(path)?;
    let records = parse_snapshot(&raw)?;
    debug!(path = %path.display(), count = records.len(), "snapshot loaded");
    Ok(records)
}

/// Render records as a pretty-printed JSON array
pub fn render_snapshot(records: &[Record]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
