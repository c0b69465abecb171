//! Collection record model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Fields that may carry a record's modification time, highest priority first.
pub const TIMESTAMP_FIELDS: [&str; 3] = ["updatedAt", "lastModified", "timestamp"];

/// A single entity of any collection (employee, client, vendor, ...).
///
/// Records are schemaless JSON objects as stored by the cloud document
/// database. Only `id` and the modification timestamp fields carry meaning
/// for reconciliation; everything else is passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert an arbitrary JSON value into a record.
    ///
    /// Fails with [`Error::InvalidSnapshot`] when the value is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(Error::InvalidSnapshot(format!(
                "expected a record object, found {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Identity of the record.
    ///
    /// String ids are returned as-is; numeric ids are rendered in decimal.
    /// Any other shape (missing, null, object, ...) yields `None`.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Modification time used for conflict detection (Unix ms).
    ///
    /// Checks `updatedAt`, `lastModified` and `timestamp` in that order and
    /// takes the first one that holds a non-zero time. Numbers are read as
    /// epoch milliseconds, strings as RFC 3339 dates or integer text.
    /// Defaults to 0.
    #[must_use]
    pub fn effective_timestamp(&self) -> i64 {
        TIMESTAMP_FIELDS
            .iter()
            .filter_map(|field| self.0.get(*field))
            .map(timestamp_millis)
            .find(|millis| *millis != 0)
            .unwrap_or(0)
    }

    /// Look up a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Set a field when `value` is `Some`, remove it otherwise
    pub fn set_or_remove(&mut self, field: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.0.insert(field.to_string(), value);
            }
            None => {
                self.0.remove(field);
            }
        }
    }

    /// Iterate over field names and values
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Object(record.0)
    }
}

#[allow(clippy::cast_possible_truncation)] // fractional milliseconds are dropped
fn timestamp_millis(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64))
            .unwrap_or(0),
        Value::String(text) => parse_timestamp_text(text.trim()),
        _ => 0,
    }
}

fn parse_timestamp_text(text: &str) -> i64 {
    if let Ok(millis) = text.parse::<i64>() {
        return millis;
    }
    chrono::DateTime::parse_from_rfc3339(text).map_or(0, |date_time| date_time.timestamp_millis())
}

pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
