//! Resolved conflict audit entries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Conflict, ConflictKind, ResolutionStrategy};

/// A unique identifier for a log entry, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntryId(Uuid);

impl LogEntryId {
    /// Create a new unique entry ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for LogEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogEntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Record of a conflict that was resolved automatically or by a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictLogEntry {
    /// Entry identifier
    pub id: LogEntryId,
    /// Collection the record belongs to
    pub collection: String,
    /// Conflicting record's id
    pub record_id: String,
    /// Conflict classification
    pub kind: ConflictKind,
    /// Local effective timestamp, if the local side existed
    pub local_updated_at: Option<i64>,
    /// Remote effective timestamp, if the remote side existed
    pub remote_updated_at: Option<i64>,
    /// Strategy that produced the resolved record
    pub strategy: ResolutionStrategy,
    /// Resolution timestamp (Unix ms)
    pub resolved_at: i64,
}

impl ConflictLogEntry {
    /// Build an entry for `conflict` resolved with `strategy` at `resolved_at`
    #[must_use]
    pub fn new(conflict: &Conflict, strategy: ResolutionStrategy, resolved_at: i64) -> Self {
        Self {
            id: LogEntryId::new(),
            collection: conflict.collection.clone(),
            record_id: conflict.id.clone(),
            kind: conflict.kind,
            local_updated_at: conflict.local_timestamp(),
            remote_updated_at: conflict.remote_timestamp(),
            strategy,
            resolved_at,
        }
    }
}
