//! Sync conflict model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{collections, Record, ResolutionStrategy, SuggestedStrategy};

/// Classification of a local/remote disagreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// Present only locally and touched since the last sync
    Create,
    /// Touched on both sides since the last sync
    Update,
    /// Present only remotely and touched since the last sync
    Delete,
}

impl ConflictKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A detected disagreement between the local and remote view of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Record identity
    pub id: String,
    /// Collection tag, e.g. `employees`
    pub collection: String,
    /// Local version, absent for `delete` conflicts
    pub local_data: Option<Record>,
    /// Remote version, absent for `create` conflicts
    pub remote_data: Option<Record>,
    /// Conflict classification
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    /// Detection time (Unix ms)
    pub detected_at: i64,
}

impl Conflict {
    /// Recommend a strategy for this conflict.
    ///
    /// Local creations are kept, remote deletions win, and updates are merged
    /// for the collections whose merge keeps both sides' edits.
    #[must_use]
    pub fn suggested_strategy(&self) -> SuggestedStrategy {
        match self.kind {
            ConflictKind::Create => SuggestedStrategy {
                strategy: ResolutionStrategy::LocalWins,
                reason: "Local creation should be preserved",
            },
            ConflictKind::Delete => SuggestedStrategy {
                strategy: ResolutionStrategy::RemoteWins,
                reason: "Remote deletion should take precedence",
            },
            ConflictKind::Update
                if collections::MERGE_BY_DEFAULT.contains(&self.collection.as_str()) =>
            {
                SuggestedStrategy {
                    strategy: ResolutionStrategy::Merge,
                    reason: "Both versions changed; merge keeps edits from each side",
                }
            }
            ConflictKind::Update => SuggestedStrategy {
                strategy: ResolutionStrategy::RemoteWins,
                reason: "Remote version is authoritative for this collection",
            },
        }
    }

    /// Human-readable one-line description of the conflict
    #[must_use]
    pub fn display_message(&self) -> String {
        match self.kind {
            ConflictKind::Create => format!(
                "New {} record created locally (ID: {})",
                self.collection, self.id
            ),
            ConflictKind::Update => format!(
                "{} record modified both locally and remotely (ID: {})",
                self.collection, self.id
            ),
            ConflictKind::Delete => format!(
                "{} record deleted locally but modified remotely (ID: {})",
                self.collection, self.id
            ),
        }
    }

    /// Effective timestamp of the local side, if present
    #[must_use]
    pub fn local_timestamp(&self) -> Option<i64> {
        self.local_data.as_ref().map(Record::effective_timestamp)
    }

    /// Effective timestamp of the remote side, if present
    #[must_use]
    pub fn remote_timestamp(&self) -> Option<i64> {
        self.remote_data.as_ref().map(Record::effective_timestamp)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_message())
    }
}
