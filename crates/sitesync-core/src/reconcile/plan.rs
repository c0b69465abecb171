//! Whole-collection reconciliation plan and batch resolution results

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use super::detect::{detect_conflicts_at, SnapshotIndex};
use crate::models::{Conflict, ConflictLogEntry, Record, ResolutionStrategy};

/// Per-collection strategy that replaces the suggested one
pub type StrategyOverrides = BTreeMap<String, ResolutionStrategy>;

/// What a sync pass has to do for one collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncPlan {
    pub collection: String,
    pub last_sync: i64,
    /// Records that need a resolution strategy
    pub conflicts: Vec<Conflict>,
    /// Changed only locally since the last sync; upload as-is
    pub push: Vec<Record>,
    /// Changed only remotely since the last sync; download as-is
    pub pull: Vec<Record>,
    /// Records untouched on both sides
    pub unchanged: usize,
}

impl SyncPlan {
    /// Whether the plan has no work at all
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.conflicts.is_empty() && self.push.is_empty() && self.pull.is_empty()
    }
}

/// One conflict resolved by a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConflict {
    pub entry: ConflictLogEntry,
    /// Record to write to both stores; `None` removes it
    pub record: Option<Record>,
}

/// Result of resolving a batch of conflicts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionOutcome {
    pub resolved: Vec<ResolvedConflict>,
    /// Conflicts left for a person to decide
    pub pending: Vec<Conflict>,
}

/// Classify every record of a collection for a sync pass.
///
/// Conflicts are exactly those of [`super::detect_conflicts`]. Records present
/// on both sides but touched on only one side become `push` or `pull`.
pub fn plan_collection(
    collection: &str,
    local: &[Record],
    remote: &[Record],
    last_sync: i64,
    now_ms: i64,
) -> SyncPlan {
    let conflicts: Vec<Conflict> =
        detect_conflicts_at(collection, local, remote, last_sync, now_ms).collect();

    let local_index = SnapshotIndex::build(local, "local");
    let remote_index = SnapshotIndex::build(remote, "remote");
    let touched = |record: &Record| record.effective_timestamp() > last_sync;

    let mut push = Vec::new();
    let mut pull = Vec::new();
    let mut unchanged = 0usize;

    for (id, local_record) in local_index.iter() {
        match remote_index.get(id) {
            Some(remote_record) => match (touched(local_record), touched(remote_record)) {
                (true, false) => push.push(local_record.clone()),
                (false, true) => pull.push(remote_record.clone()),
                (false, false) => unchanged += 1,
                (true, true) => {}
            },
            None if !touched(local_record) => unchanged += 1,
            None => {}
        }
    }
    unchanged += remote_index
        .iter()
        .filter(|(id, record)| !local_index.contains(id) && !touched(*record))
        .count();

    info!(
        collection,
        conflicts = conflicts.len(),
        push = push.len(),
        pull = pull.len(),
        unchanged,
        "sync plan built"
    );

    SyncPlan {
        collection: collection.to_string(),
        last_sync,
        conflicts,
        push,
        pull,
        unchanged,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::models::ConflictKind;

    fn snapshot(values: Value) -> Vec<Record> {
        values
            .as_array()
            .unwrap()
            .iter()
            .cloned()
            .map(|value| Record::from_value(value).unwrap())
            .collect()
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records.iter().filter_map(Record::id).collect()
    }

    #[test]
    fn plan_separates_conflicts_from_clean_propagation() {
        let local = snapshot(json!([
            {"id": "push", "updatedAt": 2_000},
            {"id": "pull", "updatedAt": 500},
            {"id": "both", "updatedAt": 2_000},
            {"id": "same", "updatedAt": 500},
            {"id": "new", "updatedAt": 2_000},
            {"id": "stale-local", "updatedAt": 500},
        ]));
        let remote = snapshot(json!([
            {"id": "push", "updatedAt": 500},
            {"id": "pull", "updatedAt": 2_000},
            {"id": "both", "updatedAt": 2_000},
            {"id": "same", "updatedAt": 500},
            {"id": "gone", "updatedAt": 2_000},
            {"id": "stale-remote", "updatedAt": 500},
        ]));

        let plan = plan_collection("materials", &local, &remote, 1_000, 5);

        let conflicts: Vec<_> = plan
            .conflicts
            .iter()
            .map(|conflict| (conflict.id.as_str(), conflict.kind))
            .collect();
        assert_eq!(
            conflicts,
            vec![
                ("both", ConflictKind::Update),
                ("new", ConflictKind::Create),
                ("gone", ConflictKind::Delete),
            ]
        );
        assert_eq!(ids(&plan.push), vec!["push"]);
        assert_eq!(ids(&plan.pull), vec!["pull"]);
        assert_eq!(plan.unchanged, 3);
        assert!(!plan.is_noop());
    }

    #[test]
    fn empty_snapshots_make_a_noop_plan() {
        let plan = plan_collection("clients", &[], &[], 0, 0);
        assert!(plan.is_noop());
        assert_eq!(plan.unchanged, 0);
    }
}
