//! Conflict detection between two snapshots of a collection

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::{Conflict, ConflictKind, Record};
use crate::util::unix_timestamp_ms_now;

/// One side of a reconciliation, keyed by record id.
///
/// Duplicate ids are not rejected: the last record wins, but the id keeps
/// the scan position of its first occurrence.
#[derive(Debug)]
pub(crate) struct SnapshotIndex<'a> {
    order: Vec<String>,
    records: HashMap<String, &'a Record>,
}

impl<'a> SnapshotIndex<'a> {
    pub(crate) fn build(snapshot: &'a [Record], side: &'static str) -> Self {
        let mut index = Self {
            order: Vec::with_capacity(snapshot.len()),
            records: HashMap::with_capacity(snapshot.len()),
        };

        for record in snapshot {
            let Some(id) = record.id() else {
                warn!(side, "skipping record without a usable id");
                continue;
            };
            if index.records.insert(id.clone(), record).is_none() {
                index.order.push(id);
            } else {
                debug!(side, %id, "duplicate id in snapshot, keeping last record");
            }
        }

        index
    }

    pub(crate) fn get(&self, id: &str) -> Option<&'a Record> {
        self.records.get(id).copied()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Records in scan order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &'a Record)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.get(id).map(|record| (id.as_str(), record)))
    }
}

/// Lazy scan yielding the conflicts between a local and a remote snapshot.
///
/// Local ids are visited first in local scan order, then remote-only ids in
/// remote scan order. The scan is not restartable; call
/// [`detect_conflicts`] again to recompute.
#[derive(Debug)]
pub struct ConflictScan<'a> {
    collection: &'a str,
    local: SnapshotIndex<'a>,
    remote: SnapshotIndex<'a>,
    last_sync: i64,
    detected_at: i64,
    local_pos: usize,
    remote_pos: usize,
}

impl<'a> ConflictScan<'a> {
    fn new(
        collection: &'a str,
        local: &'a [Record],
        remote: &'a [Record],
        last_sync: i64,
        detected_at: i64,
    ) -> Self {
        Self {
            collection,
            local: SnapshotIndex::build(local, "local"),
            remote: SnapshotIndex::build(remote, "remote"),
            last_sync,
            detected_at,
            local_pos: 0,
            remote_pos: 0,
        }
    }

    fn conflict(
        &self,
        id: &str,
        local: Option<&Record>,
        remote: Option<&Record>,
        kind: ConflictKind,
    ) -> Conflict {
        debug!(collection = self.collection, %id, %kind, "conflict detected");
        Conflict {
            id: id.to_string(),
            collection: self.collection.to_string(),
            local_data: local.cloned(),
            remote_data: remote.cloned(),
            kind,
            detected_at: self.detected_at,
        }
    }

    fn touched(&self, record: &Record) -> bool {
        record.effective_timestamp() > self.last_sync
    }
}

impl Iterator for ConflictScan<'_> {
    type Item = Conflict;

    fn next(&mut self) -> Option<Conflict> {
        while let Some(id) = self.local.order.get(self.local_pos) {
            self.local_pos += 1;
            let Some(local) = self.local.get(id) else {
                continue;
            };

            match self.remote.get(id) {
                None if self.touched(local) => {
                    return Some(self.conflict(id, Some(local), None, ConflictKind::Create));
                }
                Some(remote) if self.touched(local) && self.touched(remote) => {
                    return Some(self.conflict(id, Some(local), Some(remote), ConflictKind::Update));
                }
                _ => {}
            }
        }

        while let Some(id) = self.remote.order.get(self.remote_pos) {
            self.remote_pos += 1;
            if self.local.contains(id) {
                continue;
            }
            let Some(remote) = self.remote.get(id) else {
                continue;
            };
            if self.touched(remote) {
                return Some(self.conflict(id, None, Some(remote), ConflictKind::Delete));
            }
        }

        None
    }
}

/// Detect conflicts between `local` and `remote` snapshots of `collection`.
///
/// A record only conflicts when it was touched after `last_sync`: local-only
/// records become `create` conflicts, remote-only records `delete` conflicts,
/// and records present on both sides `update` conflicts when both sides were
/// touched. One-sided changes are clean propagations and are not reported.
pub fn detect_conflicts<'a>(
    collection: &'a str,
    local: &'a [Record],
    remote: &'a [Record],
    last_sync: i64,
) -> ConflictScan<'a> {
    detect_conflicts_at(collection, local, remote, last_sync, unix_timestamp_ms_now())
}

/// Same as [`detect_conflicts`] with an explicit detection time (Unix ms).
pub fn detect_conflicts_at<'a>(
    collection: &'a str,
    local: &'a [Record],
    remote: &'a [Record],
    last_sync: i64,
    now_ms: i64,
) -> ConflictScan<'a> {
    ConflictScan::new(collection, local, remote, last_sync, now_ms)
}
