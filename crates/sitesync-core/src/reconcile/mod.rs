//! Offline/online reconciliation of collection snapshots
//!
//! Detection compares a local and a remote snapshot against the last sync
//! time; resolution turns each conflict into one record with a strategy.
//! Nothing here performs I/O or keeps state between calls: fetching
//! snapshots and writing resolved records back is the caller's job.

mod detect;
mod merge;
mod plan;

pub use detect::{detect_conflicts, detect_conflicts_at, ConflictScan};
pub use merge::{
    merge_attendance, merge_client, merge_employee, merge_generic, merge_material,
    merge_material_order, merge_vendor, MergeFn, MergeTable,
};
pub use plan::{plan_collection, ResolutionOutcome, ResolvedConflict, StrategyOverrides, SyncPlan};

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Conflict, ConflictLogEntry, Record, ResolutionStrategy};
use crate::util::unix_timestamp_ms_now;

/// Resolves conflicts using a table of per-collection merge functions
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    merges: MergeTable,
}

impl Reconciler {
    /// Reconciler with the app's built-in collection merges
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciler dispatching merges through a custom table
    #[must_use]
    pub const fn with_merge_table(merges: MergeTable) -> Self {
        Self { merges }
    }

    pub const fn merge_table(&self) -> &MergeTable {
        &self.merges
    }

    pub fn merge_table_mut(&mut self) -> &mut MergeTable {
        &mut self.merges
    }

    /// Produce the resolved record for `conflict` under `strategy`.
    ///
    /// `None` means the resolved state is "no record", e.g. `local_wins` on a
    /// `delete` conflict. `manual` always fails with
    /// [`Error::ManualResolutionRequired`].
    pub fn resolve_conflict(
        &self,
        conflict: &Conflict,
        strategy: ResolutionStrategy,
    ) -> Result<Option<Record>> {
        match strategy {
            ResolutionStrategy::LocalWins => Ok(conflict.local_data.clone()),
            ResolutionStrategy::RemoteWins => Ok(conflict.remote_data.clone()),
            ResolutionStrategy::Merge => Ok(self.merges.merge(
                &conflict.collection,
                conflict.local_data.as_ref(),
                conflict.remote_data.as_ref(),
            )),
            ResolutionStrategy::Manual => Err(Error::ManualResolutionRequired {
                collection: conflict.collection.clone(),
                id: conflict.id.clone(),
            }),
        }
    }

    /// Like [`Self::resolve_conflict`], taking the strategy as its wire tag.
    ///
    /// Unknown tags fail with [`Error::UnknownStrategy`].
    pub fn resolve_conflict_tagged(&self, conflict: &Conflict, tag: &str) -> Result<Option<Record>> {
        let strategy = tag.parse::<ResolutionStrategy>()?;
        self.resolve_conflict(conflict, strategy)
    }

    /// Resolve every conflict, using `overrides` first and the suggested
    /// strategy otherwise.
    ///
    /// Conflicts whose strategy is `manual` are returned as pending instead
    /// of failing the batch.
    pub fn auto_resolve<I>(
        &self,
        conflicts: I,
        overrides: &StrategyOverrides,
    ) -> Result<ResolutionOutcome>
    where
        I: IntoIterator<Item = Conflict>,
    {
        self.auto_resolve_at(conflicts, overrides, unix_timestamp_ms_now())
    }

    /// Same as [`Self::auto_resolve`] with an explicit resolution time (Unix ms).
    pub fn auto_resolve_at<I>(
        &self,
        conflicts: I,
        overrides: &StrategyOverrides,
        now_ms: i64,
    ) -> Result<ResolutionOutcome>
    where
        I: IntoIterator<Item = Conflict>,
    {
        let mut outcome = ResolutionOutcome::default();

        for conflict in conflicts {
            let strategy = overrides
                .get(&conflict.collection)
                .copied()
                .unwrap_or_else(|| conflict.suggested_strategy().strategy);

            match self.resolve_conflict(&conflict, strategy) {
                Ok(record) => outcome.resolved.push(ResolvedConflict {
                    entry: ConflictLogEntry::new(&conflict, strategy, now_ms),
                    record,
                }),
                Err(Error::ManualResolutionRequired { .. }) => outcome.pending.push(conflict),
                Err(error) => return Err(error),
            }
        }

        info!(
            resolved = outcome.resolved.len(),
            pending = outcome.pending.len(),
            "conflict batch resolved"
        );
        Ok(outcome)
    }
}
