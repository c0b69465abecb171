//! sitesync-core - Core library for SiteSync
//!
//! This crate contains the record model and the offline/online reconciler
//! shared by the mobile app's sync layer and the `sitesync` CLI.

pub mod error;
pub mod models;
pub mod reconcile;
pub mod snapshot;
pub mod util;

pub use error::{Error, Result};
pub use models::{
    collections, Conflict, ConflictKind, ConflictLogEntry, LogEntryId, Record,
    ResolutionStrategy, SuggestedStrategy,
};
pub use reconcile::{
    detect_conflicts, detect_conflicts_at, plan_collection, ConflictScan, MergeFn, MergeTable,
    Reconciler, ResolutionOutcome, ResolvedConflict, StrategyOverrides, SyncPlan,
};
