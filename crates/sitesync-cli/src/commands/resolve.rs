use std::path::Path;

use sitesync_core::snapshot::render_snapshot;
use sitesync_core::util::unix_timestamp_ms_now;
use sitesync_core::{
    detect_conflicts_at, Reconciler, Record, ResolutionOutcome, ResolutionStrategy,
    StrategyOverrides,
};
use tracing::info;

use crate::cli::SnapshotArgs;
use crate::commands::common::{load_inputs, truncate_id, write_output, ConfigContext, SnapshotInputs};
use crate::error::CliError;

pub struct ResolveOptions<'a> {
    pub strategy: Option<ResolutionStrategy>,
    pub output: Option<&'a Path>,
    pub mark_synced: bool,
    pub as_json: bool,
}

pub fn run_resolve(
    args: &SnapshotArgs,
    options: &ResolveOptions<'_>,
    context: &ConfigContext,
) -> Result<(), CliError> {
    let inputs = load_inputs(args, context)?;
    let now_ms = unix_timestamp_ms_now();
    let outcome = resolve_inputs(&inputs, options.strategy, now_ms)?;

    let records = resolved_records(&outcome);
    if options.as_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        if let Some(path) = options.output {
            std::fs::write(path, render_snapshot(&records)?)?;
        }
    } else {
        for line in format_resolution_lines(&outcome) {
            eprintln!("{line}");
        }
        write_output(&render_snapshot(&records)?, options.output)?;
    }

    if options.mark_synced {
        if outcome.pending.is_empty() {
            mark_collection_synced(context, &inputs.collection, now_ms)?;
        } else {
            eprintln!(
                "Not marking {} as synced: {} conflicts need a manual decision",
                inputs.collection,
                outcome.pending.len()
            );
        }
    }

    Ok(())
}

/// Resolve every conflict of the loaded snapshots.
///
/// An explicit strategy applies to the whole collection; otherwise the
/// profile's override for the collection, then the suggestion, is used.
pub fn resolve_inputs(
    inputs: &SnapshotInputs,
    strategy: Option<ResolutionStrategy>,
    now_ms: i64,
) -> Result<ResolutionOutcome, CliError> {
    let mut overrides: StrategyOverrides = inputs.profile.strategy_overrides.clone();
    if let Some(strategy) = strategy {
        overrides.insert(inputs.collection.clone(), strategy);
    }

    let conflicts = detect_conflicts_at(
        &inputs.collection,
        &inputs.local,
        &inputs.remote,
        inputs.last_sync,
        now_ms,
    );
    Ok(Reconciler::new().auto_resolve_at(conflicts, &overrides, now_ms)?)
}

pub fn resolved_records(outcome: &ResolutionOutcome) -> Vec<Record> {
    outcome
        .resolved
        .iter()
        .filter_map(|resolved| resolved.record.clone())
        .collect()
}

pub fn format_resolution_lines(outcome: &ResolutionOutcome) -> Vec<String> {
    let resolved = outcome.resolved.iter().map(|resolved| {
        let action = if resolved.record.is_some() {
            "keep"
        } else {
            "remove"
        };
        format!(
            "{:<24}  {:<6}  {:<11}  {action}",
            truncate_id(&resolved.entry.record_id, 24),
            resolved.entry.kind,
            resolved.entry.strategy
        )
    });
    let pending = outcome
        .pending
        .iter()
        .map(|conflict| format!("pending: {}", conflict.display_message()));
    resolved.chain(pending).collect()
}

fn mark_collection_synced(
    context: &ConfigContext,
    collection: &str,
    now_ms: i64,
) -> Result<(), CliError> {
    let (mut config, profile_name) = context.load()?;
    config
        .profile_mut_or_default(&profile_name)
        .last_sync
        .insert(collection.to_string(), now_ms);
    context.save(&config)?;
    info!(collection, profile = %profile_name, now_ms, "collection marked as synced");
    Ok(())
}
