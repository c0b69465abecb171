use sitesync_core::plan_collection;
use sitesync_core::util::unix_timestamp_ms_now;

use crate::cli::SnapshotArgs;
use crate::commands::common::{format_conflict_lines, format_sync_timestamp, load_inputs, ConfigContext};
use crate::error::CliError;

pub fn run_plan(args: &SnapshotArgs, as_json: bool, context: &ConfigContext) -> Result<(), CliError> {
    let inputs = load_inputs(args, context)?;
    let plan = plan_collection(
        &inputs.collection,
        &inputs.local,
        &inputs.remote,
        inputs.last_sync,
        unix_timestamp_ms_now(),
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} since {}: {} conflicts, {} to push, {} to pull, {} unchanged",
        plan.collection,
        format_sync_timestamp(plan.last_sync),
        plan.conflicts.len(),
        plan.push.len(),
        plan.pull.len(),
        plan.unchanged
    );
    for line in format_conflict_lines(&plan.conflicts) {
        println!("  {line}");
    }
    Ok(())
}
