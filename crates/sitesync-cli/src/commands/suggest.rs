use sitesync_core::detect_conflicts;

use crate::cli::SnapshotArgs;
use crate::commands::common::{
    conflict_to_item, format_suggestion_lines, load_inputs, ConfigContext, ConflictItem,
};
use crate::error::CliError;

pub fn run_suggest(
    args: &SnapshotArgs,
    as_json: bool,
    context: &ConfigContext,
) -> Result<(), CliError> {
    let inputs = load_inputs(args, context)?;
    let conflicts = detect_conflicts(
        &inputs.collection,
        &inputs.local,
        &inputs.remote,
        inputs.last_sync,
    )
    .collect::<Vec<_>>();

    if as_json {
        let json_items = conflicts
            .iter()
            .map(conflict_to_item)
            .collect::<Vec<ConflictItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_suggestion_lines(&conflicts) {
            println!("{line}");
        }
    }

    Ok(())
}
