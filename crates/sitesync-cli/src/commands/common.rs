use std::path::{Path, PathBuf};

use serde::Serialize;
use sitesync_core::snapshot::load_snapshot;
use sitesync_core::util::normalize_text_option;
use sitesync_core::{Conflict, Record, ResolutionStrategy};

use crate::cli::SnapshotArgs;
use crate::config_profiles::{resolve_config_path, CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Where the CLI reads and writes its profile configuration
#[derive(Debug, Clone)]
pub struct ConfigContext {
    pub path: PathBuf,
    pub profile: Option<String>,
}

impl ConfigContext {
    pub fn resolve(config: Option<PathBuf>, profile: Option<String>) -> Result<Self, CliError> {
        Ok(Self {
            path: resolve_config_path(config).map_err(CliError::Config)?,
            profile,
        })
    }

    pub fn load(&self) -> Result<(CliProfilesConfig, String), CliError> {
        let config = CliProfilesConfig::load_from_path(&self.path).map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(self.profile.as_deref());
        Ok((config, profile_name))
    }

    pub fn save(&self, config: &CliProfilesConfig) -> Result<(), CliError> {
        config.save_to_path(&self.path).map_err(CliError::Config)
    }
}

/// Snapshots and sync point loaded for one command run
#[derive(Debug, Clone)]
pub struct SnapshotInputs {
    pub collection: String,
    pub local: Vec<Record>,
    pub remote: Vec<Record>,
    pub last_sync: i64,
    pub profile: CliProfile,
}

pub fn load_inputs(args: &SnapshotArgs, context: &ConfigContext) -> Result<SnapshotInputs, CliError> {
    let collection = normalize_collection(&args.collection)?;
    let (config, profile_name) = context.load()?;
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    let last_sync = args
        .last_sync
        .unwrap_or_else(|| profile.last_sync_for(&collection));

    tracing::debug!(%collection, profile = %profile_name, last_sync, "loading snapshots");

    Ok(SnapshotInputs {
        local: load_snapshot(&args.local)?,
        remote: load_snapshot(&args.remote)?,
        collection,
        last_sync,
        profile,
    })
}

pub fn normalize_collection(value: &str) -> Result<String, CliError> {
    normalize_text_option(Some(value.to_string())).ok_or(CliError::EmptyCollection)
}

#[derive(Debug, Serialize)]
pub struct ConflictItem {
    pub id: String,
    pub collection: String,
    pub kind: String,
    pub local_updated_at: Option<i64>,
    pub remote_updated_at: Option<i64>,
    pub detected_at: i64,
    pub message: String,
    pub suggested_strategy: ResolutionStrategy,
    pub reason: String,
}

pub fn conflict_to_item(conflict: &Conflict) -> ConflictItem {
    let suggestion = conflict.suggested_strategy();
    ConflictItem {
        id: conflict.id.clone(),
        collection: conflict.collection.clone(),
        kind: conflict.kind.to_string(),
        local_updated_at: conflict.local_timestamp(),
        remote_updated_at: conflict.remote_timestamp(),
        detected_at: conflict.detected_at,
        message: conflict.display_message(),
        suggested_strategy: suggestion.strategy,
        reason: suggestion.reason.to_string(),
    }
}

pub fn format_conflict_lines(conflicts: &[Conflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{:<6}  {:<24}  local={} remote={}  {}",
                conflict.kind,
                truncate_id(&conflict.id, 24),
                format_optional_timestamp(conflict.local_timestamp()),
                format_optional_timestamp(conflict.remote_timestamp()),
                conflict.display_message()
            )
        })
        .collect()
}

pub fn format_suggestion_lines(conflicts: &[Conflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            let suggestion = conflict.suggested_strategy();
            format!(
                "{:<24}  {:<6}  {:<11}  {}",
                truncate_id(&conflict.id, 24),
                conflict.kind,
                suggestion.strategy,
                suggestion.reason
            )
        })
        .collect()
}

pub fn truncate_id(id: &str, max_chars: usize) -> String {
    if id.chars().count() <= max_chars {
        id.to_string()
    } else {
        let mut truncated = id.chars().take(max_chars.saturating_sub(3)).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_optional_timestamp(timestamp_ms: Option<i64>) -> String {
    timestamp_ms.map_or_else(|| "-".to_string(), format_sync_timestamp)
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn write_output(rendered: &str, output_path: Option<&Path>) -> Result<(), CliError> {
    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }
    Ok(())
}
