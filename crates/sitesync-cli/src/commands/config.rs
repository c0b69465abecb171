use sitesync_core::util::unix_timestamp_ms_now;
use sitesync_core::ResolutionStrategy;

use crate::cli::ConfigCommands;
use crate::commands::common::{format_sync_timestamp, normalize_collection, ConfigContext};
use crate::config_profiles::normalize_profile_name;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, context: &ConfigContext) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { json } => run_config_show(json, context),
        ConfigCommands::SetLastSync { collection, at } => {
            run_set_last_sync(&collection, at.unwrap_or_else(unix_timestamp_ms_now), context)
        }
        ConfigCommands::SetStrategy {
            collection,
            strategy,
        } => run_set_strategy(&collection, Some(strategy), context),
        ConfigCommands::ClearStrategy { collection } => {
            run_set_strategy(&collection, None, context)
        }
        ConfigCommands::Use { name } => run_use_profile(&name, context),
    }
}

pub fn run_config_show(as_json: bool, context: &ConfigContext) -> Result<(), CliError> {
    let (config, profile_name) = context.load()?;
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("Config: {}", context.path.display());
    println!("Profile: {profile_name}");
    if profile.last_sync.is_empty() {
        println!("Last sync: never");
    } else {
        println!("Last sync:");
        for (collection, timestamp) in &profile.last_sync {
            println!("  {collection:<16}  {}", format_sync_timestamp(*timestamp));
        }
    }
    if !profile.strategy_overrides.is_empty() {
        println!("Strategy overrides:");
        for (collection, strategy) in &profile.strategy_overrides {
            println!("  {collection:<16}  {strategy}");
        }
    }
    Ok(())
}

pub fn run_set_last_sync(
    collection: &str,
    timestamp_ms: i64,
    context: &ConfigContext,
) -> Result<(), CliError> {
    let collection = normalize_collection(collection)?;
    let (mut config, profile_name) = context.load()?;
    config
        .profile_mut_or_default(&profile_name)
        .last_sync
        .insert(collection.clone(), timestamp_ms);
    context.save(&config)?;

    println!(
        "{profile_name}: {collection} last synced {}",
        format_sync_timestamp(timestamp_ms)
    );
    Ok(())
}

pub fn run_set_strategy(
    collection: &str,
    strategy: Option<ResolutionStrategy>,
    context: &ConfigContext,
) -> Result<(), CliError> {
    let collection = normalize_collection(collection)?;
    let (mut config, profile_name) = context.load()?;
    let overrides = &mut config.profile_mut_or_default(&profile_name).strategy_overrides;
    match strategy {
        Some(strategy) => {
            overrides.insert(collection.clone(), strategy);
            println!("{profile_name}: {collection} resolves with {strategy}");
        }
        None => {
            overrides.remove(&collection);
            println!("{profile_name}: {collection} uses suggested strategies");
        }
    }
    context.save(&config)
}

pub fn run_use_profile(name: &str, context: &ConfigContext) -> Result<(), CliError> {
    let name = normalize_profile_name(Some(name)).ok_or(CliError::EmptyProfile)?;
    let (mut config, _) = context.load()?;
    config.profile_mut_or_default(&name);
    config.active_profile = Some(name.clone());
    context.save(&config)?;
    println!("Active profile: {name}");
    Ok(())
}
