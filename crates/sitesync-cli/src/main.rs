//! SiteSync CLI - reconcile offline edits against the cloud database
//!
//! Reads local and remote collection snapshots, reports conflicts and
//! writes resolved records for the sync layer to upload.

mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::ConfigContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::detect::run_detect;
use crate::commands::plan::run_plan;
use crate::commands::resolve::{run_resolve, ResolveOptions};
use crate::commands::suggest::run_suggest;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let default_directive: tracing_subscriber::filter::Directive = "sitesync=info"
        .parse()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_directive),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let context = ConfigContext::resolve(cli.config, cli.profile)?;

    match cli.command {
        Commands::Detect { snapshots, json } => run_detect(&snapshots, json, &context)?,
        Commands::Suggest { snapshots, json } => run_suggest(&snapshots, json, &context)?,
        Commands::Resolve {
            snapshots,
            strategy,
            output,
            mark_synced,
            json,
        } => {
            let options = ResolveOptions {
                strategy,
                output: output.as_deref(),
                mark_synced,
                as_json: json,
            };
            run_resolve(&snapshots, &options, &context)?;
        }
        Commands::Plan { snapshots, json } => run_plan(&snapshots, json, &context)?,
        Commands::Config { command } => run_config(command, &context)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
