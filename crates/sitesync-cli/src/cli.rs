use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sitesync_core::ResolutionStrategy;

#[derive(Parser)]
#[command(name = "sitesync")]
#[command(about = "Reconcile offline edits against the cloud database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the CLI config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// CLI profile name holding last-sync times and strategy overrides
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

/// Inputs shared by every reconciliation command
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Collection name (employees, clients, materials, vendors, materialOrders, attendance, ...)
    #[arg(short, long)]
    pub collection: String,
    /// Local snapshot JSON file
    #[arg(long, value_name = "PATH")]
    pub local: PathBuf,
    /// Remote snapshot JSON file
    #[arg(long, value_name = "PATH")]
    pub remote: PathBuf,
    /// Last sync time in Unix ms (defaults to the profile's stored value)
    #[arg(long, value_name = "MS")]
    pub last_sync: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List conflicts between a local and a remote snapshot
    Detect {
        #[command(flatten)]
        snapshots: SnapshotArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the suggested strategy for each conflict
    Suggest {
        #[command(flatten)]
        snapshots: SnapshotArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve conflicts and write the resolved records
    Resolve {
        #[command(flatten)]
        snapshots: SnapshotArgs,
        /// Strategy for every conflict (suggestions and profile overrides when omitted)
        #[arg(short, long, value_name = "STRATEGY")]
        strategy: Option<ResolutionStrategy>,
        /// Optional output path for resolved records (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Store the current time as the collection's last sync when nothing is pending
        #[arg(long)]
        mark_synced: bool,
        /// Output the full resolution outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what a sync pass would push, pull and resolve
    Plan {
        #[command(flatten)]
        snapshots: SnapshotArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage CLI profile settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the active profile settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record the last successful sync of a collection
    SetLastSync {
        /// Collection name
        #[arg(short, long)]
        collection: String,
        /// Sync time in Unix ms (now when omitted)
        #[arg(long, value_name = "MS")]
        at: Option<i64>,
    },
    /// Override the suggested strategy for a collection
    SetStrategy {
        /// Collection name
        #[arg(short, long)]
        collection: String,
        /// Strategy tag: local_wins, remote_wins, merge or manual
        #[arg(short, long, value_name = "STRATEGY")]
        strategy: ResolutionStrategy,
    },
    /// Remove a collection's strategy override
    ClearStrategy {
        /// Collection name
        #[arg(short, long)]
        collection: String,
    },
    /// Make a profile the active one
    Use {
        /// Profile name
        name: String,
    },
}
