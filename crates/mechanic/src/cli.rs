//! CLI argument parsing with clap

use clap::{ArgAction, Args, Parser, Subcommand};
use mechanic_extensions::StatusFilter;
use std::path::PathBuf;

/// Mechanic - install, update and discover RoboFont extensions
#[derive(Parser, Debug)]
#[command(name = "mechanic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List and search extensions from every configured stream
    List(ListArgs),

    /// Check installed extensions for updates
    Check(CheckArgs),

    /// Install extensions
    Install(ActionArgs),

    /// Update installed extensions (all outdated ones when no name is given)
    Update(ActionArgs),

    /// Uninstall extensions
    Uninstall(ActionArgs),

    /// Open the purchase page of store extensions
    Purchase(ActionArgs),

    /// Manage extension streams
    #[command(subcommand)]
    Stream(StreamCommands),

    /// Manage single extensions described by local YAML files
    #[command(subcommand)]
    Single(SingleCommands),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Search terms (all must match name, developer, description or tags)
    pub terms: Vec<String>,

    /// Only show extensions by this developer (repeatable)
    #[arg(long = "developer", value_name = "NAME")]
    pub developers: Vec<String>,

    /// Only show extensions with this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Stream selection (accepted, not applied to the result)
    #[arg(long = "source", value_name = "URL")]
    pub sources: Vec<String>,

    /// Installation state: all, installed, not-installed, updates
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,

    /// Check for updates before listing
    #[arg(long)]
    pub check: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Only check these extensions
    pub names: Vec<String>,

    /// Look up published versions even for already checked extensions
    #[arg(short, long)]
    pub force: bool,

    /// Skip the "check again?" prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Extension names
    pub names: Vec<String>,

    /// Only act on extensions listed by this stream
    #[arg(long, value_name = "URL")]
    pub source: Option<String>,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum StreamCommands {
    /// List configured streams
    List,

    /// Add a stream after checking it serves extensions
    Add {
        /// Stream URL or local path
        url: String,
    },

    /// Remove a stream
    Remove {
        /// Stream URL or local path
        url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SingleCommands {
    /// List registered single extensions
    List,

    /// Register a YAML extension descriptor
    Add {
        /// Path to the descriptor
        path: PathBuf,
    },

    /// Unregister a single extension by its listed name
    Remove {
        /// Listed name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore the default settings
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Enable or disable checking for updates when listing
    CheckOnStartup {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
}
