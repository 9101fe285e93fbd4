//! Mechanic CLI - extension manager for RoboFont
//!
//! This is the main entry point for the mechanic command-line interface.

mod cli;
mod commands;
mod output;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use mechanic_core::types::LifecycleAction;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::List(args) => commands::list::run(args).await,
        Commands::Check(args) => commands::check::run(args).await,
        Commands::Install(args) => commands::action::run(LifecycleAction::Install, args).await,
        Commands::Update(args) => commands::action::run(LifecycleAction::Update, args).await,
        Commands::Uninstall(args) => commands::action::run(LifecycleAction::Uninstall, args).await,
        Commands::Purchase(args) => commands::action::run(LifecycleAction::Purchase, args).await,
        Commands::Stream(cmd) => commands::stream::run(cmd).await,
        Commands::Single(cmd) => commands::single::run(cmd).await,
        Commands::Settings(cmd) => commands::settings::run(cmd),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
