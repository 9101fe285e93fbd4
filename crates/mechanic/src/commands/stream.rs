//! Stream management commands

use anyhow::{Context, Result};
use mechanic_core::{FileSettingsProvider, SettingsProvider};
use mechanic_extensions::SourceFetcher;
use tracing::info;

use crate::cli::StreamCommands;
use crate::output;

pub async fn run(cmd: StreamCommands) -> Result<()> {
    let provider = FileSettingsProvider::new()?;
    let mut settings = provider.load().context("Failed to load settings")?;

    match cmd {
        StreamCommands::List => {
            output::header("Streams");
            for url in &settings.streams {
                let note = settings.is_store_stream(url).then_some("store");
                output::list_item(url, note);
            }
        }
        StreamCommands::Add { url } => {
            let fetcher = SourceFetcher::from_settings(&settings)?;
            let spinner = output::spinner(&format!("Checking {}...", url));
            let validation = fetcher.validate_stream(&url).await;
            spinner.finish_and_clear();
            validation.with_context(|| format!("{} is not an extension stream", url))?;

            settings.add_stream(&url)?;
            provider.save(&settings)?;
            info!("Added stream {}", url);
            output::success(&format!("Added stream {}", url));
        }
        StreamCommands::Remove { url } => {
            if settings.remove_stream(&url) {
                provider.save(&settings)?;
                output::success(&format!("Removed stream {}", url));
            } else {
                output::warning(&format!("Stream {} is not configured", url));
            }
        }
    }

    Ok(())
}
