//! Single extension commands

use anyhow::{Context, Result};
use mechanic_core::{FileSettingsProvider, SettingsProvider};
use mechanic_extensions::SourceFetcher;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::SingleCommands;
use crate::output;

#[derive(Tabled)]
struct SingleRow {
    name: String,
    path: String,
}

pub async fn run(cmd: SingleCommands) -> Result<()> {
    let provider = FileSettingsProvider::new()?;
    let mut settings = provider.load().context("Failed to load settings")?;

    match cmd {
        SingleCommands::List => {
            if settings.single_extensions.is_empty() {
                output::info("No single extensions registered");
                return Ok(());
            }
            let rows: Vec<SingleRow> = settings
                .single_extensions
                .iter()
                .map(|entry| SingleRow {
                    name: entry.name.clone(),
                    path: entry.path.display().to_string(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{}", table);
        }
        SingleCommands::Add { path } => {
            let path = std::fs::canonicalize(&path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            let fetcher = SourceFetcher::from_settings(&settings)?;
            let metadata = fetcher.describe_single_extension(&path).await?;

            let listed = settings.add_single_extension(&path, &metadata.name)?;
            provider.save(&settings)?;
            output::success(&format!("Registered {} from {}", listed, path.display()));
        }
        SingleCommands::Remove { name } => {
            if settings.remove_single_extension(&name) {
                provider.save(&settings)?;
                output::success(&format!("Removed {}", name));
            } else {
                output::warning(&format!("No single extension named '{}'", name));
            }
        }
    }

    Ok(())
}
