//! Settings commands

use anyhow::{Context, Result};
use dialoguer::Confirm;
use mechanic_core::{FileSettingsProvider, Settings, SettingsProvider};

use crate::cli::SettingsCommands;
use crate::output;

pub fn run(cmd: SettingsCommands) -> Result<()> {
    let provider = FileSettingsProvider::new()?;

    match cmd {
        SettingsCommands::Show { json } => {
            let settings = provider.load().context("Failed to load settings")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                show(&provider, &settings);
            }
        }
        SettingsCommands::Reset { yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Restore default settings? Streams and single extensions will be forgotten")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    output::info("Reset cancelled");
                    return Ok(());
                }
            }
            provider.reset()?;
            output::success("Settings restored to defaults");
        }
        SettingsCommands::CheckOnStartup { enabled } => {
            let mut settings = provider.load().context("Failed to load settings")?;
            settings.check_for_updates = enabled;
            provider.save(&settings)?;
            output::success(&format!(
                "Check for updates on startup {}",
                if enabled { "enabled" } else { "disabled" }
            ));
        }
    }

    Ok(())
}

fn show(provider: &FileSettingsProvider, settings: &Settings) {
    output::header("Settings");
    output::kv("File", provider.settings_path().as_str());
    output::kv("Store stream", &settings.store_stream);
    output::kv("Check on startup", &settings.check_for_updates.to_string());
    output::kv(
        "Last update check",
        &settings
            .last_update_check
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string()),
    );
    output::kv("HTTP timeout", &format!("{}s", settings.http_timeout_secs));
    output::kv(
        "Concurrent fetches",
        &settings.max_concurrent_fetches.to_string(),
    );

    output::header("Streams");
    for url in &settings.streams {
        output::list_item(url, settings.is_store_stream(url).then_some("store"));
    }

    if !settings.single_extensions.is_empty() {
        output::header("Single extensions");
        for entry in &settings.single_extensions {
            output::kv(&entry.name, &entry.path.display().to_string());
        }
    }
}
