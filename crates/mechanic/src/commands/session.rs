//! Shared setup for commands that work on the catalog

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use mechanic_core::{FileSettingsProvider, Settings, SettingsProvider};
use mechanic_extensions::{
    should_prompt_recheck, Catalog, CatalogBuilder, LoadError, ManifestHost, SourceFetcher,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::output;

/// Settings, fetcher and host for one CLI invocation
pub struct Session {
    pub provider: FileSettingsProvider,
    pub settings: Settings,
    pub fetcher: SourceFetcher,
    pub host: Arc<ManifestHost>,
}

impl Session {
    pub fn open() -> Result<Self> {
        let provider = FileSettingsProvider::new()?;
        let settings = provider.load().context("Failed to load settings")?;
        let fetcher = SourceFetcher::from_settings(&settings)?;
        let host = Arc::new(ManifestHost::load_default(fetcher.clone())?);
        debug!("Using manifest {:?}", host.manifest_path());

        Ok(Self {
            provider,
            settings,
            fetcher,
            host,
        })
    }

    pub fn recheck_interval(&self) -> Duration {
        Duration::seconds(self.settings.recheck_interval_secs as i64)
    }

    /// Whether the previous update check is still fresh
    pub fn checked_recently(&self, now: DateTime<Utc>) -> bool {
        should_prompt_recheck(self.settings.last_update_check, now, self.recheck_interval())
    }

    /// Load every configured source, showing a spinner, and report problems once
    pub async fn load_catalog(&mut self, check_for_updates: bool) -> Result<Catalog> {
        let sources = self.settings.source_descriptors();
        let builder = CatalogBuilder::new(self.fetcher.clone(), self.host.clone())
            .with_max_concurrent_fetches(self.settings.max_concurrent_fetches);

        let spinner = output::spinner("Loading extensions...");
        let (catalog, errors) = builder
            .build(
                &sources,
                check_for_updates,
                Some(&|current, total, origin| {
                    spinner.set_message(format!("Loading {} ({}/{})", origin, current, total));
                }),
            )
            .await;
        spinner.finish_and_clear();

        report_load_errors(&errors);

        if let Some(at) = catalog.last_update_check() {
            self.remember_update_check(at)?;
        }

        Ok(catalog)
    }

    /// Persist the time of the latest update check
    pub fn remember_update_check(&mut self, at: DateTime<Utc>) -> Result<()> {
        self.settings.record_update_check(at);
        self.provider
            .save(&self.settings)
            .context("Failed to save settings")
    }
}

/// Print one summary line per kind of load problem; details go to the log
fn report_load_errors(errors: &[LoadError]) {
    if errors.is_empty() {
        return;
    }

    let mut skipped_items: BTreeMap<&str, usize> = BTreeMap::new();
    let mut failed_checks = 0;

    for error in errors {
        debug!("{}", error);
        match error {
            LoadError::Fetch(e) => {
                output::warning(&format!("Could not load {}: {}", e.origin, e.cause))
            }
            LoadError::Item { origin, .. } => *skipped_items.entry(origin.as_str()).or_default() += 1,
            LoadError::UpdateCheck(_) => failed_checks += 1,
        }
    }

    for (origin, count) in skipped_items {
        output::warning(&format!(
            "Skipped {} malformed extension(s) from {} (see log for details)",
            count, origin
        ));
    }
    if failed_checks > 0 {
        output::warning(&format!(
            "Update check failed for {} extension(s) (see log for details)",
            failed_checks
        ));
    }
}
