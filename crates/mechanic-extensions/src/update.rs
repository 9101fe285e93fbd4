//! Update checks
//!
//! A record needs an update when it is installed and its remote version
//! orders after the installed one. Results are cached on the record for the
//! current load; `force` bypasses the cache.

use crate::catalog::{Catalog, ProgressCallback};
use crate::errors::UpdateCheckError;
use crate::host::ExtensionHost;
use chrono::{DateTime, Duration, Utc};
use mechanic_core::types::{ExtensionRecord, RecordKey};
use mechanic_core::{LenientComparator, VersionComparator};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of checking a batch of records
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Records checked successfully
    pub checked: usize,

    /// Records that have an update available after the check
    pub updates: Vec<RecordKey>,

    /// Lookups that failed; those records keep their previous state
    pub failed: Vec<UpdateCheckError>,

    pub checked_at: DateTime<Utc>,
}

impl UpdateReport {
    fn new(checked_at: DateTime<Utc>) -> Self {
        Self {
            checked: 0,
            updates: Vec::new(),
            failed: Vec::new(),
            checked_at,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn updates_available(&self) -> usize {
        self.updates.len()
    }
}

/// Checks records against their published versions
pub struct UpdateChecker {
    host: Arc<dyn ExtensionHost>,
    comparator: Arc<dyn VersionComparator>,
}

impl UpdateChecker {
    /// Checker using lenient dotted-numeric ordering
    pub fn new(host: Arc<dyn ExtensionHost>) -> Self {
        Self {
            host,
            comparator: Arc::new(LenientComparator),
        }
    }

    pub fn with_comparator(mut self, comparator: impl VersionComparator + 'static) -> Self {
        self.comparator = Arc::new(comparator);
        self
    }

    /// Check one record and return its `needs_update` state
    ///
    /// On failure the record is left untouched and the error returned.
    pub async fn check(
        &self,
        record: &mut ExtensionRecord,
        force: bool,
    ) -> Result<bool, UpdateCheckError> {
        if !force && record.last_checked_at.is_some() {
            debug!("Using cached update state for {}", record.name);
            return Ok(record.needs_update);
        }

        if !record.is_installed {
            record.needs_update = false;
            record.last_checked_at = Some(Utc::now());
            return Ok(false);
        }

        let remote = self
            .host
            .remote_version_of(record)
            .await
            .map_err(|e| UpdateCheckError::new(&record.name, format!("{:#}", e)))?;

        // Without both versions there is nothing to order
        record.needs_update = match (&remote, &record.installed_version) {
            (Some(remote), Some(installed)) => self.comparator.is_newer(remote, installed),
            _ => false,
        };
        if remote.is_none() {
            debug!("No version published for {}", record.name);
        }
        record.remote_version = remote;
        record.last_checked_at = Some(Utc::now());

        if record.needs_update {
            info!("Found update for {}: {}", record.name, record.status_line());
        }
        Ok(record.needs_update)
    }

    /// Check every record in the catalog and record the check time
    pub async fn check_all(
        &self,
        catalog: &mut Catalog,
        force: bool,
        progress: ProgressCallback<'_>,
    ) -> UpdateReport {
        let now = Utc::now();
        let mut report = UpdateReport::new(now);
        let total = catalog.len();
        self.host.begin_update_check();

        for (current, record) in catalog.records_mut().enumerate() {
            if let Some(callback) = progress {
                callback(current + 1, total, &record.name);
            }
            self.check_into(record, force, &mut report).await;
        }

        catalog.set_last_update_check(now);
        report
    }

    /// Check only the given records
    pub async fn check_selected(
        &self,
        catalog: &mut Catalog,
        keys: &[RecordKey],
        force: bool,
        progress: ProgressCallback<'_>,
    ) -> UpdateReport {
        let mut report = UpdateReport::new(Utc::now());
        let total = keys.len();
        self.host.begin_update_check();

        for (current, key) in keys.iter().enumerate() {
            if let Some(callback) = progress {
                callback(current + 1, total, &key.name);
            }
            match catalog.get_mut(key) {
                Some(record) => self.check_into(record, force, &mut report).await,
                None => report
                    .failed
                    .push(UpdateCheckError::new(key.to_string(), "not in catalog")),
            }
        }

        report
    }

    async fn check_into(&self, record: &mut ExtensionRecord, force: bool, report: &mut UpdateReport) {
        match self.check(record, force).await {
            Ok(needs_update) => {
                report.checked += 1;
                if needs_update {
                    report.updates.push(record.key());
                }
            }
            Err(e) => {
                warn!("{} (continuing...)", e);
                report.failed.push(e);
            }
        }
    }
}

/// Whether a manual check should first ask "check again?"
///
/// True when the previous check is younger than `interval`.
pub fn should_prompt_recheck(
    last_check: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval: Duration,
) -> bool {
    last_check
        .map(|last| now.signed_duration_since(last) < interval)
        .unwrap_or(false)
}
