//! Batch lifecycle actions
//!
//! Runs install, update, uninstall or purchase over a selection of catalog
//! records, one record at a time. A failing record is recorded and the batch
//! moves on; the caller reports the aggregate outcome once.

use crate::catalog::{Catalog, ProgressCallback};
use crate::errors::FailedAction;
use crate::host::ExtensionHost;
use mechanic_core::types::{ExtensionRecord, LifecycleAction, RecordKey};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Synchronous yes/no question asked before a destructive batch
pub trait Confirm {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str, &str) -> bool,
{
    fn confirm(&self, title: &str, message: &str) -> bool {
        self(title, message)
    }
}

/// Outcome of one batch action
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub action: LifecycleAction,

    pub succeeded: Vec<RecordKey>,

    pub failed: Vec<FailedAction>,

    /// Selected records the action does not apply to
    pub skipped: Vec<RecordKey>,

    /// The confirmation was declined; nothing was run
    pub cancelled: bool,
}

impl BatchResult {
    fn new(action: LifecycleAction) -> Self {
        Self {
            action,
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            cancelled: false,
        }
    }

    /// Records the action was run for (or looked up), excluding skipped ones
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Check if the batch ran and nothing failed
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed.is_empty()
    }

    /// Check if the batch was partial (some succeeded, some failed)
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// Number of records in a selection each action applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSummary {
    pub install: usize,
    pub update: usize,
    pub uninstall: usize,
    pub purchase: usize,
}

impl ActionSummary {
    pub fn for_selection<'a>(records: impl IntoIterator<Item = &'a ExtensionRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            for action in LifecycleAction::ALL {
                if record.is_eligible(action) {
                    *summary.count_mut(action) += 1;
                }
            }
        }
        summary
    }

    pub fn count(&self, action: LifecycleAction) -> usize {
        match action {
            LifecycleAction::Install => self.install,
            LifecycleAction::Update => self.update,
            LifecycleAction::Uninstall => self.uninstall,
            LifecycleAction::Purchase => self.purchase,
        }
    }

    fn count_mut(&mut self, action: LifecycleAction) -> &mut usize {
        match action {
            LifecycleAction::Install => &mut self.install,
            LifecycleAction::Update => &mut self.update,
            LifecycleAction::Uninstall => &mut self.uninstall,
            LifecycleAction::Purchase => &mut self.purchase,
        }
    }
}

/// Executes batch actions through the extension host
pub struct ActionOrchestrator {
    host: Arc<dyn ExtensionHost>,
}

impl ActionOrchestrator {
    pub fn new(host: Arc<dyn ExtensionHost>) -> Self {
        Self { host }
    }

    /// Run `action` over the selected records
    ///
    /// Unknown keys are reported as failures and records the action does not
    /// apply to as skipped. A key selected twice runs once. Uninstalling store extensions needs `confirm` to
    /// agree first; it is asked once for the whole batch, and without it no
    /// record is touched.
    pub async fn execute(
        &self,
        catalog: &mut Catalog,
        selection: &[RecordKey],
        action: LifecycleAction,
        confirm: Option<&dyn Confirm>,
        progress: ProgressCallback<'_>,
    ) -> BatchResult {
        let mut result = BatchResult::new(action);
        let mut eligible = Vec::new();
        let mut seen = HashSet::new();

        for key in selection {
            if !seen.insert(key) {
                debug!("Ignoring repeated selection of {}", key);
                continue;
            }
            match catalog.get(key) {
                None => result
                    .failed
                    .push(FailedAction::new(key.clone(), action, "not in catalog")),
                Some(record) if record.is_eligible(action) => eligible.push(key.clone()),
                Some(_) => {
                    debug!("Skipping {}: cannot {} it", key, action);
                    result.skipped.push(key.clone());
                }
            }
        }

        if action == LifecycleAction::Uninstall
            && !self.confirm_store_uninstall(catalog, &eligible, confirm)
        {
            info!("Uninstall cancelled");
            result.cancelled = true;
            return result;
        }

        let total = eligible.len();
        info!("{} ({} extensions)", action.progress_message(), total);

        for (current, key) in eligible.into_iter().enumerate() {
            if let Some(callback) = progress {
                callback(current + 1, total, &key.name);
            }

            let outcome = match catalog.get(&key) {
                Some(record) => self.run(record, action).await,
                None => Err(anyhow::anyhow!("not in catalog")),
            };

            match outcome {
                Ok(()) => {
                    if let Some(record) = catalog.get_mut(&key) {
                        apply_success(record, action);
                    }
                    result.succeeded.push(key);
                }
                Err(e) => {
                    warn!("Failed to {} {}: {:#} (continuing...)", action, key, e);
                    result
                        .failed
                        .push(FailedAction::new(key, action, format!("{:#}", e)));
                }
            }
        }

        if result.has_failures() {
            warn!(
                "{} of {} extensions failed to {}",
                result.failed.len(),
                result.attempted(),
                action
            );
        }
        result
    }

    /// Ask once before removing purchased extensions
    fn confirm_store_uninstall(
        &self,
        catalog: &Catalog,
        keys: &[RecordKey],
        confirm: Option<&dyn Confirm>,
    ) -> bool {
        let purchased: Vec<&str> = keys
            .iter()
            .filter_map(|key| catalog.get(key))
            .filter(|record| record.is_from_store())
            .map(|record| record.name.as_str())
            .collect();

        if purchased.is_empty() {
            return true;
        }

        let message = format!(
            "You are about to uninstall extensions bought from the Extension Store: {}. \
             You will be able to reinstall them from the Extension Store.",
            purchased.join(", ")
        );
        match confirm {
            Some(confirm) => confirm.confirm("Uninstall purchased extensions?", &message),
            None => false,
        }
    }

    async fn run(&self, record: &ExtensionRecord, action: LifecycleAction) -> anyhow::Result<()> {
        match action {
            LifecycleAction::Install | LifecycleAction::Update => self.host.install(record).await,
            LifecycleAction::Uninstall => self.host.uninstall(record).await,
            LifecycleAction::Purchase => self.host.open_purchase(record).await,
        }
    }
}

fn apply_success(record: &mut ExtensionRecord, action: LifecycleAction) {
    match action {
        LifecycleAction::Install | LifecycleAction::Update => {
            record.is_installed = true;
            record.installed_version = record.remote_version.clone();
            record.needs_update = false;
        }
        LifecycleAction::Uninstall => {
            record.is_installed = false;
            record.installed_version = None;
            record.store_key = None;
            record.needs_update = false;
        }
        LifecycleAction::Purchase => {}
    }
}
