//! Catalog aggregation
//!
//! `CatalogBuilder` fetches every configured source, turns each raw item into
//! an `ExtensionRecord` and merges the results into a `Catalog`. Loading is
//! best effort: a source that cannot be fetched or an item that cannot be
//! read is reported as a `LoadError` and skipped, never aborting the load.
//!
//! Sources are fetched concurrently but merged in configured order, so
//! duplicate identities resolve the same way on every run (later sources
//! overwrite earlier ones).

use crate::errors::LoadError;
use crate::fetcher::{RawItem, SourceFetcher};
use crate::host::ExtensionHost;
use crate::update::UpdateChecker;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use mechanic_core::config::SourceDescriptor;
use mechanic_core::types::{ExtensionKind, ExtensionMetadata, ExtensionRecord, RecordKey};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Progress callback: (current, total, item)
pub type ProgressCallback<'a> = Option<&'a dyn Fn(usize, usize, &str)>;

const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Merged extension records of one load, with facet indexes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<ExtensionRecord>,
    index: HashMap<RecordKey, usize>,
    developers: BTreeSet<String>,
    tags: BTreeSet<String>,
    sources: Vec<String>,
    last_update_check: Option<DateTime<Utc>>,
}

impl Catalog {
    /// Catalog over the given records; duplicate identities keep the last one
    pub fn from_records(
        records: impl IntoIterator<Item = ExtensionRecord>,
        sources: Vec<String>,
    ) -> Self {
        let mut catalog = Self {
            sources,
            ..Self::default()
        };
        for record in records {
            catalog.upsert(record);
        }
        catalog.recompute_facets();
        catalog
    }

    pub fn records(&self) -> &[ExtensionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&ExtensionRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub(crate) fn get_mut(&mut self, key: &RecordKey) -> Option<&mut ExtensionRecord> {
        match self.index.get(key) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut ExtensionRecord> {
        self.records.iter_mut()
    }

    /// Records listed under a name, from every source
    pub fn find_by_name(&self, name: &str) -> Vec<&ExtensionRecord> {
        self.records.iter().filter(|r| r.name == name).collect()
    }

    /// Keys of every record listed under one of `names`, plus the names
    /// nothing is listed under
    pub fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> (Vec<RecordKey>, Vec<String>) {
        let mut keys = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            let found = self.find_by_name(name.as_ref());
            if found.is_empty() {
                unknown.push(name.as_ref().to_string());
            }
            keys.extend(found.into_iter().map(ExtensionRecord::key));
        }
        (keys, unknown)
    }

    /// Developer facet (sorted)
    pub fn developers(&self) -> &BTreeSet<String> {
        &self.developers
    }

    /// Tag facet (sorted)
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Configured bulk sources, in configured order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn last_update_check(&self) -> Option<DateTime<Utc>> {
        self.last_update_check
    }

    pub(crate) fn set_last_update_check(&mut self, at: DateTime<Utc>) {
        self.last_update_check = Some(at);
    }

    /// Insert a record, replacing one with the same identity in place
    fn upsert(&mut self, record: ExtensionRecord) {
        let key = record.key();
        match self.index.get(&key) {
            Some(&i) => {
                debug!("Replacing duplicate record {}", key);
                self.records[i] = record;
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Rebuild developer and tag facets from the current records
    fn recompute_facets(&mut self) {
        self.developers = self.records.iter().map(|r| r.developer.clone()).collect();
        self.tags = self
            .records
            .iter()
            .flat_map(|r| r.tags.iter().cloned())
            .collect();
    }
}

/// Builds catalogs from configured sources
pub struct CatalogBuilder {
    fetcher: SourceFetcher,
    host: Arc<dyn ExtensionHost>,
    checker: UpdateChecker,
    max_concurrent_fetches: usize,
}

impl CatalogBuilder {
    pub fn new(fetcher: SourceFetcher, host: Arc<dyn ExtensionHost>) -> Self {
        let checker = UpdateChecker::new(host.clone());
        Self {
            fetcher,
            host,
            checker,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// Use a custom update checker for `check_for_updates` loads
    pub fn with_checker(mut self, checker: UpdateChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Load every source into a fresh catalog
    ///
    /// Never fails as a whole: unreachable sources and unreadable items are
    /// returned next to the catalog. With `check_for_updates` every record
    /// is checked before returning and the check time is recorded.
    pub async fn build(
        &self,
        sources: &[SourceDescriptor],
        check_for_updates: bool,
        progress: ProgressCallback<'_>,
    ) -> (Catalog, Vec<LoadError>) {
        info!("Loading extensions from {} sources", sources.len());

        let semaphore = Semaphore::new(self.max_concurrent_fetches);
        let fetches = sources.iter().map(|source| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.ok();
                self.fetcher.fetch(source).await
            }
        });
        let fetched = join_all(fetches).await;

        let bulk_sources = sources
            .iter()
            .filter_map(|source| match source {
                SourceDescriptor::Stream { url, .. } => Some(url.clone()),
                SourceDescriptor::SingleExtension(_) => None,
            })
            .collect();

        let mut catalog = Catalog {
            sources: bulk_sources,
            ..Catalog::default()
        };
        let mut errors = Vec::new();
        let total = sources.len();

        for (current, (source, result)) in sources.iter().zip(fetched).enumerate() {
            let origin = source.origin();
            if let Some(callback) = progress {
                callback(current + 1, total, &origin);
            }

            let items = match result {
                Ok(items) => items,
                Err(e) => {
                    warn!("{} (continuing...)", e);
                    errors.push(LoadError::Fetch(e));
                    continue;
                }
            };

            let kind = kind_of(source);
            for (position, item) in items.iter().enumerate() {
                match self.record_from_item(item, &origin, kind) {
                    Ok(record) => catalog.upsert(record),
                    Err(cause) => {
                        let error = LoadError::item(&origin, item_label(item, position), cause);
                        warn!("{}", error);
                        errors.push(error);
                    }
                }
            }
        }

        catalog.recompute_facets();

        if check_for_updates {
            let report = self.checker.check_all(&mut catalog, false, None).await;
            errors.extend(report.failed.into_iter().map(LoadError::UpdateCheck));
        }

        info!(
            "Loaded {} extensions ({} problems)",
            catalog.len(),
            errors.len()
        );
        (catalog, errors)
    }

    fn record_from_item(
        &self,
        item: &RawItem,
        origin: &str,
        kind: ExtensionKind,
    ) -> mechanic_core::Result<ExtensionRecord> {
        let metadata = ExtensionMetadata::from_value(item)?;
        let local = self.host.local_install(&metadata.name);
        ExtensionRecord::from_metadata(metadata, origin, kind, local)
    }
}

fn kind_of(source: &SourceDescriptor) -> ExtensionKind {
    match source {
        SourceDescriptor::Stream { is_store: true, .. } => ExtensionKind::StoreSourced,
        SourceDescriptor::Stream { .. } => ExtensionKind::RepositorySourced,
        SourceDescriptor::SingleExtension(_) => ExtensionKind::LocalYamlSourced,
    }
}

/// Name of a raw item for error reports, or its position when unnamed
fn item_label(item: &RawItem, position: usize) -> String {
    item.get("extensionName")
        .and_then(|name| name.as_str())
        .map(String::from)
        .unwrap_or_else(|| format!("#{}", position))
}
