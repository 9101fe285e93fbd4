//! File-backed extension host
//!
//! Tracks installed extensions in a manifest at ~/.mechanic/manifest.yaml
//! and keeps downloaded package archives next to it:
//! ```yaml
//! schema-version: "1.0"
//! last-updated: "2026-01-21T10:00:00Z"
//! extensions:
//!   Batch:
//!     version: "1.9.2"
//!     installed-at: "2026-01-20T15:30:00Z"
//!     source: "https://robofont-mechanic.github.io/mechanic-2-server/api/v2/registry.json"
//! ```

use crate::errors::FetchError;
use crate::fetcher::{RawItem, SourceFetcher};
use crate::host::ExtensionHost;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use mechanic_core::config::{SingleExtensionEntry, SourceDescriptor};
use mechanic_core::types::{
    ExtensionKind, ExtensionMetadata, ExtensionRecord, InstallManifest, InstalledExtension,
    LocalInstall,
};
use mechanic_core::ExtensionVersion;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const MANIFEST_FILE: &str = "manifest.yaml";
const PACKAGES_DIR: &str = "packages";

/// Extension host that records installations in a manifest file
pub struct ManifestHost {
    manifest_path: PathBuf,
    packages_dir: PathBuf,
    manifest: Mutex<InstallManifest>,
    fetcher: SourceFetcher,
    /// Source contents fetched during the current round of update checks
    fetched_sources: Mutex<HashMap<String, Result<Arc<Vec<RawItem>>, FetchError>>>,
}

impl ManifestHost {
    /// Open the manifest in `home`, creating it if it doesn't exist
    pub fn new(home: &Path, fetcher: SourceFetcher) -> Result<Self> {
        let manifest_path = home.join(MANIFEST_FILE);
        debug!("Loading manifest from: {:?}", manifest_path);

        let manifest = if manifest_path.exists() {
            Self::load_manifest(&manifest_path)?
        } else {
            info!("Creating new manifest at: {:?}", manifest_path);
            let manifest = InstallManifest::default();
            std::fs::create_dir_all(home)?;
            Self::save_manifest(&manifest_path, &manifest)?;
            manifest
        };

        Ok(Self {
            manifest_path,
            packages_dir: home.join(PACKAGES_DIR),
            manifest: Mutex::new(manifest),
            fetcher,
            fetched_sources: Mutex::new(HashMap::new()),
        })
    }

    /// Open the manifest in the Mechanic home directory
    pub fn load_default(fetcher: SourceFetcher) -> Result<Self> {
        let home = mechanic_core::get_mechanic_home()?;
        Self::new(&home, fetcher)
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Installed extensions by name
    pub fn installed(&self) -> Result<Vec<(String, InstalledExtension)>> {
        Ok(self
            .lock()?
            .extensions
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect())
    }

    /// Path of the downloaded archive for an extension, always inside the
    /// packages directory
    pub fn package_path(&self, name: &str) -> PathBuf {
        self.packages_dir.join(package_file_name(name))
    }

    fn lock(&self) -> Result<MutexGuard<'_, InstallManifest>> {
        self.manifest
            .lock()
            .map_err(|_| anyhow!("Manifest lock poisoned"))
    }

    fn load_manifest(path: &Path) -> Result<InstallManifest> {
        let content = std::fs::read_to_string(path)?;
        let manifest: InstallManifest = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Invalid manifest {:?}", path))?;
        debug!(
            "Loaded manifest with {} extensions",
            manifest.extensions.len()
        );
        Ok(manifest)
    }

    fn save_manifest(path: &Path, manifest: &InstallManifest) -> Result<()> {
        let content = serde_yaml_ng::to_string(manifest)?;
        std::fs::write(path, content)?;
        debug!(
            "Saved manifest with {} extensions",
            manifest.extensions.len()
        );
        Ok(())
    }

    fn update_manifest(&self, change: impl FnOnce(&mut InstallManifest)) -> Result<()> {
        let mut manifest = self.lock()?;
        change(&mut manifest);
        manifest.last_updated = Utc::now();
        Self::save_manifest(&self.manifest_path, &manifest)
    }

    /// Items of a source, fetched at most once per round of update checks
    async fn remote_items(
        &self,
        source: &SourceDescriptor,
    ) -> Result<Arc<Vec<RawItem>>, FetchError> {
        let origin = source.origin();
        if let Some(cached) = self.cached_items(&origin) {
            debug!("Reusing fetched items of {}", origin);
            return cached;
        }

        let fetched = self.fetcher.fetch(source).await.map(Arc::new);
        if let Ok(mut cache) = self.fetched_sources.lock() {
            cache.insert(origin, fetched.clone());
        }
        fetched
    }

    fn cached_items(&self, origin: &str) -> Option<Result<Arc<Vec<RawItem>>, FetchError>> {
        self.fetched_sources.lock().ok()?.get(origin).cloned()
    }

    /// Source the record's metadata is re-read from
    fn source_of(record: &ExtensionRecord) -> SourceDescriptor {
        match record.kind {
            ExtensionKind::LocalYamlSourced => SourceDescriptor::SingleExtension(SingleExtensionEntry {
                path: PathBuf::from(&record.source_url),
                name: record.name.clone(),
            }),
            kind => SourceDescriptor::Stream {
                url: record.source_url.clone(),
                is_store: kind == ExtensionKind::StoreSourced,
            },
        }
    }
}

#[async_trait]
impl ExtensionHost for ManifestHost {
    fn local_install(&self, name: &str) -> Option<LocalInstall> {
        let manifest = self.lock().ok()?;
        manifest.extensions.get(name).map(LocalInstall::from)
    }

    async fn install(&self, record: &ExtensionRecord) -> Result<()> {
        if let Some(url) = &record.download_url {
            let archive = self
                .fetcher
                .download(url)
                .await
                .with_context(|| format!("Failed to download {}", record.name))?;
            tokio::fs::create_dir_all(&self.packages_dir).await?;
            tokio::fs::write(self.package_path(&record.name), archive).await?;
        }

        info!("Marking {} as installed", record.name);
        self.update_manifest(|manifest| {
            let store_key = manifest
                .extensions
                .get(&record.name)
                .and_then(|existing| existing.store_key.clone())
                .or_else(|| record.store_key.clone());
            manifest.extensions.insert(
                record.name.clone(),
                InstalledExtension {
                    version: record.remote_version.clone(),
                    installed_at: Utc::now(),
                    source: record.source_url.clone(),
                    store_key,
                },
            );
        })
    }

    async fn uninstall(&self, record: &ExtensionRecord) -> Result<()> {
        let installed = self.lock()?.extensions.contains_key(&record.name);
        if !installed {
            return Err(anyhow!("{} is not installed", record.name));
        }

        let package = self.package_path(&record.name);
        if package.exists() {
            tokio::fs::remove_file(&package).await?;
        }

        info!("Removing {} from manifest", record.name);
        self.update_manifest(|manifest| {
            manifest.extensions.remove(&record.name);
        })
    }

    fn begin_update_check(&self) {
        if let Ok(mut cache) = self.fetched_sources.lock() {
            cache.clear();
        }
    }

    async fn remote_version_of(&self, record: &ExtensionRecord) -> Result<Option<ExtensionVersion>> {
        let source = Self::source_of(record);
        let items = self.remote_items(&source).await?;

        let metadata = items
            .iter()
            .filter_map(|item| ExtensionMetadata::from_value(item).ok())
            .find(|metadata| metadata.name == record.name)
            .ok_or_else(|| anyhow!("{} is no longer listed by {}", record.name, record.source_url))?;

        Ok(metadata.parsed_version()?)
    }
}

/// Archive file name for an extension, with path separators and leading
/// dots replaced
fn package_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let safe = safe.trim_start_matches('.');
    if safe.is_empty() {
        "_.zip".to_string()
    } else {
        format!("{}.zip", safe)
    }
}
