//! Mechanic settings
//!
//! A flat settings map: the configured streams, which stream is the
//! extension store, whether to check for updates on startup, the registered
//! single-extension descriptors and the time of the last update check.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A registered single-extension YAML descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleExtensionEntry {
    /// Path to the YAML descriptor
    pub path: PathBuf,

    /// Name the extension is listed under (may carry a " (n)" suffix)
    pub name: String,
}

/// One configured metadata source, in load order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// Bulk JSON stream (URL or local path)
    Stream { url: String, is_store: bool },

    /// Single YAML descriptor
    SingleExtension(SingleExtensionEntry),
}

impl SourceDescriptor {
    /// Origin used as the record's source URL
    pub fn origin(&self) -> String {
        match self {
            SourceDescriptor::Stream { url, .. } => url.clone(),
            SourceDescriptor::SingleExtension(entry) => entry.path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Bulk extension streams, in load order
    pub streams: Vec<String>,

    /// Stream whose items are store extensions
    pub store_stream: String,

    /// Check for updates on startup
    pub check_for_updates: bool,

    #[serde(default)]
    pub single_extensions: Vec<SingleExtensionEntry>,

    #[serde(default)]
    pub last_update_check: Option<DateTime<Utc>>,

    pub http_timeout_secs: u64,

    pub max_concurrent_fetches: usize,

    pub recheck_interval_secs: u64,
}

impl Settings {
    /// Sources in load order: streams first, then single extensions
    pub fn source_descriptors(&self) -> Vec<SourceDescriptor> {
        let streams = self.streams.iter().map(|url| SourceDescriptor::Stream {
            url: url.clone(),
            is_store: self.is_store_stream(url),
        });
        let singles = self
            .single_extensions
            .iter()
            .cloned()
            .map(SourceDescriptor::SingleExtension);
        streams.chain(singles).collect()
    }

    pub fn is_store_stream(&self, url: &str) -> bool {
        url == self.store_stream
    }

    /// Add a stream; duplicates are rejected
    pub fn add_stream(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::invalid_stream(url, "empty stream URL"));
        }
        if self.streams.iter().any(|s| s == url) {
            return Err(Error::duplicate_stream(url));
        }
        debug!("Adding stream {}", url);
        self.streams.push(url.to_string());
        Ok(())
    }

    /// Remove a stream; returns false when it was not configured
    pub fn remove_stream(&mut self, url: &str) -> bool {
        let before = self.streams.len();
        self.streams.retain(|s| s != url.trim());
        before != self.streams.len()
    }

    /// Register a single-extension descriptor
    ///
    /// A descriptor that is already registered is rejected. A name that
    /// clashes with another registered descriptor is listed as "name (1)",
    /// "name (2)", ... Returns the name the extension is listed under.
    pub fn add_single_extension(&mut self, path: &Path, name: &str) -> Result<String> {
        if let Some(existing) = self.single_extensions.iter().find(|e| e.path == path) {
            return Err(Error::duplicate_single_extension(&existing.name));
        }

        let listed = self.unique_single_extension_name(name);
        debug!("Adding single extension {} from {:?}", listed, path);
        self.single_extensions.push(SingleExtensionEntry {
            path: path.to_path_buf(),
            name: listed.clone(),
        });
        Ok(listed)
    }

    /// Remove a single-extension descriptor by its listed name
    pub fn remove_single_extension(&mut self, name: &str) -> bool {
        let before = self.single_extensions.len();
        self.single_extensions.retain(|e| e.name != name);
        before != self.single_extensions.len()
    }

    fn unique_single_extension_name(&self, name: &str) -> String {
        let taken = |candidate: &str| self.single_extensions.iter().any(|e| e.name == candidate);

        if !taken(name) {
            return name.to_string();
        }
        (1..)
            .map(|count| format!("{} ({})", name, count))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    pub fn record_update_check(&mut self, at: DateTime<Utc>) {
        self.last_update_check = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            streams: vec![
                "http://store.example/data.json".to_string(),
                "https://repo.example/registry.json".to_string(),
            ],
            store_stream: "http://store.example/data.json".to_string(),
            check_for_updates: true,
            single_extensions: Vec::new(),
            last_update_check: None,
            http_timeout_secs: 30,
            max_concurrent_fetches: 4,
            recheck_interval_secs: 3600,
        }
    }

    #[test]
    fn test_add_stream_rejects_duplicates() {
        let mut s = settings();
        s.add_stream("https://other.example/x.json").unwrap();
        assert_eq!(s.streams.len(), 3);

        let err = s.add_stream("https://other.example/x.json").unwrap_err();
        assert!(matches!(err, Error::DuplicateStream { .. }));
        assert!(s.add_stream("  ").is_err());
    }

    #[test]
    fn test_remove_stream() {
        let mut s = settings();
        assert!(s.remove_stream("https://repo.example/registry.json"));
        assert!(!s.remove_stream("https://repo.example/registry.json"));
        assert_eq!(s.streams, vec!["http://store.example/data.json".to_string()]);
    }

    #[test]
    fn test_single_extension_names_are_disambiguated() {
        let mut s = settings();
        assert_eq!(
            s.add_single_extension(Path::new("/a/ext.yaml"), "Ext").unwrap(),
            "Ext"
        );
        assert_eq!(
            s.add_single_extension(Path::new("/b/ext.yaml"), "Ext").unwrap(),
            "Ext (1)"
        );
        assert_eq!(
            s.add_single_extension(Path::new("/c/ext.yaml"), "Ext").unwrap(),
            "Ext (2)"
        );

        let err = s
            .add_single_extension(Path::new("/a/ext.yaml"), "Ext")
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSingleExtension { .. }));

        assert!(s.remove_single_extension("Ext (1)"));
        assert_eq!(s.single_extensions.len(), 2);
    }

    #[test]
    fn test_source_descriptors_order_and_store_flag() {
        let mut s = settings();
        s.add_single_extension(Path::new("/a/ext.yaml"), "Ext").unwrap();

        let sources = s.source_descriptors();
        assert_eq!(sources.len(), 3);
        assert_eq!(
            sources[0],
            SourceDescriptor::Stream {
                url: "http://store.example/data.json".to_string(),
                is_store: true
            }
        );
        assert!(matches!(
            &sources[1],
            SourceDescriptor::Stream { is_store: false, .. }
        ));
        assert_eq!(sources[2].origin(), "/a/ext.yaml");
    }
}
