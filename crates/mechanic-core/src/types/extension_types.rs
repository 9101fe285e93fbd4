//! Extension metadata and catalog record types
//!
//! `ExtensionMetadata` is the shape of one element of a stream's
//! `extensions` array (or of a single-extension YAML descriptor).
//! `ExtensionRecord` is the reconciled view the engine works with: remote
//! metadata plus the local installation state.

use crate::error::{Error, Result};
use crate::version::ExtensionVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where a record's metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionKind {
    /// Free extension listed by a repository stream
    RepositorySourced,
    /// Paid extension listed by the extension store stream
    StoreSourced,
    /// Extension described by a local YAML file
    LocalYamlSourced,
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKind::RepositorySourced => write!(f, "repository"),
            ExtensionKind::StoreSourced => write!(f, "store"),
            ExtensionKind::LocalYamlSourced => write!(f, "local"),
        }
    }
}

/// Batch lifecycle actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Install,
    Update,
    Uninstall,
    Purchase,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 4] = [
        LifecycleAction::Purchase,
        LifecycleAction::Install,
        LifecycleAction::Update,
        LifecycleAction::Uninstall,
    ];

    /// Progress message shown while the action runs
    pub fn progress_message(&self) -> &'static str {
        match self {
            LifecycleAction::Install => "Installing extensions...",
            LifecycleAction::Update => "Updating extensions...",
            LifecycleAction::Uninstall => "Uninstalling extensions...",
            LifecycleAction::Purchase => "Opening purchase pages...",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleAction::Install => write!(f, "install"),
            LifecycleAction::Update => write!(f, "update"),
            LifecycleAction::Uninstall => write!(f, "uninstall"),
            LifecycleAction::Purchase => write!(f, "purchase"),
        }
    }
}

/// One raw extension item as published by a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMetadata {
    /// Extension name
    #[serde(rename = "extensionName")]
    pub name: String,

    /// Developer name
    pub developer: String,

    /// Tags, verbatim from the stream
    pub tags: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Published version (store streams carry it, repository streams may not)
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub version: Option<String>,

    /// Price as a display string ("$25")
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub price: Option<String>,

    #[serde(default, rename = "developerURL")]
    pub developer_url: Option<String>,

    #[serde(default, rename = "homepageURL", alias = "repository")]
    pub homepage_url: Option<String>,

    #[serde(default, rename = "downloadURL")]
    pub download_url: Option<String>,

    #[serde(default, rename = "purchaseURL", alias = "link")]
    pub purchase_url: Option<String>,
}

impl ExtensionMetadata {
    /// Build metadata from one raw JSON item
    ///
    /// Fails on missing required fields, an empty name or developer, and a
    /// version string that cannot be ordered.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let metadata: ExtensionMetadata = serde_json::from_value(value.clone())?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Check required fields and version syntax
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::missing_field("extensionName"));
        }
        if self.developer.trim().is_empty() {
            return Err(Error::missing_field("developer"));
        }
        if self.name.contains(['/', '\\']) {
            return Err(Error::invalid_name(&self.name, "contains a path separator"));
        }
        if self.name.contains("..") {
            return Err(Error::invalid_name(&self.name, "contains '..'"));
        }
        if let Some(version) = &self.version {
            ExtensionVersion::parse(version)?;
        }
        Ok(())
    }

    /// Parsed published version, if any
    pub fn parsed_version(&self) -> Result<Option<ExtensionVersion>> {
        self.version
            .as_deref()
            .map(ExtensionVersion::parse)
            .transpose()
    }
}

/// Accepts strings and numbers; versions and prices are published either way
fn deserialize_loose_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

/// What the host reports about a locally installed extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalInstall {
    /// Installed version, when the package declares one
    pub version: Option<ExtensionVersion>,

    /// Store licence key, present only for copies installed through the store
    pub store_key: Option<String>,
}

/// Source part of the identity shared by all local YAML records
pub const LOCAL_SOURCE: &str = "<local>";

/// Identity of a record within a catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub name: String,
    pub source_url: String,
}

impl RecordKey {
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
        }
    }

    /// Identity of a local YAML record, which is its name alone
    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, LOCAL_SOURCE)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.source_url)
    }
}

/// Reconciled catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub name: String,
    pub developer: String,
    pub source_url: String,
    pub kind: ExtensionKind,

    pub installed_version: Option<ExtensionVersion>,
    pub remote_version: Option<ExtensionVersion>,
    pub store_key: Option<String>,

    pub description: String,
    pub tags: BTreeSet<String>,
    pub price: Option<String>,
    pub homepage_url: Option<String>,
    pub developer_url: Option<String>,
    pub download_url: Option<String>,
    pub purchase_url: Option<String>,

    pub is_installed: bool,

    /// Cached result of the last update check
    pub needs_update: bool,

    /// When the record was last checked for updates in this load cycle
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl ExtensionRecord {
    /// Reconcile stream metadata with the local install state
    pub fn from_metadata(
        metadata: ExtensionMetadata,
        source_url: impl Into<String>,
        kind: ExtensionKind,
        local: Option<LocalInstall>,
    ) -> Result<Self> {
        metadata.validate()?;
        let remote_version = metadata.parsed_version()?;
        let is_store = kind == ExtensionKind::StoreSourced;

        let (is_installed, installed_version, store_key) = match local {
            Some(install) => (
                true,
                install.version,
                install.store_key.filter(|_| is_store),
            ),
            None => (false, None, None),
        };

        Ok(Self {
            name: metadata.name,
            developer: metadata.developer,
            source_url: source_url.into(),
            kind,
            installed_version,
            remote_version,
            store_key,
            description: metadata.description.unwrap_or_default(),
            tags: metadata.tags.into_iter().collect(),
            price: metadata.price,
            homepage_url: metadata.homepage_url,
            developer_url: metadata.developer_url,
            download_url: metadata.download_url,
            purchase_url: metadata.purchase_url.filter(|_| is_store),
            is_installed,
            needs_update: false,
            last_checked_at: None,
        })
    }

    /// Catalog identity
    ///
    /// Stream records are keyed by name and stream; local YAML records by
    /// name only, so the last loaded descriptor of a name wins.
    pub fn key(&self) -> RecordKey {
        match self.kind {
            ExtensionKind::LocalYamlSourced => RecordKey::local(&self.name),
            _ => RecordKey::new(&self.name, &self.source_url),
        }
    }

    pub fn is_from_store(&self) -> bool {
        self.kind == ExtensionKind::StoreSourced
    }

    /// Installed copy of a store extension that did not come through the store
    pub fn is_unofficial(&self) -> bool {
        self.is_installed && self.is_from_store() && self.store_key.is_none()
    }

    /// Whether the action applies to this record in its current state
    pub fn is_eligible(&self, action: LifecycleAction) -> bool {
        match action {
            LifecycleAction::Install => !self.is_installed && !self.is_from_store(),
            LifecycleAction::Update => self.is_installed && self.needs_update,
            LifecycleAction::Uninstall => self.is_installed,
            LifecycleAction::Purchase => self.is_from_store() && !self.is_installed,
        }
    }

    /// Lower-cased text matched by free-text search
    pub fn search_string(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.name, &self.developer, &self.description];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    /// Short state description for listings
    pub fn status_line(&self) -> String {
        let mut parts = Vec::new();

        if self.is_unofficial() {
            parts.push("Unofficial version installed".to_string());
        }

        if self.needs_update {
            parts.push(format!(
                "Found update {} \u{2192} {}",
                display_version(self.installed_version.as_ref()),
                display_version(self.remote_version.as_ref())
            ));
        } else if self.is_installed {
            parts.push(display_version(self.installed_version.as_ref()));
        }

        parts.join(" ")
    }
}

fn display_version(version: Option<&ExtensionVersion>) -> String {
    version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string())
}
