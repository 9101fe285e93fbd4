//! Local installation manifest types

use crate::types::LocalInstall;
use crate::version::ExtensionVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local installation manifest (~/.mechanic/manifest.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstallManifest {
    /// Schema version
    pub schema_version: String,

    /// Last update time
    pub last_updated: DateTime<Utc>,

    /// Installed extensions by name
    #[serde(default)]
    pub extensions: BTreeMap<String, InstalledExtension>,
}

impl Default for InstallManifest {
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            last_updated: Utc::now(),
            extensions: BTreeMap::new(),
        }
    }
}

/// Installed extension entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstalledExtension {
    /// Installed version
    pub version: Option<ExtensionVersion>,

    /// Installation timestamp
    pub installed_at: DateTime<Utc>,

    /// Stream or descriptor the extension was installed from
    pub source: String,

    /// Store licence key
    #[serde(default)]
    pub store_key: Option<String>,
}

impl From<&InstalledExtension> for LocalInstall {
    fn from(entry: &InstalledExtension) -> Self {
        LocalInstall {
            version: entry.version.clone(),
            store_key: entry.store_key.clone(),
        }
    }
}
