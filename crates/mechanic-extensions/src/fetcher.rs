//! Raw metadata retrieval
//!
//! Reads extension streams (JSON documents with a top-level `extensions`
//! array) over HTTP(S) or from the local filesystem, and single-extension
//! YAML descriptors from disk.

use crate::errors::FetchError;
use anyhow::{anyhow, Context, Result};
use mechanic_core::config::{Settings, SingleExtensionEntry, SourceDescriptor};
use mechanic_core::types::ExtensionMetadata;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// One unvalidated element of a stream's `extensions` array
pub type RawItem = Value;

/// Top-level key holding the item list of a stream
const EXTENSIONS_KEY: &str = "extensions";

/// Fetches raw items from configured sources
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    /// Create a fetcher whose HTTP requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mechanic/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(Duration::from_secs(settings.http_timeout_secs))
    }

    /// Fetch all raw items of one source
    pub async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, FetchError> {
        match source {
            SourceDescriptor::Stream { url, .. } => self.fetch_stream(url).await,
            SourceDescriptor::SingleExtension(entry) => {
                self.read_single_extension(entry).await.map(|item| vec![item])
            }
        }
    }

    /// Fetch a bulk stream; a document without `extensions` yields no items
    pub async fn fetch_stream(&self, url: &str) -> Result<Vec<RawItem>, FetchError> {
        let document = self
            .read_json(url)
            .await
            .map_err(|e| FetchError::new(url, format!("{:#}", e)))?;

        let items = extract_items(document).map_err(|e| FetchError::new(url, e))?;
        debug!("Fetched {} items from {}", items.len(), url);
        Ok(items)
    }

    /// Read a single-extension descriptor as one raw item
    ///
    /// The listed name of the entry replaces the descriptor's
    /// `extensionName`, so disambiguated names survive reloads.
    pub async fn read_single_extension(
        &self,
        entry: &SingleExtensionEntry,
    ) -> Result<RawItem, FetchError> {
        let origin = entry.path.display().to_string();
        let mut item = read_yaml_item(&entry.path)
            .await
            .map_err(|e| FetchError::new(&origin, format!("{:#}", e)))?;

        if let Value::Object(map) = &mut item {
            map.insert("extensionName".to_string(), Value::String(entry.name.clone()));
        }
        Ok(item)
    }

    /// Parse and validate a descriptor before it is registered
    pub async fn describe_single_extension(&self, path: &Path) -> Result<ExtensionMetadata> {
        let item = read_yaml_item(path).await?;
        ExtensionMetadata::from_value(&item)
            .with_context(|| format!("Invalid extension descriptor {}", path.display()))
    }

    /// Check that a URL serves an extension stream before it is added
    pub async fn validate_stream(&self, url: &str) -> Result<(), FetchError> {
        let document = self
            .read_json(url)
            .await
            .map_err(|e| FetchError::new(url, format!("{:#}", e)))?;

        match document.get(EXTENSIONS_KEY) {
            Some(Value::Array(_)) => Ok(()),
            Some(_) => Err(FetchError::new(url, "'extensions' is not a list")),
            None => Err(FetchError::new(url, "missing 'extensions' key")),
        }
    }

    /// Download a package archive
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn read_json(&self, url: &str) -> Result<Value> {
        let content = match local_path(url)? {
            Some(path) => tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(anyhow!("HTTP {}", response.status()));
                }
                response.text().await?
            }
        };

        serde_json::from_str(&content).context("Invalid JSON document")
    }
}

/// Local filesystem path for `file://` URLs and plain paths
fn local_path(url: &str) -> Result<Option<PathBuf>> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(None);
    }
    if url.starts_with("file://") {
        let parsed = url::Url::parse(url)?;
        let path = parsed
            .to_file_path()
            .map_err(|_| anyhow!("Not a local file URL: {}", url))?;
        return Ok(Some(path));
    }
    Ok(Some(PathBuf::from(url)))
}

fn extract_items(mut document: Value) -> Result<Vec<RawItem>> {
    match document.get_mut(EXTENSIONS_KEY).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(anyhow!("'extensions' is not a list")),
    }
}

async fn read_yaml_item(path: &Path) -> Result<RawItem> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let item: Value = serde_yaml_ng::from_str(&content).context("Invalid YAML descriptor")?;
    if !item.is_object() {
        return Err(anyhow!("Descriptor is not a mapping"));
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items() {
        let items = extract_items(json!({"extensions": [{"a": 1}, {"b": 2}]})).unwrap();
        assert_eq!(items.len(), 2);

        assert!(extract_items(json!({"other": []})).unwrap().is_empty());
        assert!(extract_items(json!({"extensions": null})).unwrap().is_empty());
        assert!(extract_items(json!({"extensions": "nope"})).is_err());
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("https://a.example/x.json").unwrap(), None);
        assert_eq!(local_path("http://a.example/x.json").unwrap(), None);
        assert_eq!(
            local_path("/tmp/streams/x.json").unwrap(),
            Some(PathBuf::from("/tmp/streams/x.json"))
        );
        assert_eq!(
            local_path("file:///tmp/streams/x.json").unwrap(),
            Some(PathBuf::from("/tmp/streams/x.json"))
        );
    }
}
