//! Record builders for creating catalog fixtures

#![allow(dead_code)]

use super::constants::*;
use mechanic_core::types::{ExtensionKind, ExtensionMetadata, ExtensionRecord, LocalInstall};
use mechanic_core::ExtensionVersion;
use serde_json::{json, Value};

/// Builder for raw stream items
#[derive(Clone)]
pub struct ItemBuilder {
    item: Value,
}

impl ItemBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            item: json!({
                "extensionName": name,
                "developer": DEFAULT_DEVELOPER,
                "tags": [],
                "description": format!("{} description", name),
            }),
        }
    }

    pub fn with_developer(mut self, developer: &str) -> Self {
        self.item["developer"] = json!(developer);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.item["tags"] = json!(tags);
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.item["version"] = json!(version);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.item["description"] = json!(description);
        self
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.item["link"] = json!(link);
        self
    }

    pub fn with_download_url(mut self, url: &str) -> Self {
        self.item["downloadURL"] = json!(url);
        self
    }

    pub fn without(mut self, field: &str) -> Self {
        if let Some(map) = self.item.as_object_mut() {
            map.remove(field);
        }
        self
    }

    pub fn build(self) -> Value {
        self.item
    }
}

/// Builder for catalog records
pub struct RecordBuilder {
    item: ItemBuilder,
    source: String,
    kind: ExtensionKind,
    installed: Option<LocalInstall>,
    needs_update: bool,
}

impl RecordBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            item: ItemBuilder::new(name),
            source: REPO_STREAM.to_string(),
            kind: ExtensionKind::RepositorySourced,
            installed: None,
            needs_update: false,
        }
    }

    /// Store record listed by the store stream
    pub fn store(name: &str) -> Self {
        Self::new(name)
            .from_source(STORE_STREAM)
            .with_kind(ExtensionKind::StoreSourced)
            .map_item(|item| item.with_link(&format!("https://store.test/buy/{}", name)))
    }

    pub fn from_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn with_kind(mut self, kind: ExtensionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn map_item(mut self, f: impl FnOnce(ItemBuilder) -> ItemBuilder) -> Self {
        self.item = f(self.item);
        self
    }

    pub fn with_developer(self, developer: &str) -> Self {
        self.map_item(|item| item.with_developer(developer))
    }

    pub fn with_tags(self, tags: &[&str]) -> Self {
        self.map_item(|item| item.with_tags(tags))
    }

    pub fn with_remote_version(self, version: &str) -> Self {
        self.map_item(|item| item.with_version(version))
    }

    pub fn installed(mut self, version: &str) -> Self {
        self.installed = Some(LocalInstall {
            version: Some(ExtensionVersion::parse(version).unwrap()),
            store_key: None,
        });
        self
    }

    pub fn installed_with_key(mut self, version: &str, key: &str) -> Self {
        self.installed = Some(LocalInstall {
            version: Some(ExtensionVersion::parse(version).unwrap()),
            store_key: Some(key.to_string()),
        });
        self
    }

    pub fn needing_update(mut self) -> Self {
        self.needs_update = true;
        self
    }

    pub fn build(self) -> ExtensionRecord {
        let metadata = ExtensionMetadata::from_value(&self.item.build()).unwrap();
        let mut record =
            ExtensionRecord::from_metadata(metadata, self.source, self.kind, self.installed)
                .unwrap();
        record.needs_update = self.needs_update;
        record
    }
}
