//! Mock implementations for testing
//!
//! `MockHost` stands in for the host application: it reports install state
//! from an in-memory table, records every invocation and fails on demand.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mechanic_core::types::{ExtensionRecord, LocalInstall};
use mechanic_core::ExtensionVersion;
use mechanic_extensions::ExtensionHost;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Record of a host invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockHostInvocation {
    pub operation: &'static str,
    pub name: String,
}

/// Mock extension host for testing
#[derive(Default)]
pub struct MockHost {
    /// Locally installed extensions
    installed: Arc<Mutex<HashMap<String, LocalInstall>>>,
    /// Published versions returned by `remote_version_of`
    remote_versions: Arc<Mutex<HashMap<String, String>>>,
    /// Names still listed but without a published version
    unpublished: Arc<Mutex<HashSet<String>>>,
    /// Names whose install/uninstall/lookup fails
    failing: Arc<Mutex<HashSet<String>>>,
    /// Rounds of update checks started
    rounds: Arc<AtomicUsize>,
    /// Recorded invocations
    invocations: Arc<Mutex<Vec<MockHostInvocation>>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installed(self, name: &str, version: &str) -> Self {
        self.installed.lock().unwrap().insert(
            name.to_string(),
            LocalInstall {
                version: Some(ExtensionVersion::parse(version).unwrap()),
                store_key: None,
            },
        );
        self
    }

    pub fn with_store_install(self, name: &str, version: &str, key: &str) -> Self {
        self.installed.lock().unwrap().insert(
            name.to_string(),
            LocalInstall {
                version: Some(ExtensionVersion::parse(version).unwrap()),
                store_key: Some(key.to_string()),
            },
        );
        self
    }

    pub fn with_remote_version(self, name: &str, version: &str) -> Self {
        self.remote_versions
            .lock()
            .unwrap()
            .insert(name.to_string(), version.to_string());
        self
    }

    pub fn with_unpublished_version(self, name: &str) -> Self {
        self.unpublished.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn failing_for(self, name: &str) -> Self {
        self.failing.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<MockHostInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Invocations of one operation, by extension name
    pub fn calls(&self, operation: &str) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|i| i.operation == operation)
            .map(|i| i.name)
            .collect()
    }

    pub fn update_rounds(&self) -> usize {
        self.rounds.load(Ordering::SeqCst)
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.lock().unwrap().contains_key(name)
    }

    fn record(&self, operation: &'static str, name: &str) -> Result<()> {
        self.invocations.lock().unwrap().push(MockHostInvocation {
            operation,
            name: name.to_string(),
        });
        if self.failing.lock().unwrap().contains(name) {
            return Err(anyhow!("{} failed for {}", operation, name));
        }
        Ok(())
    }
}

#[async_trait]
impl ExtensionHost for MockHost {
    fn local_install(&self, name: &str) -> Option<LocalInstall> {
        self.installed.lock().unwrap().get(name).cloned()
    }

    async fn install(&self, record: &ExtensionRecord) -> Result<()> {
        self.record("install", &record.name)?;
        self.installed.lock().unwrap().insert(
            record.name.clone(),
            LocalInstall {
                version: record.remote_version.clone(),
                store_key: None,
            },
        );
        Ok(())
    }

    async fn uninstall(&self, record: &ExtensionRecord) -> Result<()> {
        self.record("uninstall", &record.name)?;
        self.installed.lock().unwrap().remove(&record.name);
        Ok(())
    }

    fn begin_update_check(&self) {
        self.rounds.fetch_add(1, Ordering::SeqCst);
    }

    async fn remote_version_of(&self, record: &ExtensionRecord) -> Result<Option<ExtensionVersion>> {
        self.record("remote_version_of", &record.name)?;
        if self.unpublished.lock().unwrap().contains(&record.name) {
            return Ok(None);
        }
        let versions = self.remote_versions.lock().unwrap();
        let version = versions
            .get(&record.name)
            .ok_or_else(|| anyhow!("{} is not listed", record.name))?;
        Ok(Some(ExtensionVersion::parse(version)?))
    }

    async fn open_purchase(&self, record: &ExtensionRecord) -> Result<()> {
        self.record("open_purchase", &record.name)
    }
}

/// Confirmation stub counting how often it was asked
pub struct MockConfirm {
    answer: bool,
    asked: AtomicUsize,
    messages: Mutex<Vec<String>>,
}

impl MockConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl mechanic_extensions::Confirm for MockConfirm {
    fn confirm(&self, _title: &str, message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(message.to_string());
        self.answer
    }
}
