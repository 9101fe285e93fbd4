//! Host application seam
//!
//! The engine never unpacks or registers packages itself; it calls into an
//! `ExtensionHost` and interprets the outcome.

use anyhow::Result;
use async_trait::async_trait;
use mechanic_core::types::{ExtensionRecord, LocalInstall};
use mechanic_core::ExtensionVersion;
use tracing::info;

/// Operations the host application provides for extension packages
#[async_trait]
pub trait ExtensionHost: Send + Sync {
    /// Local installation state of an extension, if installed
    fn local_install(&self, name: &str) -> Option<LocalInstall>;

    /// Install the record's package, replacing any installed copy
    async fn install(&self, record: &ExtensionRecord) -> Result<()>;

    /// Remove the record's package
    async fn uninstall(&self, record: &ExtensionRecord) -> Result<()>;

    /// Called once before a round of update checks; hosts that cache remote
    /// sources drop what they fetched in the previous round
    fn begin_update_check(&self) {}

    /// Latest version published for the record
    ///
    /// `Ok(None)` when the record is still listed but its source publishes
    /// no version for it.
    async fn remote_version_of(&self, record: &ExtensionRecord) -> Result<Option<ExtensionVersion>>;

    /// Start the store purchase flow
    async fn open_purchase(&self, record: &ExtensionRecord) -> Result<()> {
        match &record.purchase_url {
            Some(url) => info!("Purchase {} at {}", record.name, url),
            None => info!("No purchase page published for {}", record.name),
        }
        Ok(())
    }
}
