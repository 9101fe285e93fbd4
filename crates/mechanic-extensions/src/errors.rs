//! Failure taxonomy for best-effort catalog work
//!
//! None of these abort a batch. Each one describes a single unit of work
//! (a source, an item, an update check, an action) that was skipped.

use mechanic_core::types::{LifecycleAction, RecordKey};
use thiserror::Error;

/// A source could not be read or parsed; it contributes zero items
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to fetch {origin}: {cause}")]
pub struct FetchError {
    /// Stream URL or descriptor path
    pub origin: String,
    pub cause: String,
}

impl FetchError {
    pub fn new(origin: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            origin: origin.into(),
            cause: cause.to_string(),
        }
    }
}

/// Update lookup failed for one record; its previous state is kept
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Update check failed for {name}: {cause}")]
pub struct UpdateCheckError {
    pub name: String,
    pub cause: String,
}

impl UpdateCheckError {
    pub fn new(name: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            name: name.into(),
            cause: cause.to_string(),
        }
    }
}

/// Problems collected while building a catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Whole source skipped
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// One malformed item skipped
    #[error("Skipped item '{item}' from {origin}: {cause}")]
    Item {
        origin: String,
        item: String,
        cause: String,
    },

    /// Update check requested by the load failed for one record
    #[error(transparent)]
    UpdateCheck(#[from] UpdateCheckError),
}

impl LoadError {
    pub fn item(origin: impl Into<String>, item: impl Into<String>, cause: impl ToString) -> Self {
        Self::Item {
            origin: origin.into(),
            item: item.into(),
            cause: cause.to_string(),
        }
    }

    /// Source the error belongs to, when there is one
    pub fn origin(&self) -> Option<&str> {
        match self {
            LoadError::Fetch(e) => Some(&e.origin),
            LoadError::Item { origin, .. } => Some(origin),
            LoadError::UpdateCheck(_) => None,
        }
    }
}

/// One item of a batch action that did not go through
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to {action} {record}: {error}")]
pub struct FailedAction {
    pub record: RecordKey,
    pub action: LifecycleAction,
    pub error: String,
}

impl FailedAction {
    pub fn new(record: RecordKey, action: LifecycleAction, error: impl ToString) -> Self {
        Self {
            record,
            action,
            error: error.to_string(),
        }
    }
}
