//! Extension catalog engine for Mechanic
//!
//! This crate handles:
//! - Fetching extension streams and single-extension descriptors
//! - Building a deduplicated catalog with developer/tag/source facets
//! - Update checks against published versions
//! - Catalog search
//! - Batch install/update/uninstall/purchase with per-item failure isolation
//! - A manifest-backed extension host

pub mod catalog;
pub mod errors;
pub mod fetcher;
pub mod filter;
pub mod host;
pub mod manifest;
pub mod orchestrator;
pub mod update;

pub use catalog::{Catalog, CatalogBuilder, ProgressCallback};
pub use errors::{FailedAction, FetchError, LoadError, UpdateCheckError};
pub use fetcher::{RawItem, SourceFetcher};
pub use filter::{CatalogFilter, SearchQuery, StatusFilter};
pub use host::ExtensionHost;
pub use manifest::ManifestHost;
pub use orchestrator::{ActionOrchestrator, ActionSummary, BatchResult, Confirm};
pub use update::{should_prompt_recheck, UpdateChecker, UpdateReport};
