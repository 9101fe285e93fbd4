//! # mechanic-core
//!
//! Core library for Mechanic providing:
//! - Extension record and metadata types shared by the engine and the CLI
//! - Lenient and semver-based version ordering
//! - Settings loading (embedded defaults, settings file, environment overrides)
//! - Error types

pub mod config;
pub mod error;
pub mod types;
pub mod utils;
pub mod version;

pub use config::{FileSettingsProvider, MemorySettingsProvider, Settings, SettingsProvider};
pub use error::{Error, Result};
pub use utils::{get_home_dir, get_mechanic_home};
pub use version::{ExtensionVersion, LenientComparator, SemverComparator, VersionComparator};
