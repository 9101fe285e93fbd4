//! Settings loading and management

mod provider;
mod settings;

pub use provider::{FileSettingsProvider, MemorySettingsProvider, SettingsProvider};
pub use settings::{Settings, SingleExtensionEntry, SourceDescriptor};
