//! Error types for mechanic-core

use thiserror::Error;

/// Result type alias using mechanic-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Mechanic
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Version string that cannot be ordered
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// Missing required field in extension metadata
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Extension name that cannot be used as a package file name
    #[error("Invalid extension name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Stream already present in the settings
    #[error("Duplicated stream: {url}")]
    DuplicateStream { url: String },

    /// Single extension descriptor already registered
    #[error("Single extension already active: {name}. Remove it to re-activate the extension item")]
    DuplicateSingleExtension { name: String },

    /// Stream that cannot be read as an extension stream
    #[error("Not a valid extension stream '{url}': {reason}")]
    InvalidStream { url: String, reason: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate stream error
    pub fn duplicate_stream(url: impl Into<String>) -> Self {
        Self::DuplicateStream { url: url.into() }
    }

    /// Create a duplicate single extension error
    pub fn duplicate_single_extension(name: impl Into<String>) -> Self {
        Self::DuplicateSingleExtension { name: name.into() }
    }

    /// Create an invalid stream error
    pub fn invalid_stream(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStream {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
