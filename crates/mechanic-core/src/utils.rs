//! Shared utility functions for Mechanic crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// sandboxed hosts and tests can redirect it.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// Get the Mechanic state directory (settings, manifest)
///
/// `MECHANIC_HOME` wins over `~/.mechanic`.
pub fn get_mechanic_home() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("MECHANIC_HOME") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    Ok(get_home_dir()?.join(".mechanic"))
}
