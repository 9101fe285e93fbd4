//! Settings providers
//!
//! `FileSettingsProvider` loads settings with the following precedence
//! (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Settings file (~/.mechanic/settings.yaml)
//! 3. Environment variables (MECHANIC_* prefix)
//!
//! Saving writes only the first two layers; a field overridden from the
//! environment keeps its stored value in the file.

use crate::config::Settings;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use std::sync::Mutex;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "settings-defaults.yaml";
const SETTINGS_FILE: &str = "settings.yaml";

const ENV_STREAMS: &str = "MECHANIC_STREAMS";
const ENV_CHECK_FOR_UPDATES: &str = "MECHANIC_CHECK_FOR_UPDATES";
const ENV_HTTP_TIMEOUT_SECS: &str = "MECHANIC_HTTP_TIMEOUT_SECS";
const ENV_OVERRIDES: [&str; 3] = [ENV_STREAMS, ENV_CHECK_FOR_UPDATES, ENV_HTTP_TIMEOUT_SECS];

/// Key/value settings store consumed by the engine and the CLI
pub trait SettingsProvider: Send + Sync {
    /// Load the effective settings
    fn load(&self) -> Result<Settings>;

    /// Persist settings
    fn save(&self, settings: &Settings) -> Result<()>;

    /// Restore the defaults, dropping stored values
    fn reset(&self) -> Result<Settings> {
        let defaults = Settings::defaults()?;
        self.save(&defaults)?;
        Ok(defaults)
    }
}

impl Settings {
    /// Settings compiled into the binary
    pub fn defaults() -> Result<Self> {
        let value = embedded_defaults()?;
        Ok(serde_yaml_ng::from_value(value)?)
    }
}

fn embedded_defaults() -> Result<Value> {
    let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
        Error::config_not_found(format!("Embedded config not found: {}", DEFAULTS_FILE))
    })?;

    let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
        Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", DEFAULTS_FILE))
    })?;

    serde_yaml_ng::from_str(content).map_err(|e| {
        Error::invalid_config(format!(
            "Failed to parse embedded config {}: {}",
            DEFAULTS_FILE, e
        ))
    })
}

/// Overlay mapping keys win; nested mappings merge recursively
fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Settings stored as YAML under the Mechanic home directory
pub struct FileSettingsProvider {
    /// Base directory for the settings file
    config_dir: Utf8PathBuf,
}

impl FileSettingsProvider {
    /// Create a provider rooted at the standard directory (~/.mechanic)
    pub fn new() -> Result<Self> {
        let home = crate::utils::get_mechanic_home()
            .map_err(|e| Error::invalid_config(e.to_string()))?;
        let config_dir = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Non UTF-8 config dir: {:?}", p)))?;
        Ok(Self { config_dir })
    }

    /// Create a provider with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Path of the settings file
    pub fn settings_path(&self) -> Utf8PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    fn load_yaml_file(&self, path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Embedded defaults merged with the settings file, without overrides
    fn load_stored(&self) -> Result<Settings> {
        let mut value = embedded_defaults()?;

        let path = self.settings_path();
        if path.exists() {
            debug!("Loading settings from {}", path);
            let stored = self.load_yaml_file(&path)?;
            if !stored.is_null() {
                value = merge_values(value, stored);
            }
        }

        serde_yaml_ng::from_value(value)
            .map_err(|e| Error::invalid_config(format!("Invalid settings: {}", e)))
    }

    /// Settings to write back: fields currently overridden from the
    /// environment keep their stored values
    fn without_env_overrides(&self, settings: &Settings) -> Result<Settings> {
        let overridden: Vec<&str> = ENV_OVERRIDES
            .iter()
            .copied()
            .filter(|name| env::var_os(name).is_some())
            .collect();
        if overridden.is_empty() {
            return Ok(settings.clone());
        }

        debug!("Not persisting environment overrides: {}", overridden.join(", "));
        let stored = self.load_stored()?;
        let mut settings = settings.clone();
        for name in overridden {
            match name {
                ENV_STREAMS => settings.streams = stored.streams.clone(),
                ENV_CHECK_FOR_UPDATES => settings.check_for_updates = stored.check_for_updates,
                ENV_HTTP_TIMEOUT_SECS => settings.http_timeout_secs = stored.http_timeout_secs,
                _ => {}
            }
        }
        Ok(settings)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, mut settings: Settings) -> Result<Settings> {
        if let Ok(val) = env::var(ENV_STREAMS) {
            settings.streams = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(val) = env::var(ENV_CHECK_FOR_UPDATES) {
            settings.check_for_updates = val.parse().map_err(|_| {
                Error::invalid_config("MECHANIC_CHECK_FOR_UPDATES must be true or false")
            })?;
        }

        if let Ok(val) = env::var(ENV_HTTP_TIMEOUT_SECS) {
            settings.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("MECHANIC_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        Ok(settings)
    }
}

impl SettingsProvider for FileSettingsProvider {
    fn load(&self) -> Result<Settings> {
        let settings = self.load_stored()?;
        self.apply_env_overrides(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        let settings = self.without_env_overrides(settings)?;
        let content = serde_yaml_ng::to_string(&settings)?;
        fs::write(self.settings_path(), content)?;
        debug!("Saved settings to {}", self.settings_path());
        Ok(())
    }
}

/// In-memory settings for embedding hosts and tests
pub struct MemorySettingsProvider {
    settings: Mutex<Settings>,
}

impl MemorySettingsProvider {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    /// Start from the embedded defaults
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Settings::defaults()?))
    }
}

impl SettingsProvider for MemorySettingsProvider {
    fn load(&self) -> Result<Settings> {
        self.settings
            .lock()
            .map(|s| s.clone())
            .map_err(|_| Error::invalid_config("settings lock poisoned"))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|_| Error::invalid_config("settings lock poisoned"))?;
        *guard = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_temp_provider() -> (FileSettingsProvider, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir =
            Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).expect("Invalid UTF-8 path");
        (FileSettingsProvider::with_dir(config_dir), temp_dir)
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        let (provider, _temp) = create_temp_provider();
        let settings = provider.load().unwrap();

        assert_eq!(settings.streams.len(), 2);
        assert_eq!(
            settings.store_stream,
            "http://extensionstore.robofont.com/data.json"
        );
        assert!(settings.is_store_stream(&settings.streams[0]));
        assert!(settings.check_for_updates);
        assert!(settings.single_extensions.is_empty());
        assert!(settings.last_update_check.is_none());
    }

    #[test]
    #[serial]
    fn test_partial_file_overrides_defaults() {
        let (provider, _temp) = create_temp_provider();
        fs::write(
            provider.settings_path(),
            "check-for-updates: false\nstreams:\n  - https://custom.example/registry.json\n",
        )
        .unwrap();

        let settings = provider.load().unwrap();
        assert!(!settings.check_for_updates);
        assert_eq!(settings.streams, vec!["https://custom.example/registry.json"]);
        assert_eq!(settings.http_timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn test_save_and_reload() {
        let (provider, _temp) = create_temp_provider();
        let mut settings = provider.load().unwrap();
        settings.add_stream("https://custom.example/registry.json").unwrap();
        settings.record_update_check(chrono::Utc::now());
        provider.save(&settings).unwrap();

        let reloaded = provider.load().unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    #[serial]
    fn test_reset_restores_defaults() {
        let (provider, _temp) = create_temp_provider();
        let mut settings = provider.load().unwrap();
        settings.streams.clear();
        provider.save(&settings).unwrap();

        let reset = provider.reset().unwrap();
        assert_eq!(reset.streams.len(), 2);
        assert_eq!(provider.load().unwrap().streams.len(), 2);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let (provider, _temp) = create_temp_provider();

        env::set_var("MECHANIC_STREAMS", "https://a.example/x.json, https://b.example/y.json");
        env::set_var("MECHANIC_CHECK_FOR_UPDATES", "false");
        env::set_var("MECHANIC_HTTP_TIMEOUT_SECS", "5");

        let settings = provider.load().unwrap();
        assert_eq!(
            settings.streams,
            vec!["https://a.example/x.json", "https://b.example/y.json"]
        );
        assert!(!settings.check_for_updates);
        assert_eq!(settings.http_timeout_secs, 5);

        env::remove_var("MECHANIC_STREAMS");
        env::remove_var("MECHANIC_CHECK_FOR_UPDATES");
        env::remove_var("MECHANIC_HTTP_TIMEOUT_SECS");
    }

    #[test]
    #[serial]
    fn test_env_overrides_are_not_persisted() {
        let (provider, _temp) = create_temp_provider();
        env::set_var("MECHANIC_STREAMS", "https://env-only.example/x.json");
        env::set_var("MECHANIC_CHECK_FOR_UPDATES", "false");

        let mut settings = provider.load().unwrap();
        assert_eq!(settings.streams, vec!["https://env-only.example/x.json"]);
        let checked_at = chrono::Utc::now();
        settings.record_update_check(checked_at);
        provider.save(&settings).unwrap();

        env::remove_var("MECHANIC_STREAMS");
        env::remove_var("MECHANIC_CHECK_FOR_UPDATES");

        let reloaded = provider.load().unwrap();
        assert_eq!(reloaded.streams.len(), 2);
        assert!(!reloaded.streams.contains(&"https://env-only.example/x.json".to_string()));
        assert!(reloaded.check_for_updates);
        assert_eq!(reloaded.last_update_check, Some(checked_at));
    }

    #[test]
    #[serial]
    fn test_invalid_env_override() {
        let (provider, _temp) = create_temp_provider();
        env::set_var("MECHANIC_HTTP_TIMEOUT_SECS", "soon");
        assert!(provider.load().is_err());
        env::remove_var("MECHANIC_HTTP_TIMEOUT_SECS");
    }

    #[test]
    fn test_memory_provider() {
        let provider = MemorySettingsProvider::with_defaults().unwrap();
        let mut settings = provider.load().unwrap();
        settings.check_for_updates = false;
        provider.save(&settings).unwrap();
        assert!(!provider.load().unwrap().check_for_updates);
    }
}
