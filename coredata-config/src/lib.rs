// Configuration management for core data clients

pub mod config_service;
pub mod env;
pub mod error;
pub mod loader;

pub use config_service::{ConfigService, ConfigServiceBuilder};
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Main configuration manager.
///
/// Keys are dotted paths (`core.db.event.url`). A lookup matches a flat key
/// stored verbatim as well as the same path through nested tables, so file
/// tables and environment overrides can be mixed freely.
#[derive(Clone, Default)]
pub struct ConfigManager {
    config: Arc<RwLock<Map<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::default(),
            env_prefix: Some(prefix.into()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Map<String, Value>> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Map<String, Value>> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.load_vars(loader.load()?);
        Ok(())
    }

    /// Merge already collected environment-style values
    pub fn load_vars<I>(&self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = self.write();
        for (key, value) in vars {
            config.insert(key, Value::String(value));
        }
    }

    /// Export a `.env` file into the process environment, then load the
    /// prefixed variables as [`ConfigManager::load_env`] does.
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        export_dotenv(path)?;
        self.load_env()
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).load_file(path)?;
        deep_merge(&mut self.write(), data);
        Ok(())
    }

    /// Load configuration from a string
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        deep_merge(&mut self.write(), data);
        Ok(())
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.write().insert(key.to_string(), json_value);

        Ok(())
    }

    /// Get a configuration value.
    ///
    /// String values (as read from the environment) are re-parsed as JSON
    /// literals when they do not deserialize directly, so `"true"` reads as
    /// a boolean and `"5000"` as a number.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.read();

        let value =
            lookup(&config, key).ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone()).or_else(|e| match value {
            Value::String(s) => serde_json::from_str(s).map_err(|_| invalid(key, e)),
            _ => Err(invalid(key, e)),
        })
    }

    /// Get a configuration value, `None` when the key is absent
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get_opt(key)?.unwrap_or(default))
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        lookup(&self.read(), key).is_some()
    }

    /// Get all top-level configuration keys
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Merge configuration from another manager; its values win
    pub fn merge(&self, other: &ConfigManager) {
        let other_config = other.read().clone();
        deep_merge(&mut self.write(), other_config);
    }
}

/// Overlay `source` onto `target`. Tables present on both sides are merged
/// key by key; any other value from `source` replaces the old one.
fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = target.get_mut(&key) {
                    deep_merge(existing, incoming);
                } else {
                    target.insert(key, Value::Object(incoming));
                }
            }
            value => {
                target.insert(key, value);
            }
        }
    }
}

/// Export a `.env` file into the process environment. Without a path a
/// missing `.env` in the working directory is not an error.
pub(crate) fn export_dotenv(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|_| ())
            .map_err(|e| ConfigError::LoadError(e.to_string())),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    }
}

fn invalid(key: &str, e: serde_json::Error) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    }
}

/// Resolve a dotted key against a map, trying the longest flat match first
/// and then descending into nested tables at each dot.
fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }

    key.match_indices('.').find_map(|(i, _)| match map.get(&key[..i]) {
        Some(Value::Object(nested)) => lookup(nested, &key[i + 1..]),
        _ => None,
    })
}
