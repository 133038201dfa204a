// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Environment variable loader.
///
/// Variable names map onto dotted configuration keys: the prefix is
/// stripped, the rest lowercased, `__` becomes `.` and `_` becomes `-`.
/// `COREDATA_CORE__DB__EVENT__URL` therefore sets `core.db.event.url`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching variables of the process environment.
    ///
    /// A prefix is required; without one every variable (`PATH`, `HOME`,
    /// ...) would land in the configuration.
    pub fn load(&self) -> Result<HashMap<String, String>> {
        if self.prefix.is_none() {
            return Err(ConfigError::LoadError(
                "loading the process environment requires a variable prefix".to_string(),
            ));
        }
        Ok(self.load_from(env::vars()))
    }

    /// Load matching variables from an explicit set of pairs
    pub fn load_from<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(name, value)| self.config_key(&name).map(|key| (key, value)))
            .collect()
    }

    /// Config key for a variable name, `None` when the prefix does not match
    pub fn config_key(&self, var_name: &str) -> Option<String> {
        let rest = match &self.prefix {
            Some(prefix) => var_name.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
            None => var_name,
        };
        if rest.is_empty() {
            return None;
        }

        Some(
            rest.to_lowercase()
                .split("__")
                .map(|part| part.replace('_', "-"))
                .collect::<Vec<_>>()
                .join("."),
        )
    }

    /// Load a specific environment variable by config key
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.var_name(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Variable name for a config key, the inverse of [`EnvLoader::config_key`]
    pub fn var_name(&self, key: &str) -> String {
        let name = key.to_uppercase().replace('.', "__").replace('-', "_");
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, name),
            None => name,
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
