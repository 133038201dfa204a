// Configuration file loaders

use crate::{ConfigError, EnvLoader, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of a path from its extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError(format!("No file extension: {}", path.display())))?;

        Self::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))
    }
}

/// Configuration file loader. Every format parses into a JSON object.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FileFormat::from_path(path)?))
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Map<String, Value>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), format = ?self.format, "Loading configuration file");
        self.parse(&content)
    }

    /// Parse configuration from string
    pub fn parse(&self, content: &str) -> Result<Map<String, Value>> {
        let value = match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?,
            FileFormat::Toml => self.parse_toml(content)?,
            FileFormat::Env => return Ok(self.parse_env(content)),
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(ConfigError::ParseError(format!(
                "expected a table at the top level, found {}",
                other
            ))),
        }
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let toml_value: toml::Table = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        serde_json::to_value(toml_value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))
    }

    // `.env` files use the same naming as environment variables
    fn parse_env(&self, content: &str) -> Map<String, Value> {
        let names = EnvLoader::new(None);
        let mut map = Map::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((name, value)) = line.split_once('=')
                && let Some(key) = names.config_key(name.trim())
            {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                map.insert(key, Value::String(value.to_string()));
            }
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let json = r#"{"client": {"is-cache-discovery-result": true}}"#;

        let result = loader.parse(json).unwrap();
        assert_eq!(result["client"]["is-cache-discovery-result"], Value::Bool(true));
    }

    #[test]
    fn test_parse_json_rejects_scalars() {
        let loader = ConfigLoader::new(FileFormat::Json);
        assert!(loader.parse("42").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            [core.db.event]
            url = "http://localhost:48080/api/v1/event"

            [client]
            timeout-ms = 5000
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(
            result["core"]["db"]["event"]["url"],
            Value::String("http://localhost:48080/api/v1/event".to_string())
        );
        assert_eq!(result["client"]["timeout-ms"], serde_json::json!(5000));
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let env = r#"
            CORE__DB__PING__URL=http://localhost:48080/api/v1/ping
            # Comment
            DISCOVERY__URL="http://localhost:8500"
        "#;

        let result = loader.parse(env).unwrap();
        assert_eq!(
            result["core.db.ping.url"],
            Value::String("http://localhost:48080/api/v1/ping".to_string())
        );
        assert_eq!(
            result["discovery.url"],
            Value::String("http://localhost:8500".to_string())
        );
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Env));
        assert_eq!(FileFormat::from_extension("unknown"), None);
        assert_eq!(FileFormat::from_path("client.toml").unwrap(), FileFormat::Toml);
        assert!(FileFormat::from_path("client").is_err());
    }
}
