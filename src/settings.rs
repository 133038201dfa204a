//! Client settings read from configuration.

use crate::endpoint::ResolverPolicy;
use crate::Result;
use coredata_config::{ConfigError, ConfigService};
use coredata_discovery::{ConsulDiscovery, DiscoveryResolver, SelectionStrategy};
use coredata_http::{HttpClient, HttpClientConfig};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Application id the core data service registers under.
pub const DEFAULT_APPLICATION_ID: &str = "edgex-core-data";

/// The core data resources a client can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Event,
    Reading,
    ValueDescriptor,
    Ping,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Event,
        Entity::Reading,
        Entity::ValueDescriptor,
        Entity::Ping,
    ];

    /// Configuration key holding this resource's endpoint URL.
    pub fn config_key(self) -> &'static str {
        match self {
            Entity::Event => "core.db.event.url",
            Entity::Reading => "core.db.reading.url",
            Entity::ValueDescriptor => "core.db.valuedescriptor.url",
            Entity::Ping => "core.db.ping.url",
        }
    }

    /// Endpoint of a core data service on localhost.
    pub fn default_url(self) -> &'static str {
        match self {
            Entity::Event => "http://localhost:48080/api/v1/event",
            Entity::Reading => "http://localhost:48080/api/v1/reading",
            Entity::ValueDescriptor => "http://localhost:48080/api/v1/valuedescriptor",
            Entity::Ping => "http://localhost:48080/api/v1/ping",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Event => "event",
            Entity::Reading => "reading",
            Entity::ValueDescriptor => "valuedescriptor",
            Entity::Ping => "ping",
        };
        f.write_str(name)
    }
}

/// Where to find the service registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrySettings {
    /// Consul agent URL, e.g. `http://localhost:8500`.
    pub url: String,
    pub token: Option<String>,
    pub datacenter: Option<String>,
    pub strategy: SelectionStrategy,
    /// Limit for one registry query; a slow registry counts as unavailable.
    pub timeout: Duration,
}

/// Static endpoint URLs, one per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointUrls {
    pub event: String,
    pub reading: String,
    pub value_descriptor: String,
    pub ping: String,
}

impl Default for EndpointUrls {
    fn default() -> Self {
        Self {
            event: Entity::Event.default_url().to_string(),
            reading: Entity::Reading.default_url().to_string(),
            value_descriptor: Entity::ValueDescriptor.default_url().to_string(),
            ping: Entity::Ping.default_url().to_string(),
        }
    }
}

/// Everything the core data clients read from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Resolve the root URL once at construction and never refresh it.
    pub cache_discovery_result: bool,
    /// Keep querying the registry while no root URL has been found.
    pub retry_unresolved_discovery: bool,
    /// Name the core data service registers under.
    pub application_id: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// `None` disables discovery; clients then use the static URLs only.
    pub registry: Option<RegistrySettings>,
    pub endpoints: EndpointUrls,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            cache_discovery_result: false,
            retry_unresolved_discovery: false,
            application_id: DEFAULT_APPLICATION_ID.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            registry: None,
            endpoints: EndpointUrls::default(),
        }
    }
}

impl ClientSettings {
    /// Read settings, falling back to defaults for absent keys.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let defaults = Self::default();
        let timeout = millis(config, "client.timeout-ms", defaults.timeout)?;

        let registry = match config.get_opt::<String>("discovery.url")? {
            Some(url) if !url.is_empty() => {
                let strategy = match config.get_opt::<String>("discovery.strategy")? {
                    Some(s) => s.parse().map_err(|e: coredata_discovery::DiscoveryError| {
                        ConfigError::InvalidValue {
                            key: "discovery.strategy".to_string(),
                            message: e.to_string(),
                        }
                    })?,
                    None => SelectionStrategy::default(),
                };
                Some(RegistrySettings {
                    url,
                    token: config.get_opt("discovery.token")?,
                    datacenter: config.get_opt("discovery.datacenter")?,
                    strategy,
                    timeout: millis(config, "discovery.timeout-ms", timeout)?,
                })
            }
            _ => None,
        };

        let endpoint = |entity: Entity| -> Result<String> {
            Ok(config.get_or(entity.config_key(), entity.default_url().to_string())?)
        };

        Ok(Self {
            cache_discovery_result: config.get_or(
                "client.is-cache-discovery-result",
                defaults.cache_discovery_result,
            )?,
            retry_unresolved_discovery: config.get_or(
                "client.retry-unresolved-discovery",
                defaults.retry_unresolved_discovery,
            )?,
            application_id: config.get_or("client.application-id", defaults.application_id)?,
            timeout,
            connect_timeout: millis(config, "client.connect-timeout-ms", defaults.connect_timeout)?,
            registry,
            endpoints: EndpointUrls {
                event: endpoint(Entity::Event)?,
                reading: endpoint(Entity::Reading)?,
                value_descriptor: endpoint(Entity::ValueDescriptor)?,
                ping: endpoint(Entity::Ping)?,
            },
        })
    }

    /// Static endpoint URL configured for `entity`.
    pub fn endpoint_url(&self, entity: Entity) -> &str {
        match entity {
            Entity::Event => &self.endpoints.event,
            Entity::Reading => &self.endpoints.reading,
            Entity::ValueDescriptor => &self.endpoints.value_descriptor,
            Entity::Ping => &self.endpoints.ping,
        }
    }

    pub fn resolver_policy(&self) -> ResolverPolicy {
        ResolverPolicy {
            cache_discovery_result: self.cache_discovery_result,
            retry_unresolved: self.retry_unresolved_discovery,
        }
    }

    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
    }

    /// Build the shared HTTP client.
    pub fn http_client(&self) -> Result<HttpClient> {
        Ok(HttpClient::new(self.http_config())?)
    }

    /// Build the registry lookup; disabled when no registry is configured.
    pub fn discovery_resolver(&self) -> Result<DiscoveryResolver> {
        let Some(registry) = &self.registry else {
            info!("No discovery registry configured, using static endpoints");
            return Ok(DiscoveryResolver::disabled());
        };

        let mut consul = ConsulDiscovery::new(&registry.url)
            .map_err(|e| ConfigError::InvalidValue {
                key: "discovery.url".to_string(),
                message: e.to_string(),
            })?
            .with_timeout(registry.timeout);
        if let Some(token) = &registry.token {
            consul = consul.with_token(token);
        }
        if let Some(dc) = &registry.datacenter {
            consul = consul.with_datacenter(dc);
        }

        info!(
            registry = %registry.url,
            strategy = ?registry.strategy,
            timeout_ms = registry.timeout.as_millis() as u64,
            "Using Consul discovery"
        );
        Ok(DiscoveryResolver::new(Arc::new(consul), registry.strategy))
    }
}

fn millis(config: &ConfigService, key: &str, default: Duration) -> Result<Duration> {
    Ok(config
        .get_opt::<u64>(key)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use coredata_config::{ConfigManager, FileFormat};

    fn service(toml: &str) -> ConfigService {
        let manager = ConfigManager::new();
        manager.load_str(toml, FileFormat::Toml).unwrap();
        ConfigService::from_manager(manager)
    }

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::from_config(&ConfigService::new()).unwrap();
        assert_eq!(settings, ClientSettings::default());
        assert!(!settings.cache_discovery_result);
        assert_eq!(settings.application_id, "edgex-core-data");
        assert!(settings.registry.is_none());
        assert_eq!(
            settings.endpoint_url(Entity::ValueDescriptor),
            "http://localhost:48080/api/v1/valuedescriptor"
        );
    }

    #[test]
    fn test_from_toml() {
        let settings = ClientSettings::from_config(&service(
            r#"
            [client]
            is-cache-discovery-result = true
            application-id = "core-data"
            timeout-ms = 2500

            [discovery]
            url = "http://consul:8500"
            token = "acl"
            strategy = "round-robin"

            [core.db.event]
            url = "http://edge:48080/api/v1/event"
            "#,
        ))
        .unwrap();

        assert!(settings.cache_discovery_result);
        assert!(!settings.retry_unresolved_discovery);
        assert_eq!(settings.application_id, "core-data");
        assert_eq!(settings.timeout, Duration::from_millis(2500));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert_eq!(settings.endpoint_url(Entity::Event), "http://edge:48080/api/v1/event");
        assert_eq!(settings.endpoint_url(Entity::Ping), Entity::Ping.default_url());

        let registry = settings.registry.as_ref().unwrap();
        assert_eq!(registry.url, "http://consul:8500");
        assert_eq!(registry.token.as_deref(), Some("acl"));
        assert_eq!(registry.datacenter, None);
        assert_eq!(registry.strategy, SelectionStrategy::RoundRobin);
        assert_eq!(registry.timeout, Duration::from_millis(2500));

        let policy = settings.resolver_policy();
        assert!(policy.cache_discovery_result);
        assert!(!policy.retry_unresolved);
        assert!(settings.discovery_resolver().unwrap().is_enabled());
    }

    #[test]
    fn test_from_environment_style_values() {
        let manager = ConfigManager::new();
        manager.load_vars(vec![
            ("client.is-cache-discovery-result".to_string(), "true".to_string()),
            ("client.retry-unresolved-discovery".to_string(), "true".to_string()),
            ("core.db.ping.url".to_string(), "http://edge:48080/api/v1/ping".to_string()),
        ]);

        let settings = ClientSettings::from_config(&ConfigService::from_manager(manager)).unwrap();
        assert!(settings.cache_discovery_result);
        assert!(settings.retry_unresolved_discovery);
        assert_eq!(settings.endpoints.ping, "http://edge:48080/api/v1/ping");
    }

    #[test]
    fn test_invalid_values() {
        let bad_flag = service("[client]\nis-cache-discovery-result = \"maybe\"\n");
        assert!(matches!(
            ClientSettings::from_config(&bad_flag),
            Err(ClientError::Config(ConfigError::InvalidValue { .. }))
        ));

        let bad_strategy = service("[discovery]\nurl = \"http://consul:8500\"\nstrategy = \"sticky\"\n");
        assert!(matches!(
            ClientSettings::from_config(&bad_strategy),
            Err(ClientError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_registry_timeout_override() {
        let settings = ClientSettings::from_config(&service(
            "[discovery]\nurl = \"http://consul:8500\"\ntimeout-ms = 750\n",
        ))
        .unwrap();

        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(
            settings.registry.as_ref().unwrap().timeout,
            Duration::from_millis(750)
        );
    }

    #[test]
    fn test_disabled_discovery() {
        let settings = ClientSettings::default();
        assert!(!settings.discovery_resolver().unwrap().is_enabled());
        assert!(settings.http_client().is_ok());
    }

    #[test]
    fn test_bad_registry_url() {
        let settings = ClientSettings {
            registry: Some(RegistrySettings {
                url: "not a url".to_string(),
                token: None,
                datacenter: None,
                strategy: SelectionStrategy::First,
                timeout: Duration::from_secs(1),
            }),
            ..ClientSettings::default()
        };
        assert!(matches!(
            settings.discovery_resolver(),
            Err(ClientError::Config(_))
        ));
    }
}
