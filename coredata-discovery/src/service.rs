//! Service instances, registry trait and instance selection

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use url::Url;

/// Service discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid instance URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Service instance information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInstance {
    /// Service ID (unique per instance)
    pub id: String,

    /// Service name
    pub name: String,

    /// Host/IP address
    pub address: String,

    /// Port number
    pub port: u16,

    /// URI scheme, `http` unless the registry says otherwise
    pub scheme: String,

    /// Service tags
    pub tags: Vec<String>,

    /// Metadata
    pub metadata: HashMap<String, String>,
}

impl ServiceInstance {
    /// Create new service instance
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            port,
            scheme: "http".to_string(),
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the URI scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Connection URI of this instance (`scheme://address:port`).
    ///
    /// Registries report IPv6 addresses without brackets; they are added here.
    pub fn uri(&self) -> Result<Url, DiscoveryError> {
        let host = match self.address.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
            _ => self.address.clone(),
        };
        Ok(Url::parse(&format!("{}://{}:{}", self.scheme, host, self.port))?)
    }
}

/// Read side of a service registry
#[async_trait]
pub trait ServiceDiscovery: Send + Sync {
    /// Discover healthy instances by service name.
    ///
    /// An unknown service yields an empty list; errors mean the registry
    /// itself could not be queried.
    async fn discover(&self, service_name: &str) -> Result<Vec<ServiceInstance>, DiscoveryError>;

    /// List all registered service names
    async fn list_services(&self) -> Result<Vec<String>, DiscoveryError>;
}

/// How to pick one instance when the registry returns several
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Always pick the first instance in registry order
    #[default]
    First,

    /// Round-robin selection
    RoundRobin,

    /// Random selection
    Random,
}

impl FromStr for SelectionStrategy {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "round-robin" | "roundrobin" | "round_robin" => Ok(Self::RoundRobin),
            "random" => Ok(Self::Random),
            other => Err(DiscoveryError::InvalidConfiguration(format!(
                "unknown selection strategy: {}",
                other
            ))),
        }
    }
}

/// Stateful selector applying a [`SelectionStrategy`]
#[derive(Debug, Default)]
pub struct InstanceSelector {
    strategy: SelectionStrategy,
    round_robin_index: AtomicUsize,
}

impl InstanceSelector {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            round_robin_index: AtomicUsize::new(0),
        }
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Pick an instance; `None` for an empty slice
    pub fn select<'a>(&self, instances: &'a [ServiceInstance]) -> Option<&'a ServiceInstance> {
        if instances.is_empty() {
            return None;
        }

        let index = match self.strategy {
            SelectionStrategy::First => 0,
            SelectionStrategy::RoundRobin => {
                self.round_robin_index.fetch_add(1, Ordering::Relaxed) % instances.len()
            }
            SelectionStrategy::Random => {
                use rand::Rng;
                rand::rng().random_range(0..instances.len())
            }
        };

        instances.get(index)
    }
}
