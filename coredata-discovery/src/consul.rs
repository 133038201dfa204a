//! Consul service discovery implementation

use crate::service::{DiscoveryError, ServiceDiscovery, ServiceInstance};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default limit for one registry query, connection included
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default limit for establishing the connection to the agent
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Consul service discovery client
pub struct ConsulDiscovery {
    base_url: Url,
    token: Option<String>,
    datacenter: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ConsulHealthEntry {
    #[serde(rename = "Node")]
    node: Option<ConsulNode>,
    #[serde(rename = "Service")]
    service: ConsulServiceDetail,
}

#[derive(Deserialize)]
struct ConsulNode {
    #[serde(rename = "Address")]
    address: String,
}

#[derive(Deserialize)]
struct ConsulServiceDetail {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Service")]
    service: String,
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "Port")]
    port: u16,
    #[serde(rename = "Tags", default)]
    tags: Option<Vec<String>>,
    #[serde(rename = "Meta", default)]
    meta: Option<HashMap<String, String>>,
}

impl ConsulHealthEntry {
    fn into_instance(self) -> ServiceInstance {
        let detail = self.service;
        // Consul leaves the service address empty when it equals the node's.
        let address = if detail.address.is_empty() {
            self.node.map(|n| n.address).unwrap_or_default()
        } else {
            detail.address
        };

        let metadata = detail.meta.unwrap_or_default();
        let mut instance = ServiceInstance::new(detail.id, detail.service, address, detail.port);
        if let Some(scheme) = metadata.get("scheme") {
            instance.scheme = scheme.clone();
        }
        instance.tags = detail.tags.unwrap_or_default();
        instance.metadata = metadata;
        instance
    }
}

impl ConsulDiscovery {
    /// Create new Consul discovery client
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use coredata_discovery::ConsulDiscovery;
    ///
    /// let consul = ConsulDiscovery::new("http://localhost:8500")?;
    /// ```
    pub fn new(base_url: impl Into<String>) -> Result<Self, DiscoveryError> {
        let base_url: String = base_url.into();
        let base_url = Url::parse(&base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DiscoveryError::InvalidConfiguration(format!(
                "Consul URL cannot be used as a base: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| DiscoveryError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            base_url,
            token: None,
            datacenter: None,
            timeout: DEFAULT_TIMEOUT,
            client,
        })
    }

    /// Limit each registry query, connection included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send this ACL token with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Query a specific datacenter
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.header("X-Consul-Token", token);
        }
        if let Some(dc) = &self.datacenter {
            request = request.query(&[("dc", dc)]);
        }
        request
    }
}

#[async_trait]
impl ServiceDiscovery for ConsulDiscovery {
    async fn discover(&self, service_name: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        let url = self.endpoint(&["v1", "health", "service", service_name]);

        let response = self
            .get(url)
            .query(&[("passing", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DiscoveryError::RegistryUnavailable(format!(
                "Consul returned {} for service {}",
                response.status(),
                service_name
            )));
        }

        let entries: Vec<ConsulHealthEntry> = response.json().await?;
        let instances: Vec<ServiceInstance> = entries
            .into_iter()
            .map(ConsulHealthEntry::into_instance)
            .collect();

        debug!(
            service = service_name,
            count = instances.len(),
            "Discovered instances from Consul"
        );
        Ok(instances)
    }

    async fn list_services(&self) -> Result<Vec<String>, DiscoveryError> {
        let url = self.endpoint(&["v1", "catalog", "services"]);

        let response = self.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DiscoveryError::RegistryUnavailable(
                "Failed to list services".to_string(),
            ));
        }

        let services: HashMap<String, Vec<String>> = response.json().await?;
        let mut names: Vec<String> = services.into_keys().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_consul_discovery_creation() {
        assert!(ConsulDiscovery::new("http://localhost:8500").is_ok());
        assert!(ConsulDiscovery::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_discover_healthy_instances() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health/service/edgex-core-data"))
            .and(query_param("passing", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "Node": {"Address": "10.0.0.5"},
                    "Service": {
                        "ID": "core-data-1",
                        "Service": "edgex-core-data",
                        "Address": "",
                        "Port": 48080,
                        "Tags": null,
                        "Meta": null
                    }
                },
                {
                    "Node": {"Address": "10.0.0.6"},
                    "Service": {
                        "ID": "core-data-2",
                        "Service": "edgex-core-data",
                        "Address": "core-data.internal",
                        "Port": 48443,
                        "Tags": ["secure"],
                        "Meta": {"scheme": "https"}
                    }
                }
            ])))
            .mount(&server)
            .await;

        let consul = ConsulDiscovery::new(server.uri()).unwrap();
        let instances = consul.discover("edgex-core-data").await.unwrap();

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].address, "10.0.0.5");
        assert_eq!(instances[0].uri().unwrap().as_str(), "http://10.0.0.5:48080/");
        assert_eq!(instances[1].tags, vec!["secure".to_string()]);
        assert_eq!(
            instances[1].uri().unwrap().as_str(),
            "https://core-data.internal:48443/"
        );
    }

    #[tokio::test]
    async fn test_discover_sends_token_and_datacenter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health/service/edgex-core-data"))
            .and(header("X-Consul-Token", "secret"))
            .and(query_param("dc", "edge"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let consul = ConsulDiscovery::new(server.uri())
            .unwrap()
            .with_token("secret")
            .with_datacenter("edge");

        assert!(consul.discover("edgex-core-data").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_registry_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let consul = ConsulDiscovery::new(server.uri()).unwrap();
        let result = consul.discover("edgex-core-data").await;
        assert!(matches!(result, Err(DiscoveryError::RegistryUnavailable(_))));
    }

    #[tokio::test]
    async fn test_list_services() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/catalog/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "edgex-core-data": [],
                "consul": []
            })))
            .mount(&server)
            .await;

        let consul = ConsulDiscovery::new(server.uri()).unwrap();
        assert_eq!(
            consul.list_services().await.unwrap(),
            vec!["consul".to_string(), "edgex-core-data".to_string()]
        );
    }

    #[tokio::test]
    async fn test_service_name_is_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/consul/v1/health/service/edge%2Fcore%20data%3F"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let consul = ConsulDiscovery::new(format!("{}/consul/", server.uri())).unwrap();
        assert!(consul.discover("edge/core data?").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_registry_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let consul = ConsulDiscovery::new(server.uri())
            .unwrap()
            .with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let result = consul.discover("edgex-core-data").await;
        assert!(matches!(result, Err(DiscoveryError::HttpError(ref e)) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
