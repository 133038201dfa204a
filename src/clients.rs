//! One-stop construction of all core data clients.

use crate::event::EventClient;
use crate::ping::PingClient;
use crate::reading::ReadingClient;
use crate::settings::ClientSettings;
use crate::value_descriptor::ValueDescriptorClient;
use crate::Result;
use coredata_config::ConfigService;
use coredata_discovery::DiscoveryResolver;
use coredata_http::HttpClient;
use tracing::info;

/// The four core data clients, sharing one connection pool and one
/// registry lookup. Each keeps its own endpoint cache.
#[derive(Debug)]
pub struct CoreDataClients {
    event: EventClient,
    reading: ReadingClient,
    value_descriptor: ValueDescriptorClient,
    ping: PingClient,
}

impl CoreDataClients {
    /// Read [`ClientSettings`] from `config` and connect.
    pub async fn from_config(config: &ConfigService) -> Result<Self> {
        let settings = ClientSettings::from_config(config)?;
        Self::connect(&settings).await
    }

    /// Build the HTTP client and registry lookup described by `settings`.
    pub async fn connect(settings: &ClientSettings) -> Result<Self> {
        let http = settings.http_client()?;
        let discovery = settings.discovery_resolver()?;
        Self::with_parts(settings, discovery, http).await
    }

    /// Construct the clients over an existing registry lookup and HTTP client.
    pub async fn with_parts(
        settings: &ClientSettings,
        discovery: DiscoveryResolver,
        http: HttpClient,
    ) -> Result<Self> {
        let clients = Self {
            event: EventClient::new(settings, discovery.clone(), http.clone()).await?,
            reading: ReadingClient::new(settings, discovery.clone(), http.clone()).await?,
            value_descriptor: ValueDescriptorClient::new(settings, discovery.clone(), http.clone())
                .await?,
            ping: PingClient::new(settings, discovery, http).await?,
        };

        info!(
            application_id = %settings.application_id,
            cache_discovery_result = settings.cache_discovery_result,
            "Core data clients ready"
        );
        Ok(clients)
    }

    pub fn event(&self) -> &EventClient {
        &self.event
    }

    pub fn reading(&self) -> &ReadingClient {
        &self.reading
    }

    pub fn value_descriptor(&self) -> &ValueDescriptorClient {
        &self.value_descriptor
    }

    pub fn ping(&self) -> &PingClient {
        &self.ping
    }

    /// Toggle discovery caching on every client at once.
    pub fn set_cache_discovery_result(&self, flag: bool) {
        self.event.resolver().set_cache_discovery_result(flag);
        self.reading.resolver().set_cache_discovery_result(flag);
        self.value_descriptor.resolver().set_cache_discovery_result(flag);
        self.ping.resolver().set_cache_discovery_result(flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coredata_config::{ConfigManager, FileFormat};

    #[tokio::test]
    async fn test_connect_with_static_endpoints() {
        let clients = CoreDataClients::connect(&ClientSettings::default()).await.unwrap();

        assert_eq!(clients.event().resolver().endpoint().root_url, "");
        assert_eq!(
            clients.value_descriptor().resolver().path().unwrap(),
            "/api/v1/valuedescriptor"
        );
        assert_eq!(clients.ping().resolver().path().unwrap(), "/api/v1/ping");
    }

    #[tokio::test]
    async fn test_cache_flag_applies_to_all() {
        let clients = CoreDataClients::connect(&ClientSettings::default()).await.unwrap();
        assert!(!clients.reading().resolver().cache_discovery_result());

        clients.set_cache_discovery_result(true);
        assert!(clients.event().resolver().cache_discovery_result());
        assert!(clients.reading().resolver().cache_discovery_result());
        assert!(clients.value_descriptor().resolver().cache_discovery_result());
        assert!(clients.ping().resolver().cache_discovery_result());
    }

    #[tokio::test]
    async fn test_from_config_rejects_malformed_url() {
        let manager = ConfigManager::new();
        manager
            .load_str("[core.db.reading]\nurl = \"::nope::\"\n", FileFormat::Toml)
            .unwrap();

        let err = CoreDataClients::from_config(&ConfigService::from_manager(manager))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "the URL is malformed, core.db.reading.url: ::nope::"
        );
    }
}
