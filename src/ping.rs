//! Liveness check against core data.

use crate::proxy::EntityProxy;
use crate::settings::{ClientSettings, Entity};
use crate::{EndpointResolver, Result};
use coredata_discovery::DiscoveryResolver;
use coredata_http::HttpClient;

/// Client for the core data ping endpoint (`core.db.ping.url`).
#[derive(Debug)]
pub struct PingClient {
    proxy: EntityProxy,
}

impl PingClient {
    pub async fn new(
        settings: &ClientSettings,
        discovery: DiscoveryResolver,
        http: HttpClient,
    ) -> Result<Self> {
        Ok(Self {
            proxy: EntityProxy::new(Entity::Ping, settings, discovery, http).await?,
        })
    }

    pub fn resolver(&self) -> &EndpointResolver {
        self.proxy.resolver()
    }

    /// Returns the service's answer, `pong` for a healthy core data.
    pub async fn ping(&self) -> Result<String> {
        self.proxy.get_text(&[]).await
    }
}
