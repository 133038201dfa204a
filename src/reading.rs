//! Reading client.

use crate::model::{IoTType, Reading};
use crate::proxy::EntityProxy;
use crate::settings::{ClientSettings, Entity};
use crate::{EndpointResolver, Result};
use coredata_discovery::DiscoveryResolver;
use coredata_http::HttpClient;

/// Client for the core data reading resource (`core.db.reading.url`).
#[derive(Debug)]
pub struct ReadingClient {
    proxy: EntityProxy,
}

impl ReadingClient {
    pub async fn new(
        settings: &ClientSettings,
        discovery: DiscoveryResolver,
        http: HttpClient,
    ) -> Result<Self> {
        Ok(Self {
            proxy: EntityProxy::new(Entity::Reading, settings, discovery, http).await?,
        })
    }

    pub fn resolver(&self) -> &EndpointResolver {
        self.proxy.resolver()
    }

    pub async fn reading(&self, id: &str) -> Result<Reading> {
        self.proxy.get_json(&[id]).await
    }

    pub async fn readings(&self) -> Result<Vec<Reading>> {
        self.proxy.get_json(&[]).await
    }

    pub async fn readings_for_device(&self, device_id: &str, limit: u32) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        self.proxy.get_json(&["device", device_id, limit.as_str()]).await
    }

    pub async fn readings_by_name(&self, name: &str, limit: u32) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        self.proxy.get_json(&["name", name, limit.as_str()]).await
    }

    pub async fn readings_by_name_and_device(
        &self,
        name: &str,
        device: &str,
        limit: u32,
    ) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        self.proxy
            .get_json(&["name", name, "device", device, limit.as_str()])
            .await
    }

    pub async fn readings_by_label(&self, label: &str, limit: u32) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        self.proxy.get_json(&["label", label, limit.as_str()]).await
    }

    pub async fn readings_by_uom_label(&self, uom_label: &str, limit: u32) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        self.proxy.get_json(&["uomlabel", uom_label, limit.as_str()]).await
    }

    pub async fn readings_by_type(&self, value_type: IoTType, limit: u32) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        self.proxy
            .get_json(&["type", value_type.as_str(), limit.as_str()])
            .await
    }

    /// Readings created between `start` and `end` (epoch millis).
    pub async fn readings_by_time(&self, start: i64, end: i64, limit: u32) -> Result<Vec<Reading>> {
        let (start, end, limit) = (start.to_string(), end.to_string(), limit.to_string());
        self.proxy
            .get_json(&[start.as_str(), end.as_str(), limit.as_str()])
            .await
    }

    /// Store a reading; returns the id the service assigned.
    pub async fn add(&self, reading: &Reading) -> Result<String> {
        self.proxy.post_json(reading).await
    }

    pub async fn update(&self, reading: &Reading) -> Result<bool> {
        self.proxy.put_json(&[], Some(reading)).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.proxy.delete_json(&["id", id]).await
    }
}
