//! Event client.

use crate::model::{Event, Reading};
use crate::proxy::EntityProxy;
use crate::settings::{ClientSettings, Entity};
use crate::{EndpointResolver, Result};
use coredata_discovery::DiscoveryResolver;
use coredata_http::HttpClient;

/// Client for the core data event resource (`core.db.event.url`).
#[derive(Debug)]
pub struct EventClient {
    proxy: EntityProxy,
}

impl EventClient {
    pub async fn new(
        settings: &ClientSettings,
        discovery: DiscoveryResolver,
        http: HttpClient,
    ) -> Result<Self> {
        Ok(Self {
            proxy: EntityProxy::new(Entity::Event, settings, discovery, http).await?,
        })
    }

    pub fn resolver(&self) -> &EndpointResolver {
        self.proxy.resolver()
    }

    pub async fn event(&self, id: &str) -> Result<Event> {
        self.proxy.get_json(&[id]).await
    }

    pub async fn events(&self) -> Result<Vec<Event>> {
        self.proxy.get_json(&[]).await
    }

    /// Events created between `start` and `end` (epoch millis).
    pub async fn events_by_time(&self, start: i64, end: i64, limit: u32) -> Result<Vec<Event>> {
        let (start, end, limit) = (start.to_string(), end.to_string(), limit.to_string());
        self.proxy.get_json(&[start.as_str(), end.as_str(), limit.as_str()]).await
    }

    pub async fn events_for_device(&self, device_id: &str, limit: u32) -> Result<Vec<Event>> {
        let limit = limit.to_string();
        self.proxy.get_json(&["device", device_id, limit.as_str()]).await
    }

    pub async fn readings_for_device_and_value_descriptor(
        &self,
        device_id: &str,
        value_descriptor: &str,
        limit: u32,
    ) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        self.proxy
            .get_json(&["device", device_id, "valuedescriptor", value_descriptor, limit.as_str()])
            .await
    }

    /// Store an event; returns the id the service assigned.
    pub async fn add(&self, event: &Event) -> Result<String> {
        self.proxy.post_json(event).await
    }

    pub async fn mark_pushed(&self, id: &str) -> Result<bool> {
        self.proxy.put_json::<(), _>(&["id", id], None).await
    }

    pub async fn update(&self, event: &Event) -> Result<bool> {
        self.proxy.put_json(&[], Some(event)).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.proxy.delete_json(&["id", id]).await
    }

    /// Delete all events of a device; returns how many were removed.
    pub async fn delete_by_device(&self, device_id: &str) -> Result<i32> {
        self.proxy.delete_json(&["device", device_id]).await
    }

    /// Remove events (and their readings) already pushed upstream.
    pub async fn scrub_pushed_events(&self) -> Result<i64> {
        self.proxy.delete_json(&["scrub"]).await
    }

    /// Remove events older than `age` milliseconds.
    pub async fn scrub_old_events(&self, age: i64) -> Result<i64> {
        let age = age.to_string();
        self.proxy.delete_json(&["removeold", "age", age.as_str()]).await
    }
}
