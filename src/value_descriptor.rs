//! Value descriptor client.

use crate::model::ValueDescriptor;
use crate::proxy::EntityProxy;
use crate::settings::{ClientSettings, Entity};
use crate::{EndpointResolver, Result};
use coredata_discovery::DiscoveryResolver;
use coredata_http::HttpClient;

/// Client for the core data value descriptor resource
/// (`core.db.valuedescriptor.url`).
#[derive(Debug)]
pub struct ValueDescriptorClient {
    proxy: EntityProxy,
}

impl ValueDescriptorClient {
    pub async fn new(
        settings: &ClientSettings,
        discovery: DiscoveryResolver,
        http: HttpClient,
    ) -> Result<Self> {
        Ok(Self {
            proxy: EntityProxy::new(Entity::ValueDescriptor, settings, discovery, http).await?,
        })
    }

    pub fn resolver(&self) -> &EndpointResolver {
        self.proxy.resolver()
    }

    pub async fn value_descriptor(&self, id: &str) -> Result<ValueDescriptor> {
        self.proxy.get_json(&[id]).await
    }

    pub async fn value_descriptors(&self) -> Result<Vec<ValueDescriptor>> {
        self.proxy.get_json(&[]).await
    }

    pub async fn value_descriptor_by_name(&self, name: &str) -> Result<ValueDescriptor> {
        self.proxy.get_json(&["name", name]).await
    }

    pub async fn value_descriptors_by_uom_label(
        &self,
        uom_label: &str,
    ) -> Result<Vec<ValueDescriptor>> {
        self.proxy.get_json(&["uomlabel", uom_label]).await
    }

    pub async fn value_descriptors_by_label(&self, label: &str) -> Result<Vec<ValueDescriptor>> {
        self.proxy.get_json(&["label", label]).await
    }

    pub async fn value_descriptors_for_device_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<ValueDescriptor>> {
        self.proxy.get_json(&["devicename", name]).await
    }

    pub async fn value_descriptors_for_device_by_id(
        &self,
        id: &str,
    ) -> Result<Vec<ValueDescriptor>> {
        self.proxy.get_json(&["deviceid", id]).await
    }

    /// Store a value descriptor; returns the id the service assigned.
    pub async fn add(&self, value_descriptor: &ValueDescriptor) -> Result<String> {
        self.proxy.post_json(value_descriptor).await
    }

    pub async fn update(&self, value_descriptor: &ValueDescriptor) -> Result<bool> {
        self.proxy.put_json(&[], Some(value_descriptor)).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.proxy.delete_json(&["id", id]).await
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<bool> {
        self.proxy.delete_json(&["name", name]).await
    }
}
