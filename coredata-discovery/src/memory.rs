//! In-memory service registry (for testing)

use crate::service::{DiscoveryError, ServiceDiscovery, ServiceInstance};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory registry (for testing/development).
///
/// Instances are kept in registration order so that `First` selection is
/// deterministic.
#[derive(Clone, Default)]
pub struct InMemoryDiscovery {
    services: Arc<RwLock<Vec<ServiceInstance>>>,
}

impl InMemoryDiscovery {
    /// Create new in-memory discovery
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance, replacing any instance with the same id
    pub async fn register(&self, service: &ServiceInstance) {
        let mut services = self.services.write().await;
        match services.iter_mut().find(|s| s.id == service.id) {
            Some(existing) => *existing = service.clone(),
            None => services.push(service.clone()),
        }
    }

    /// Remove an instance by id
    pub async fn deregister(&self, service_id: &str) -> Result<(), DiscoveryError> {
        let mut services = self.services.write().await;
        let before = services.len();
        services.retain(|s| s.id != service_id);
        if services.len() == before {
            return Err(DiscoveryError::ServiceNotFound(service_id.to_string()));
        }
        Ok(())
    }

    /// Clear all registered services
    pub async fn clear(&self) {
        self.services.write().await.clear();
    }

    /// Get count of registered services
    pub async fn count(&self) -> usize {
        self.services.read().await.len()
    }
}

#[async_trait]
impl ServiceDiscovery for InMemoryDiscovery {
    async fn discover(&self, service_name: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        let services = self.services.read().await;
        Ok(services
            .iter()
            .filter(|s| s.name == service_name)
            .cloned()
            .collect())
    }

    async fn list_services(&self) -> Result<Vec<String>, DiscoveryError> {
        let services = self.services.read().await;
        let mut service_names: Vec<String> = services.iter().map(|s| s.name.clone()).collect();

        service_names.sort();
        service_names.dedup();

        Ok(service_names)
    }
}
