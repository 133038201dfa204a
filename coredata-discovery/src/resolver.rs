//! Registry lookup that never fails

use crate::service::{InstanceSelector, SelectionStrategy, ServiceDiscovery};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Resolves an application id to the URI of one registered instance.
///
/// Registry trouble is an expected condition here: a missing registry, a
/// failed query or an empty instance list all resolve to `None`.
#[derive(Clone, Default)]
pub struct DiscoveryResolver {
    registry: Option<Arc<dyn ServiceDiscovery>>,
    selector: Arc<InstanceSelector>,
}

impl DiscoveryResolver {
    /// Resolver backed by a registry
    pub fn new(registry: Arc<dyn ServiceDiscovery>, strategy: SelectionStrategy) -> Self {
        Self {
            registry: Some(registry),
            selector: Arc::new(InstanceSelector::new(strategy)),
        }
    }

    /// Resolver with no registry configured; every lookup yields `None`
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.registry.is_some()
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.selector.strategy()
    }

    /// Look up one instance of `application_id` and return its URI
    pub async fn lookup(&self, application_id: &str) -> Option<Url> {
        let registry = self.registry.as_ref()?;

        let instances = match registry.discover(application_id).await {
            Ok(instances) => instances,
            Err(e) => {
                debug!(application_id, error = %e, "Discovery registry unavailable");
                return None;
            }
        };

        let instance = match self.selector.select(&instances) {
            Some(instance) => instance,
            None => {
                debug!(application_id, "No instances registered");
                return None;
            }
        };

        match instance.uri() {
            Ok(uri) => {
                debug!(application_id, instance = %instance.id, %uri, "Resolved instance");
                Some(uri)
            }
            Err(e) => {
                warn!(application_id, instance = %instance.id, error = %e, "Registered instance has an unusable address");
                None
            }
        }
    }
}

impl fmt::Debug for DiscoveryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryResolver")
            .field("enabled", &self.is_enabled())
            .field("strategy", &self.strategy())
            .finish()
    }
}
