//! Discovery-backed endpoint resolution.
//!
//! An [`EndpointResolver`] owns the root URL found through the service
//! registry and the resource path taken from static configuration. Every
//! entity client holds one and asks it for a base URL before each call.

use crate::{ClientError, Result};
use coredata_discovery::DiscoveryResolver;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use url::Url;

/// Produces the resource path of an entity from its static configuration.
pub type PathExtractor = Box<dyn Fn() -> Result<String> + Send + Sync>;

/// Cache behaviour of an [`EndpointResolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// Resolve the root URL once at construction and never refresh it.
    pub cache_discovery_result: bool,
    /// Query the registry again while the root URL is still empty.
    /// Off by default: an unresolved resolver stays on the static URL.
    pub retry_unresolved: bool,
}

/// Snapshot of the resolver's cached state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Discovered root URL without trailing slash; empty when unresolved.
    pub root_url: String,
    /// Resource path, `None` until first extracted.
    pub path: Option<String>,
}

/// Root URL and path resolution shared by all entity clients.
pub struct EndpointResolver {
    discovery: DiscoveryResolver,
    application_id: String,
    cache_discovery_result: AtomicBool,
    retry_unresolved: bool,
    root_url: RwLock<String>,
    path: Mutex<Option<String>>,
    extract_path: PathExtractor,
}

impl EndpointResolver {
    /// Create a resolver and perform the initial registry lookup.
    ///
    /// The path is not extracted until [`EndpointResolver::path`] is first
    /// called.
    pub async fn new<F>(
        discovery: DiscoveryResolver,
        application_id: impl Into<String>,
        policy: ResolverPolicy,
        extract_path: F,
    ) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        let application_id = application_id.into();
        let root_url = discover(&discovery, &application_id).await.unwrap_or_default();
        if root_url.is_empty() {
            info!(application_id = %application_id, "Core data not found in registry, using static endpoint");
        }

        Self {
            discovery,
            application_id,
            cache_discovery_result: AtomicBool::new(policy.cache_discovery_result),
            retry_unresolved: policy.retry_unresolved,
            root_url: RwLock::new(root_url),
            path: Mutex::new(None),
            extract_path: Box::new(extract_path),
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Override the cache policy for this resolver only.
    pub fn set_cache_discovery_result(&self, flag: bool) {
        self.cache_discovery_result.store(flag, Ordering::Relaxed);
    }

    pub fn cache_discovery_result(&self) -> bool {
        self.cache_discovery_result.load(Ordering::Relaxed)
    }

    /// Current root URL, refreshed from the registry when the policy allows.
    ///
    /// With caching off and a root URL already known, the registry is
    /// queried again; a hit replaces the cached value and a miss keeps it.
    /// An empty root URL is only re-queried with `retry_unresolved`.
    pub async fn root_url(&self) -> String {
        let current = self.root_url.read().clone();

        let refresh = if current.is_empty() {
            self.retry_unresolved
        } else {
            !self.cache_discovery_result()
        };
        if !refresh {
            return current;
        }

        match discover(&self.discovery, &self.application_id).await {
            Some(url) => {
                let mut cached = self.root_url.write();
                if *cached != url {
                    debug!(application_id = %self.application_id, old = %*cached, new = %url, "Root URL changed");
                    *cached = url.clone();
                }
                url
            }
            None => self.root_url.read().clone(),
        }
    }

    /// Resource path, extracted on first use and cached afterwards.
    pub fn path(&self) -> Result<String> {
        let mut path = self.path.lock();
        if let Some(path) = path.as_ref() {
            return Ok(path.clone());
        }

        let extracted = (self.extract_path)()?;
        *path = Some(extracted.clone());
        Ok(extracted)
    }

    /// Snapshot of the cached root URL and path; never queries anything.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            root_url: self.root_url.read().clone(),
            path: self.path.lock().clone(),
        }
    }
}

impl fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointResolver")
            .field("application_id", &self.application_id)
            .field("cache_discovery_result", &self.cache_discovery_result())
            .field("retry_unresolved", &self.retry_unresolved)
            .field("endpoint", &self.endpoint())
            .finish()
    }
}

async fn discover(discovery: &DiscoveryResolver, application_id: &str) -> Option<String> {
    let uri = discovery.lookup(application_id).await?;
    let root = uri.as_str().trim_end_matches('/');
    (!root.is_empty()).then(|| root.to_string())
}

/// Path component of a statically configured endpoint URL.
///
/// `key` names the configuration entry and appears in the error.
pub fn path_from_url(key: &str, url: &str) -> Result<String> {
    let malformed = || ClientError::MalformedEndpoint {
        key: key.to_string(),
        url: url.to_string(),
    };

    let parsed = Url::parse(url).map_err(|_| malformed())?;
    if parsed.cannot_be_a_base() || !parsed.has_host() {
        return Err(malformed());
    }

    Ok(parsed.path().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coredata_discovery::{
        DiscoveryError, InMemoryDiscovery, SelectionStrategy, ServiceDiscovery, ServiceInstance,
    };
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    const APP_ID: &str = "edgex-core-data";
    const VD_URL: &str = "http://localhost:48080/api/v1/valuedescriptor";

    /// In-memory registry that counts lookups
    #[derive(Default)]
    struct CountingRegistry {
        inner: InMemoryDiscovery,
        calls: AtomicUsize,
    }

    impl CountingRegistry {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ServiceDiscovery for CountingRegistry {
        async fn discover(
            &self,
            service_name: &str,
        ) -> std::result::Result<Vec<ServiceInstance>, DiscoveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.discover(service_name).await
        }

        async fn list_services(&self) -> std::result::Result<Vec<String>, DiscoveryError> {
            self.inner.list_services().await
        }
    }

    async fn resolver_with(
        registry: Arc<CountingRegistry>,
        policy: ResolverPolicy,
    ) -> EndpointResolver {
        EndpointResolver::new(
            DiscoveryResolver::new(registry, SelectionStrategy::First),
            APP_ID,
            policy,
            || path_from_url("core.db.valuedescriptor.url", VD_URL),
        )
        .await
    }

    fn instance(id: &str, host: &str) -> ServiceInstance {
        ServiceInstance::new(id, APP_ID, host, 48080)
    }

    #[tokio::test]
    async fn test_no_registry_stays_empty() {
        let resolver = EndpointResolver::new(
            DiscoveryResolver::disabled(),
            APP_ID,
            ResolverPolicy::default(),
            || path_from_url("core.db.valuedescriptor.url", VD_URL),
        )
        .await;

        assert_eq!(resolver.root_url().await, "");
        assert_eq!(resolver.path().unwrap(), "/api/v1/valuedescriptor");
    }

    #[tokio::test]
    async fn test_initial_lookup_strips_trailing_slash() {
        let registry = Arc::new(CountingRegistry::default());
        registry.inner.register(&instance("a", "10.0.0.1")).await;

        let resolver = resolver_with(registry.clone(), ResolverPolicy::default()).await;
        assert_eq!(registry.calls(), 1);
        assert_eq!(resolver.endpoint().root_url, "http://10.0.0.1:48080");
        assert_eq!(resolver.endpoint().path, None);
    }

    #[tokio::test]
    async fn test_cached_root_url_never_refreshes() {
        let registry = Arc::new(CountingRegistry::default());
        registry.inner.register(&instance("a", "10.0.0.1")).await;

        let policy = ResolverPolicy {
            cache_discovery_result: true,
            ..ResolverPolicy::default()
        };
        let resolver = resolver_with(registry.clone(), policy).await;

        registry.inner.clear().await;
        registry.inner.register(&instance("b", "10.0.0.2")).await;

        for _ in 0..3 {
            assert_eq!(resolver.root_url().await, "http://10.0.0.1:48080");
        }
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn test_uncached_root_url_follows_registry() {
        let registry = Arc::new(CountingRegistry::default());
        registry.inner.register(&instance("a", "10.0.0.1")).await;
        let resolver = resolver_with(registry.clone(), ResolverPolicy::default()).await;

        registry.inner.clear().await;
        registry.inner.register(&instance("b", "10.0.0.2")).await;
        assert_eq!(resolver.root_url().await, "http://10.0.0.2:48080");

        // A miss keeps the last known value
        registry.inner.clear().await;
        assert_eq!(resolver.root_url().await, "http://10.0.0.2:48080");
        assert_eq!(resolver.endpoint().root_url, "http://10.0.0.2:48080");
        assert_eq!(registry.calls(), 3);
    }

    #[tokio::test]
    async fn test_per_instance_override() {
        let registry = Arc::new(CountingRegistry::default());
        registry.inner.register(&instance("a", "10.0.0.1")).await;

        let first = resolver_with(registry.clone(), ResolverPolicy::default()).await;
        let second = resolver_with(registry.clone(), ResolverPolicy::default()).await;
        first.set_cache_discovery_result(true);
        assert!(first.cache_discovery_result());
        assert!(!second.cache_discovery_result());

        registry.inner.clear().await;
        registry.inner.register(&instance("b", "10.0.0.2")).await;

        assert_eq!(first.root_url().await, "http://10.0.0.1:48080");
        assert_eq!(second.root_url().await, "http://10.0.0.2:48080");
    }

    #[tokio::test]
    async fn test_unresolved_does_not_self_heal() {
        let registry = Arc::new(CountingRegistry::default());
        let resolver = resolver_with(registry.clone(), ResolverPolicy::default()).await;

        registry.inner.register(&instance("a", "10.0.0.1")).await;
        assert_eq!(resolver.root_url().await, "");
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn test_retry_unresolved() {
        let registry = Arc::new(CountingRegistry::default());
        let policy = ResolverPolicy {
            cache_discovery_result: true,
            retry_unresolved: true,
        };
        let resolver = resolver_with(registry.clone(), policy).await;
        assert_eq!(resolver.root_url().await, "");

        registry.inner.register(&instance("a", "10.0.0.1")).await;
        assert_eq!(resolver.root_url().await, "http://10.0.0.1:48080");

        // Cached from here on
        registry.inner.clear().await;
        registry.inner.register(&instance("b", "10.0.0.2")).await;
        assert_eq!(resolver.root_url().await, "http://10.0.0.1:48080");
        assert_eq!(registry.calls(), 3);
    }

    #[tokio::test]
    async fn test_path_extracted_once() {
        let extractions = Arc::new(AtomicUsize::new(0));
        let counter = extractions.clone();
        let resolver = EndpointResolver::new(
            DiscoveryResolver::disabled(),
            APP_ID,
            ResolverPolicy::default(),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                path_from_url("core.db.valuedescriptor.url", VD_URL)
            },
        )
        .await;

        assert_eq!(extractions.load(Ordering::SeqCst), 0);
        let first = resolver.path().unwrap();
        let second = resolver.path().unwrap();
        assert_eq!(first, second);
        assert_eq!(extractions.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.endpoint().path.as_deref(), Some("/api/v1/valuedescriptor"));
    }

    #[tokio::test]
    async fn test_malformed_path() {
        let resolver = EndpointResolver::new(
            DiscoveryResolver::disabled(),
            APP_ID,
            ResolverPolicy::default(),
            || path_from_url("core.db.event.url", "ht!tp://bad"),
        )
        .await;

        match resolver.path() {
            Err(ClientError::MalformedEndpoint { key, url }) => {
                assert_eq!(key, "core.db.event.url");
                assert_eq!(url, "ht!tp://bad");
            }
            other => panic!("expected malformed endpoint, got {:?}", other),
        }
        assert_eq!(resolver.endpoint().path, None);
    }

    #[tokio::test]
    async fn test_concurrent_root_url() {
        let registry = Arc::new(CountingRegistry::default());
        registry.inner.register(&instance("a", "10.0.0.1")).await;
        let resolver = Arc::new(resolver_with(registry.clone(), ResolverPolicy::default()).await);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.root_url().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "http://10.0.0.1:48080");
        }
        assert_eq!(registry.calls(), 9);
    }

    #[test]
    fn test_path_from_url() {
        assert_eq!(
            path_from_url("k", "http://host:48080/api/v1/valuedescriptor").unwrap(),
            "/api/v1/valuedescriptor"
        );
        assert_eq!(path_from_url("k", "http://host:48080/api/v1/event/").unwrap(), "/api/v1/event");
        assert_eq!(path_from_url("k", "http://host:48080").unwrap(), "");
        assert!(path_from_url("k", "ht!tp://bad").is_err());
        assert!(path_from_url("k", "mailto:ops@example.com").is_err());
        assert!(path_from_url("k", "").is_err());
    }
}
