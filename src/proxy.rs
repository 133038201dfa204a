//! Generic REST proxy bound to one core data resource.

use crate::endpoint::{EndpointResolver, path_from_url};
use crate::settings::{ClientSettings, Entity};
use crate::Result;
use coredata_discovery::DiscoveryResolver;
use coredata_http::{HttpClient, HttpClientError, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Issues single remote calls against the resolved endpoint of one entity.
///
/// The target is `root_url + path` when the registry produced a root URL
/// and the statically configured URL otherwise. Operation segments are
/// appended to that target.
#[derive(Debug)]
pub struct EntityProxy {
    entity: Entity,
    static_url: String,
    resolver: EndpointResolver,
    http: HttpClient,
}

impl EntityProxy {
    /// Bind a proxy to `entity`.
    ///
    /// Fails with [`crate::ClientError::MalformedEndpoint`] when the static
    /// URL configured for the entity cannot be parsed.
    pub async fn new(
        entity: Entity,
        settings: &ClientSettings,
        discovery: DiscoveryResolver,
        http: HttpClient,
    ) -> Result<Self> {
        let static_url = settings.endpoint_url(entity).to_string();
        let configured = static_url.clone();
        let resolver = EndpointResolver::new(
            discovery,
            settings.application_id.clone(),
            settings.resolver_policy(),
            move || path_from_url(entity.config_key(), &configured),
        )
        .await;

        resolver.path()?;

        Ok(Self {
            entity,
            static_url,
            resolver,
            http,
        })
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Statically configured endpoint URL.
    pub fn static_url(&self) -> &str {
        &self.static_url
    }

    /// Base URL the next call will go to.
    pub async fn target(&self) -> Result<Url> {
        let root = self.resolver.root_url().await;
        let base = if root.is_empty() {
            self.static_url.clone()
        } else {
            format!("{}{}", root, self.resolver.path()?)
        };

        Url::parse(&base).map_err(|e| HttpClientError::InvalidUrl(format!("{}: {}", base, e)).into())
    }

    async fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.target().await?;
        if url.cannot_be_a_base() {
            return Err(HttpClientError::InvalidUrl(url.to_string()).into());
        }
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn call<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response> {
        let url = self.url(segments).await?;
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?.error_for_status()?)
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.call::<()>(Method::GET, segments, None).await?;
        Ok(response.json()?)
    }

    /// GET a plain-text body.
    pub async fn get_text(&self, segments: &[&str]) -> Result<String> {
        let response = self.call::<()>(Method::GET, segments, None).await?;
        Ok(response.text()?)
    }

    /// POST a JSON body; the service answers with the new id as text.
    pub async fn post_json<B: Serialize>(&self, body: &B) -> Result<String> {
        let response = self.call(Method::POST, &[], Some(body)).await?;
        Ok(response.text()?)
    }

    /// PUT, optionally with a JSON body, and decode the JSON answer.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T> {
        let response = self.call(Method::PUT, segments, body).await?;
        Ok(response.json()?)
    }

    /// DELETE and decode the JSON answer.
    pub async fn delete_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.call::<()>(Method::DELETE, segments, None).await?;
        Ok(response.json()?)
    }
}
