//! HTTP client implementation.

use http::Method;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::{HttpClientConfig, HttpClientError, RequestBuilder, Response, Result};

/// Long-lived HTTP client with a shared connection pool.
///
/// Cloning is cheap; clones share the pool and configuration.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .build()
            .map_err(|e| HttpClientError::Build(e.to_string()))?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: Url) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: Url) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, url)
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: Url) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PUT, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: Url) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::DELETE, url)
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, url)
    }

    /// Execute a request exactly once.
    pub(crate) async fn execute(&self, request: reqwest::Request) -> Result<Response> {
        debug!(method = %request.method(), url = %request.url(), "Sending request");
        let response = self.inner.execute(request).await?;
        let response = Response::from_reqwest(response).await?;
        debug!(status = %response.status(), url = %response.url(), "Received response");
        Ok(response)
    }

    pub(crate) fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}
