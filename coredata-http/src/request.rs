//! Request builder.

use crate::{HttpClient, HttpClientError, Response, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// HTTP request builder.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Result<Vec<u8>>>,
    timeout: Option<Duration>,
}

impl<'a> RequestBuilder<'a> {
    /// Create a new request builder.
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: Url) -> Self {
        Self {
            client,
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Set the request body as JSON.
    ///
    /// A serialization failure is reported when the request is sent.
    pub fn json<T: Serialize>(mut self, json: &T) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(serde_json::to_vec(json).map_err(|e| HttpClientError::Json(e.to_string())));
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Target URL of this request.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send the request.
    pub async fn send(self) -> Result<Response> {
        let mut request = self.client.inner().request(self.method, self.url);

        for (name, value) in &self.client.config().default_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        if let Some(body) = self.body {
            request = request.body(body?);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        self.client.execute(request.build()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_json_body_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/event"))
            .and(query_param("source", "test"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"device": "thermostat"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("5a1b"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::default_client().unwrap();
        let url = Url::parse(&format!("{}/api/v1/event", server.uri())).unwrap();
        let response = client
            .post(url)
            .query("source", "test")
            .json(&serde_json::json!({"device": "thermostat"}))
            .send()
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.text().unwrap(), "5a1b");
    }
}
