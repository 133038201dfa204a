//! # Core Data HTTP Client
//!
//! A long-lived HTTP client with a shared connection pool, used by the core
//! data client proxies. Requests are sent exactly once; failures are handed
//! back to the caller untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coredata_http::{HttpClient, HttpClientConfig, Url};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::default())?;
//!
//!     let response = client
//!         .get(Url::parse("http://localhost:48080/api/v1/ping")?)
//!         .send()
//!         .await?
//!         .error_for_status()?;
//!
//!     println!("core data says {}", response.text()?);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use request::RequestBuilder;
pub use response::Response;

pub use bytes::Bytes;
pub use http::{HeaderMap, Method, StatusCode, header};
pub use url::Url;
