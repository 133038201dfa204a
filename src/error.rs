//! Client error types.

use coredata_config::ConfigError;
use coredata_http::HttpClientError;
use thiserror::Error;

/// Result type for core data client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by the core data clients.
///
/// Registry failures never show up here: an unreachable or empty registry
/// only means the static endpoint URL is used.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A statically configured endpoint URL could not be parsed.
    #[error("the URL is malformed, {key}: {url}")]
    MalformedEndpoint {
        /// Configuration key the URL came from.
        key: String,
        /// The offending value.
        url: String,
    },

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The remote call failed; passed through as reported.
    #[error(transparent)]
    Remote(#[from] HttpClientError),
}

impl ClientError {
    /// Check for a 404 from the core data service.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_not_found())
    }

    /// HTTP status reported by the core data service, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote(e) => e.status_code(),
            _ => None,
        }
    }
}
