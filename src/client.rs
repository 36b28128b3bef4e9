//! Infrastructure API client.
//!
//! Blocking HTTP transport that handles authentication and raw requests.
//! Higher-level operations are implemented via traits on resource types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use url::Url;

use crate::error::{InfraError, Result};
use crate::transport::{RawResponse, Transport};

const DEFAULT_API_URL: &str = "https://api.infra.example.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const USER_AGENT: &str = concat!("infrapi/", env!("CARGO_PKG_VERSION"));

/// Low-level infrastructure API client.
///
/// Implements [`Transport`]: every request carries the bearer token, and
/// every response is returned with its status, whatever that status is.
/// Resource operations are implemented via the `Get`, `List`, `Create`,
/// `Update` and `Delete` traits on model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use infrapi::InfraClient;
///
/// # fn example() -> infrapi::Result<()> {
/// // Create from environment variables
/// let client = InfraClient::from_env()?;
///
/// // Or configure manually
/// let client = InfraClient::new("your-api-key", "https://api.infra.example.com/v1")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InfraClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
}

impl std::fmt::Debug for InfraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfraClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl InfraClient {
    /// Create a client from environment variables.
    ///
    /// Uses `INFRA_API_KEY` for authentication, optionally `INFRA_API_URL`
    /// for the base URL and `INFRA_TIMEOUT_SECS` for the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `INFRA_API_KEY` is not set or
    /// `INFRA_TIMEOUT_SECS` is not a number.
    pub fn from_env() -> Result<Self> {
        let token = env::var("INFRA_API_KEY").map_err(|_| {
            InfraError::ConfigMissing("INFRA_API_KEY environment variable not set".to_string())
        })?;

        let base_url = env::var("INFRA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout = match env::var("INFRA_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                InfraError::ConfigMissing(format!("INFRA_TIMEOUT_SECS must be whole seconds, got '{raw}'"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self::with_timeout(&token, &base_url, Duration::from_secs(timeout))
    }

    /// Create a new client with the provided token and base URL.
    ///
    /// # Arguments
    ///
    /// * `token` - API key
    /// * `base_url` - Base URL for the API (e.g., `https://api.infra.example.com/v1`)
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Self::with_timeout(token, base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Like [`new`](Self::new) with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn with_timeout(token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(InfraError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: token.to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str, query: &str) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(InfraError::HttpError)?;

        let status = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.bytes().map_err(InfraError::HttpError)?.to_vec();

        tracing::debug!(status, bytes = body.len(), "response received");

        Ok(RawResponse {
            status,
            body,
            retry_after_secs,
        })
    }

    fn json_body(request: RequestBuilder, body: &[u8]) -> RequestBuilder {
        request
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
    }
}

impl Transport for InfraClient {
    #[tracing::instrument(skip(self))]
    fn send_get(&self, path: &str, query: &str) -> Result<RawResponse> {
        let url = self.url(path, query)?;
        self.send(self.http.get(url))
    }

    #[tracing::instrument(skip(self, body))]
    fn send_post(&self, path: &str, body: &[u8]) -> Result<RawResponse> {
        let url = self.url(path, "")?;
        self.send(Self::json_body(self.http.post(url), body))
    }

    #[tracing::instrument(skip(self, body))]
    fn send_patch(&self, path: &str, body: &[u8]) -> Result<RawResponse> {
        let url = self.url(path, "")?;
        self.send(Self::json_body(self.http.patch(url), body))
    }

    #[tracing::instrument(skip(self, body))]
    fn send_delete(&self, path: &str, body: Option<&[u8]>) -> Result<RawResponse> {
        let url = self.url(path, "")?;
        let request = match body {
            Some(body) => Self::json_body(self.http.delete(url), body),
            None => self.http.delete(url),
        };
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = InfraClient::new("test-token", "https://api.infra.example.com/v1").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("InfraClient"));
        assert!(debug.contains("base_url"));
        // Token should not be in debug output
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = InfraClient::new("token", "https://api.infra.example.com/v1").unwrap();
        let client2 = InfraClient::new("token", "https://api.infra.example.com/v1/").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
    }

    #[test]
    fn test_query_is_set_verbatim() {
        let client = InfraClient::new("token", "https://api.infra.example.com/v1").unwrap();
        let url = client
            .url("instances", "filter[status][in]=running,stopped&page=2")
            .unwrap();
        assert_eq!(url.path(), "/v1/instances");
        assert_eq!(url.query(), Some("filter[status][in]=running,stopped&page=2"));

        let bare = client.url("instances/i-1", "").unwrap();
        assert_eq!(bare.query(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = InfraClient::new("token", "not a url").unwrap_err();
        assert!(matches!(err, InfraError::UrlError(_)));
    }
}
