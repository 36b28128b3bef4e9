//! Transport boundary.
//!
//! The request engine never talks to the network itself. It needs a
//! [`Transport`] that sends one request and hands back the raw status and
//! body. [`InfraClient`](crate::InfraClient) is the production
//! implementation; tests substitute an in-memory one.

use crate::error::Result;

/// Raw outcome of a single HTTP exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// `Retry-After` in seconds, when the server sent one.
    pub retry_after_secs: Option<u64>,
}

impl RawResponse {
    /// A response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after_secs: None,
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests and returns raw responses.
///
/// Every status, including 4xx and 5xx, is returned as `Ok`. Only failures
/// that happen before a status is obtained are errors. Authentication,
/// TLS and retry policy belong to the implementation.
pub trait Transport {
    /// GET `path` with an already-rendered query string (no leading `?`).
    fn send_get(&self, path: &str, query: &str) -> Result<RawResponse>;

    /// POST a JSON body to `path`.
    fn send_post(&self, path: &str, body: &[u8]) -> Result<RawResponse>;

    /// PATCH `path` with a JSON body.
    fn send_patch(&self, path: &str, body: &[u8]) -> Result<RawResponse>;

    /// DELETE `path`, optionally with a JSON body.
    fn send_delete(&self, path: &str, body: Option<&[u8]>) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send_get(&self, path: &str, query: &str) -> Result<RawResponse> {
        (**self).send_get(path, query)
    }

    fn send_post(&self, path: &str, body: &[u8]) -> Result<RawResponse> {
        (**self).send_post(path, body)
    }

    fn send_patch(&self, path: &str, body: &[u8]) -> Result<RawResponse> {
        (**self).send_patch(path, body)
    }

    fn send_delete(&self, path: &str, body: Option<&[u8]>) -> Result<RawResponse> {
        (**self).send_delete(path, body)
    }
}
