//! Generic verb functions.
//!
//! Every per-resource method is an instantiation of one of these. Each one
//! sends a single request through a [`Transport`], parses the envelope,
//! gives the [`ErrorHandler`] first claim on the response, checks the status
//! and finally decodes the payload. None of them keep state between calls.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::envelope::{RawEnvelope, ServerError};
use crate::error::{InfraError, Result};
use crate::handler::ErrorHandler;
use crate::pagination::{Page, DEFAULT_PAGE_SIZE};
use crate::params::RequestParams;
use crate::transport::{RawResponse, Transport};

/// A decoded payload together with any errors the server reported
/// alongside it.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub data: T,
    pub errors: Vec<ServerError>,
}

impl<T> Decoded<T> {
    /// Whether the server reported errors next to the payload.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The payload, or [`InfraError::Server`] if any errors were reported.
    ///
    /// # Errors
    ///
    /// Returns [`InfraError::Server`] when `errors` is non-empty.
    pub fn into_result(self) -> Result<T> {
        if self.errors.is_empty() {
            Ok(self.data)
        } else {
            Err(InfraError::Server(self.errors))
        }
    }

    /// Split into payload and server errors.
    pub fn into_parts(self) -> (T, Vec<ServerError>) {
        (self.data, self.errors)
    }
}

/// GET a single resource.
///
/// # Errors
///
/// Transport errors, the handler's domain error, status errors and decode
/// errors, in that order of precedence.
#[tracing::instrument(skip(transport, params, handler))]
pub fn fetch<T, C, H>(transport: &C, path: &str, params: &RequestParams, handler: H) -> Result<Decoded<T>>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
    H: ErrorHandler,
{
    let response = transport.send_get(path, &params.to_query_string())?;
    let envelope = checked_envelope(&response, &handler)?;
    let (data, errors) = envelope.into_single()?;
    Ok(Decoded { data, errors })
}

/// GET one page of a collection.
///
/// Page number and size default to 1 and [`DEFAULT_PAGE_SIZE`] when
/// `params` leaves them unset.
///
/// # Errors
///
/// As [`fetch`]; a non-array `data` is a decode error.
#[tracing::instrument(skip(transport, params, handler))]
pub fn fetch_page<T, C, H>(
    transport: &C,
    path: &str,
    params: &RequestParams,
    handler: H,
) -> Result<Decoded<Page<T>>>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
    H: ErrorHandler,
{
    let params = params.with_page(
        params.page().unwrap_or(1),
        params.per_page().unwrap_or(DEFAULT_PAGE_SIZE),
    );
    let response = transport.send_get(path, &params.to_query_string())?;
    let envelope = checked_envelope(&response, &handler)?;
    let (items, pagination, errors) = envelope.into_collection()?;
    let page = Page::new(
        items,
        pagination,
        params.page().unwrap_or(1),
        params.per_page().unwrap_or(DEFAULT_PAGE_SIZE),
    );
    Ok(Decoded { data: page, errors })
}

/// POST a new resource.
///
/// # Errors
///
/// As [`fetch`], plus serialization errors for `body`.
#[tracing::instrument(skip(transport, body, handler))]
pub fn create<T, B, C, H>(transport: &C, path: &str, body: &B, handler: H) -> Result<Decoded<T>>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
    C: Transport + ?Sized,
    H: ErrorHandler,
{
    let body = serde_json::to_vec(body)?;
    let response = transport.send_post(path, &body)?;
    let envelope = checked_envelope(&response, &handler)?;
    let (data, errors) = envelope.into_single()?;
    Ok(Decoded { data, errors })
}

/// PATCH an existing resource.
///
/// # Errors
///
/// As [`create`].
#[tracing::instrument(skip(transport, body, handler))]
pub fn update<T, B, C, H>(transport: &C, path: &str, body: &B, handler: H) -> Result<Decoded<T>>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
    C: Transport + ?Sized,
    H: ErrorHandler,
{
    let body = serde_json::to_vec(body)?;
    let response = transport.send_patch(path, &body)?;
    let envelope = checked_envelope(&response, &handler)?;
    let (data, errors) = envelope.into_single()?;
    Ok(Decoded { data, errors })
}

/// DELETE a resource. Returns any server errors from the envelope (none
/// for an empty `204` body).
///
/// # Errors
///
/// Transport errors, the handler's domain error and status errors.
#[tracing::instrument(skip(transport, body, handler))]
pub fn remove<B, C, H>(transport: &C, path: &str, body: Option<&B>, handler: H) -> Result<Vec<ServerError>>
where
    B: Serialize + ?Sized,
    C: Transport + ?Sized,
    H: ErrorHandler,
{
    let body = body.map(serde_json::to_vec).transpose()?;
    let response = transport.send_delete(path, body.as_deref())?;
    let envelope = checked_envelope(&response, &handler)?;
    Ok(envelope.errors().to_vec())
}

/// Parse the envelope, let the handler claim it, then reject unclaimed
/// non-success statuses.
fn checked_envelope<H: ErrorHandler>(response: &RawResponse, handler: &H) -> Result<RawEnvelope> {
    let envelope = match RawEnvelope::from_slice(&response.body) {
        Ok(envelope) => envelope,
        Err(_) if !response.is_success() => RawEnvelope::default(),
        Err(e) => return Err(e),
    };

    if let Some(error) = handler.handle(response.status, &envelope) {
        tracing::debug!(status = response.status, %error, "response mapped to domain error");
        return Err(error.into());
    }

    if response.is_success() {
        return Ok(envelope);
    }

    if response.status == 429 {
        return Err(InfraError::RateLimited {
            retry_after_secs: response.retry_after_secs,
        });
    }

    let message = envelope
        .errors()
        .first()
        .map_or_else(|| format!("HTTP {}", response.status), ToString::to_string);
    Err(InfraError::ApiError {
        status: response.status,
        message,
    })
}
