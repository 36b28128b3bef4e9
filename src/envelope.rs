//! Response envelope decoding.
//!
//! Every API response is wrapped as
//!
//! ```json
//! {
//!   "data": { ... } | [ ... ],
//!   "meta": { "pagination": { "total": 25, "count": 10, "per_page": 10,
//!                             "current_page": 1, "total_pages": 3 } },
//!   "errors": [ ... ]
//! }
//! ```
//!
//! Single-resource responses carry an object under `data`, collection
//! responses an array plus `meta.pagination`. `errors` may be non-empty even
//! on a 2xx response, so decoding returns server errors alongside the
//! payload instead of in place of it.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InfraError, Result};

/// Pagination metadata reported by the server for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Total number of items across all pages.
    pub total: u64,
    /// Number of items on this page.
    #[serde(default)]
    pub count: u32,
    /// Page size.
    pub per_page: u32,
    /// Current page number (1-indexed).
    pub current_page: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl PaginationMeta {
    /// Build metadata for `page` of a collection of `total` items.
    ///
    /// `total_pages` is `ceil(total / per_page)`; a zero `per_page` yields
    /// zero pages.
    pub fn for_page(total: u64, current_page: u32, per_page: u32, count: u32) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        };
        Self {
            total,
            count,
            per_page,
            current_page,
            total_pages,
        }
    }

    /// Whether this metadata marks the final page.
    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

/// The `meta` section of an envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

/// One entry of the envelope's `errors` list.
///
/// The server sends either bare strings or objects with a message and
/// optional code / field; both decode into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireServerError")]
pub struct ServerError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ServerError {
    /// A server error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            field: None,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        if let Some(field) = &self.field {
            write!(f, "{field}: ")?;
        }
        f.write_str(&self.message)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireServerError {
    Message(String),
    Detailed {
        #[serde(default)]
        code: Option<String>,
        #[serde(alias = "detail", alias = "title")]
        message: String,
        #[serde(default)]
        field: Option<String>,
    },
}

impl From<WireServerError> for ServerError {
    fn from(wire: WireServerError) -> Self {
        match wire {
            WireServerError::Message(message) => Self::new(message),
            WireServerError::Detailed {
                code,
                message,
                field,
            } => Self {
                code,
                message,
                field,
            },
        }
    }
}

/// An envelope with its payload still untyped.
///
/// Error-mapping handlers inspect this before the payload is decoded into a
/// concrete type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    errors: Option<Vec<ServerError>>,
}

impl RawEnvelope {
    /// Parse an envelope from a response body. An empty body is an empty
    /// envelope.
    ///
    /// # Errors
    ///
    /// Returns [`InfraError::ParseError`] if the body is not a JSON object
    /// of the envelope's shape.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// The untyped payload, if any.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Pagination metadata, present on collection responses.
    pub fn pagination(&self) -> Option<&PaginationMeta> {
        self.meta.as_ref().and_then(|m| m.pagination.as_ref())
    }

    /// Server-reported errors.
    pub fn errors(&self) -> &[ServerError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Decode the payload as a single value.
    ///
    /// # Errors
    ///
    /// Fails with [`InfraError::Decode`] when `data` holds an array, with
    /// [`InfraError::ParseError`] when the object does not fit `T`, and
    /// with [`InfraError::Server`] when `data` is absent but the server
    /// reported errors.
    pub fn into_single<T: DeserializeOwned>(self) -> Result<(T, Vec<ServerError>)> {
        let errors = self.errors.unwrap_or_default();
        match self.data {
            Some(Value::Array(_)) => Err(InfraError::Decode(
                "expected a single object under `data`, found an array".to_string(),
            )),
            Some(value) => Ok((serde_json::from_value(value)?, errors)),
            None => Err(missing_data(errors)),
        }
    }

    /// Decode the payload as an ordered collection.
    ///
    /// # Errors
    ///
    /// Fails with [`InfraError::Decode`] when `data` is not an array, with
    /// [`InfraError::ParseError`] when an element does not fit `T`, and
    /// with [`InfraError::Server`] when `data` is absent but the server
    /// reported errors.
    pub fn into_collection<T: DeserializeOwned>(
        self,
    ) -> Result<(Vec<T>, Option<PaginationMeta>, Vec<ServerError>)> {
        let errors = self.errors.unwrap_or_default();
        let pagination = self.meta.and_then(|m| m.pagination);
        match self.data {
            Some(value @ Value::Array(_)) => {
                Ok((serde_json::from_value(value)?, pagination, errors))
            }
            Some(other) => Err(InfraError::Decode(format!(
                "expected an array under `data`, found {}",
                kind_of(&other)
            ))),
            None => Err(missing_data(errors)),
        }
    }
}

fn missing_data(errors: Vec<ServerError>) -> InfraError {
    if errors.is_empty() {
        InfraError::Decode("envelope has no `data`".to_string())
    } else {
        InfraError::Server(errors)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a single-resource response body.
///
/// # Errors
///
/// See [`RawEnvelope::from_slice`] and [`RawEnvelope::into_single`].
pub fn decode_single<T: DeserializeOwned>(body: &[u8]) -> Result<(T, Vec<ServerError>)> {
    RawEnvelope::from_slice(body)?.into_single()
}

/// Decode a collection response body.
///
/// # Errors
///
/// See [`RawEnvelope::from_slice`] and [`RawEnvelope::into_collection`].
pub fn decode_collection<T: DeserializeOwned>(
    body: &[u8],
) -> Result<(Vec<T>, Option<PaginationMeta>, Vec<ServerError>)> {
    RawEnvelope::from_slice(body)?.into_collection()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    #[test]
    fn test_decode_single() {
        let body = br#"{"data": {"id": "i-1"}}"#;
        let (thing, errors) = decode_single::<Thing>(body).unwrap();
        assert_eq!(thing.id, "i-1");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_server_errors_accompany_payload() {
        let body = br#"{"data": {"id": "i-1"}, "errors": ["disk degraded", {"code": "W12", "message": "slow", "field": "size"}]}"#;
        let (thing, errors) = decode_single::<Thing>(body).unwrap();
        assert_eq!(thing.id, "i-1");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], ServerError::new("disk degraded"));
        assert_eq!(errors[1].to_string(), "[W12] size: slow");
    }

    #[test]
    fn test_decode_collection_with_pagination() {
        let body = br#"{
            "data": [{"id": "a"}, {"id": "b"}],
            "meta": {"pagination": {"total": 12, "count": 2, "per_page": 2, "current_page": 1, "total_pages": 6}}
        }"#;
        let (items, meta, errors) = decode_collection::<Thing>(body).unwrap();
        assert_eq!(items, vec![Thing { id: "a".into() }, Thing { id: "b".into() }]);
        assert_eq!(meta.unwrap().total_pages, 6);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_a_decode_error() {
        let err = decode_single::<Thing>(br#"{"data": [{"id": "a"}]}"#).unwrap_err();
        assert!(matches!(err, InfraError::Decode(_)));

        let err = decode_collection::<Thing>(br#"{"data": {"id": "a"}}"#).unwrap_err();
        assert!(matches!(err, InfraError::Decode(ref m) if m.contains("an object")));
    }

    #[test]
    fn test_missing_data_with_errors_surfaces_server_errors() {
        let err = decode_single::<Thing>(br#"{"errors": ["quota exceeded"]}"#).unwrap_err();
        assert!(matches!(err, InfraError::Server(ref e) if e.len() == 1));

        let err = decode_single::<Thing>(br#"{"data": null}"#).unwrap_err();
        assert!(matches!(err, InfraError::Decode(_)));
    }

    #[test]
    fn test_malformed_body_is_a_parse_error() {
        let err = decode_single::<Thing>(b"<html>bad gateway</html>").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_empty_body_is_empty_envelope() {
        let envelope = RawEnvelope::from_slice(b"  \n").unwrap();
        assert!(envelope.data().is_none());
        assert!(envelope.errors().is_empty());
        assert!(envelope.pagination().is_none());
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(PaginationMeta::for_page(25, 1, 10, 10).total_pages, 3);
        assert_eq!(PaginationMeta::for_page(30, 1, 10, 10).total_pages, 3);
        assert_eq!(PaginationMeta::for_page(0, 1, 10, 0).total_pages, 0);
        assert_eq!(PaginationMeta::for_page(5, 1, 0, 0).total_pages, 0);
        assert!(PaginationMeta::for_page(25, 3, 10, 5).is_last_page());
        assert!(!PaginationMeta::for_page(25, 2, 10, 10).is_last_page());
    }
}
