//! Error types for infrastructure API operations.

use thiserror::Error;

use crate::enums::UnrecognizedValue;
use crate::envelope::ServerError;

/// Resource-aware errors synthesized from an HTTP status by an
/// [`ErrorHandler`](crate::handler::ErrorHandler).
///
/// These are built at the call site (closing over the identifier that was
/// requested) and handed to a handler factory such as
/// [`not_found_handler`](crate::handler::not_found_handler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The requested resource does not exist.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The resource exists but is in a state that rejects the operation.
    #[error("{entity_type} '{id}' conflict: {reason}")]
    Conflict {
        entity_type: &'static str,
        id: String,
        reason: String,
    },
}

impl DomainError {
    /// Shorthand for a [`DomainError::NotFound`].
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Shorthand for a [`DomainError::Conflict`].
    pub fn conflict(
        entity_type: &'static str,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            entity_type,
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during infrastructure API operations.
#[derive(Debug, Error)]
pub enum InfraError {
    /// Configuration is missing or incomplete.
    #[error("configuration required: {0}")]
    ConfigMissing(String),

    /// Identifier rejected locally, before any request was sent.
    #[error("invalid {entity_type} id '{id}'")]
    InvalidId {
        entity_type: &'static str,
        id: String,
    },

    /// A caller-supplied argument was rejected locally.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A closed-set string field held a value outside its set.
    #[error(transparent)]
    UnrecognizedValue(#[from] UnrecognizedValue),

    /// Typed error produced by an error-mapping handler.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The server reported errors inside the response envelope.
    #[error("server reported {} error(s): {}", .0.len(), join_messages(.0))]
    Server(Vec<ServerError>),

    /// Non-success status that no handler claimed.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Rate limited.
    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Response body did not have the expected envelope shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// JSON parsing error.
    #[error("failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Transport failure reported by a non-reqwest transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// The pagination walker hit its iteration guard with pages remaining.
    #[error("pagination stopped after {pages} pages with more still reported")]
    PaginationLimit { pages: u32 },
}

impl InfraError {
    /// Whether this is a [`DomainError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotFound { .. }))
    }

    /// Whether the response could not be decoded into the expected shape.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::ParseError(_))
    }

    /// HTTP status associated with this error, when there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn join_messages(errors: &[ServerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for infrastructure API operations.
pub type Result<T> = core::result::Result<T, InfraError>;
