//! Error-mapping handlers.
//!
//! A handler looks at the HTTP status and the untyped envelope of a
//! response and either claims it with a [`DomainError`] or returns `None`
//! so that normal status checking and decoding proceed. The verb functions
//! run the handler before anything else looks at the response, and a
//! claimed error always wins over whatever the payload would have decoded
//! to.
//!
//! Domain errors are built at the call site, where the requested
//! identifier is known:
//!
//! ```
//! use infrapi::handler::{not_found_handler, ErrorHandler};
//! use infrapi::{DomainError, RawEnvelope};
//!
//! let handler = not_found_handler(DomainError::not_found("instance", "abc"));
//! let envelope = RawEnvelope::default();
//!
//! assert_eq!(
//!     handler.handle(404, &envelope),
//!     Some(DomainError::not_found("instance", "abc"))
//! );
//! assert_eq!(handler.handle(200, &envelope), None);
//! ```

use crate::envelope::RawEnvelope;
use crate::error::DomainError;

/// Maps a response to a typed domain error.
///
/// Implementations must depend only on the status and envelope they are
/// given. Any `Fn(u16, &RawEnvelope) -> Option<DomainError>` closure is a
/// handler.
pub trait ErrorHandler {
    /// Return `Some` to replace the response with a domain error.
    fn handle(&self, status: u16, envelope: &RawEnvelope) -> Option<DomainError>;
}

impl<F> ErrorHandler for F
where
    F: Fn(u16, &RawEnvelope) -> Option<DomainError>,
{
    fn handle(&self, status: u16, envelope: &RawEnvelope) -> Option<DomainError> {
        self(status, envelope)
    }
}

/// A handler that never claims a response.
pub fn passthrough() -> impl ErrorHandler {
    |_status: u16, _envelope: &RawEnvelope| -> Option<DomainError> { None }
}

/// A handler that returns `error` when the status equals `status`.
pub fn status_handler(status: u16, error: DomainError) -> impl ErrorHandler {
    move |actual: u16, _envelope: &RawEnvelope| (actual == status).then(|| error.clone())
}

/// A handler that returns `error` on 404.
pub fn not_found_handler(error: DomainError) -> impl ErrorHandler {
    status_handler(404, error)
}

/// A handler that returns a [`DomainError::Conflict`] on 409, using the
/// first server-reported message as the reason.
pub fn conflict_handler(entity_type: &'static str, id: impl Into<String>) -> impl ErrorHandler {
    let id = id.into();
    move |status: u16, envelope: &RawEnvelope| {
        (status == 409).then(|| {
            let reason = envelope
                .errors()
                .first()
                .map_or_else(|| "conflict".to_string(), |e| e.message.clone());
            DomainError::conflict(entity_type, id.clone(), reason)
        })
    }
}

/// Try `first`, then `second`.
pub fn either(first: impl ErrorHandler, second: impl ErrorHandler) -> impl ErrorHandler {
    move |status: u16, envelope: &RawEnvelope| {
        first
            .handle(status, envelope)
            .or_else(|| second.handle(status, envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(body: &str) -> RawEnvelope {
        RawEnvelope::from_slice(body.as_bytes()).unwrap()
    }

    #[test]
    fn test_not_found_handler_only_claims_404() {
        let handler = not_found_handler(DomainError::not_found("volume", "vol-9"));
        let env = envelope(r#"{"data": {"id": "vol-9"}}"#);

        assert_eq!(
            handler.handle(404, &env),
            Some(DomainError::not_found("volume", "vol-9"))
        );
        assert_eq!(handler.handle(200, &env), None);
        assert_eq!(handler.handle(500, &env), None);
    }

    #[test]
    fn test_handler_is_reusable() {
        let handler = not_found_handler(DomainError::not_found("network", "n-1"));
        let env = RawEnvelope::default();
        assert!(handler.handle(404, &env).is_some());
        assert!(handler.handle(404, &env).is_some());
    }

    #[test]
    fn test_passthrough_never_claims() {
        let handler = passthrough();
        assert_eq!(handler.handle(404, &RawEnvelope::default()), None);
    }

    #[test]
    fn test_conflict_handler_uses_server_message() {
        let handler = conflict_handler("network", "net-1");
        let env = envelope(r#"{"errors": [{"message": "network has attached instances"}]}"#);

        assert_eq!(
            handler.handle(409, &env),
            Some(DomainError::conflict(
                "network",
                "net-1",
                "network has attached instances"
            ))
        );
        assert_eq!(handler.handle(404, &env), None);
    }

    #[test]
    fn test_either_tries_in_order() {
        let handler = either(
            not_found_handler(DomainError::not_found("network", "net-1")),
            conflict_handler("network", "net-1"),
        );
        let env = RawEnvelope::default();

        assert!(matches!(
            handler.handle(404, &env),
            Some(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            handler.handle(409, &env),
            Some(DomainError::Conflict { .. })
        ));
        assert_eq!(handler.handle(204, &env), None);
    }
}
