//! Resource model types.

mod instance;
mod load_balancer;
mod network;
mod volume;

pub use instance::*;
pub use load_balancer::*;
pub use network::*;
pub use volume::*;

use crate::error::{InfraError, Result};

/// Reject identifiers that cannot name a resource, without a round trip.
///
/// Empty, whitespace-only, `/`-containing and dot-segment ids are refused.
pub(crate) fn validate_id(entity_type: &'static str, id: &str) -> Result<()> {
    // "." and ".." would be resolved as path segments by URL joining.
    if id.trim().is_empty() || id.contains('/') || id == "." || id == ".." {
        return Err(InfraError::InvalidId {
            entity_type,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// `collection/{id}` with the id percent-encoded.
pub(crate) fn resource_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("instance", "i-123").is_ok());
        assert!(matches!(
            validate_id("instance", ""),
            Err(InfraError::InvalidId { entity_type: "instance", .. })
        ));
        assert!(validate_id("instance", "   ").is_err());
        assert!(validate_id("instance", "a/b").is_err());
        assert!(validate_id("instance", ".").is_err());
        assert!(validate_id("instance", "..").is_err());
        assert!(validate_id("instance", "v1.2").is_ok());
    }

    #[test]
    fn test_resource_path_encodes_id() {
        assert_eq!(resource_path("volumes", "vol 1"), "volumes/vol%201");
    }
}
