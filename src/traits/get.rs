//! Get trait for fetching single resources.

use crate::error::Result;
use crate::transport::Transport;

/// Fetch a single resource by ID.
///
/// Implement this trait for resource types that can be fetched individually
/// by a unique identifier.
///
/// # Example
///
/// ```ignore
/// use infrapi::{InfraClient, Instance, Get};
///
/// let client = InfraClient::from_env()?;
/// let instance = Instance::get(&client, "i-0a1b2c".to_string())?;
/// ```
pub trait Get: Sized {
    /// The ID type for this resource.
    type Id;

    /// Fetch the resource by ID.
    ///
    /// # Arguments
    ///
    /// * `client` - Any [`Transport`], usually an [`InfraClient`](crate::InfraClient)
    /// * `id` - The resource identifier
    ///
    /// # Errors
    ///
    /// Returns [`InfraError::InvalidId`](crate::InfraError::InvalidId) before
    /// any request for a malformed ID, a not-found domain error on 404, or
    /// the request's own error.
    fn get<C: Transport + ?Sized>(client: &C, id: Self::Id) -> Result<Self>;
}
