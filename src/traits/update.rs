//! Update trait for modifying resources.

use crate::error::Result;
use crate::transport::Transport;

/// Update an existing resource.
///
/// Implement this trait for resource types that can be modified
/// after creation.
///
/// # Example
///
/// ```ignore
/// use infrapi::{InfraClient, Instance, Update, InstanceUpdateParams};
///
/// let client = InfraClient::from_env()?;
/// let updated = Instance::update(
///     &client,
///     "i-0a1b2c".to_string(),
///     InstanceUpdateParams {
///         name: Some("web-2".to_string()),
///         ..Default::default()
///     },
/// )?;
/// ```
pub trait Update: Sized {
    /// The ID type for this resource.
    type Id;

    /// Parameters for the update.
    type Params;

    /// Update the resource and return the updated version.
    ///
    /// # Arguments
    ///
    /// * `client` - Any [`Transport`]
    /// * `id` - The resource identifier
    /// * `params` - Update parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    fn update<C: Transport + ?Sized>(client: &C, id: Self::Id, params: Self::Params) -> Result<Self>;
}
