//! Delete trait for removing resources.

use crate::error::Result;
use crate::transport::Transport;

/// Delete a resource by ID.
pub trait Delete {
    /// The ID type for this resource.
    type Id;

    /// Delete the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found, the server refuses
    /// the deletion, or the request fails.
    fn delete<C: Transport + ?Sized>(client: &C, id: Self::Id) -> Result<()>;
}
