//! Create trait for provisioning resources.

use crate::error::Result;
use crate::transport::Transport;

/// Create a new resource.
pub trait Create: Sized {
    /// Request body for the new resource.
    type Params;

    /// Create the resource and return it as the server reports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server reports errors.
    fn create<C: Transport + ?Sized>(client: &C, params: Self::Params) -> Result<Self>;
}
