//! List trait for fetching collections of resources.

use std::marker::PhantomData;

use crate::error::Result;
use crate::pagination::{collect_all, Page, PageHandle, PageSource};
use crate::params::RequestParams;
use crate::transport::Transport;

/// List/filter resources with pagination support.
///
/// Implement [`list_page`](Self::list_page) for resource types that can be
/// listed; `list_all` and `pages` come for free on top of the pagination
/// walker.
///
/// # Example
///
/// ```ignore
/// use infrapi::{FilterOp, InfraClient, Instance, List, RequestParams};
///
/// let client = InfraClient::from_env()?;
///
/// // Fetch a single page
/// let page = Instance::list_page(&client, &RequestParams::new().with_page(1, 50))?;
///
/// // Fetch all pages
/// let mut params = RequestParams::new();
/// params.add_filter("status", FilterOp::Eq, ["running"]);
/// let running = Instance::list_all(&client, &params)?;
/// ```
pub trait List: Sized {
    /// List resources matching `params` (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - Any [`Transport`]
    /// * `params` - Filters, sort keys and pagination
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn list_page<C: Transport + ?Sized>(client: &C, params: &RequestParams) -> Result<Page<Self>>;

    /// List all resources matching `params` (fetches all pages).
    ///
    /// Pagination in `params` is ignored apart from the page size; the walk
    /// always starts at page 1.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails; no partial result is
    /// returned.
    fn list_all<C: Transport + ?Sized>(client: &C, params: &RequestParams) -> Result<Vec<Self>> {
        collect_all(&ListSource::<Self, C>::new(client), params)
    }

    /// Fetch the first page and keep the ability to fetch the next ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the first page request fails.
    fn pages<'c, C: Transport + ?Sized>(
        client: &'c C,
        params: &RequestParams,
    ) -> Result<PageHandle<ListSource<'c, Self, C>>> {
        PageHandle::first(ListSource::new(client), params)
    }
}

/// Binds a [`List`] resource type to a transport, as a [`PageSource`].
pub struct ListSource<'c, R, C: ?Sized> {
    client: &'c C,
    _resource: PhantomData<fn() -> R>,
}

impl<'c, R, C: ?Sized> ListSource<'c, R, C> {
    /// Bind `R` to `client`.
    pub fn new(client: &'c C) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }
}

impl<R, C: ?Sized> Clone for ListSource<'_, R, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, C: ?Sized> Copy for ListSource<'_, R, C> {}

impl<R: List, C: Transport + ?Sized> PageSource for ListSource<'_, R, C> {
    type Item = R;

    fn fetch_page(&self, params: &RequestParams) -> Result<Page<R>> {
        R::list_page(self.client, params)
    }
}
