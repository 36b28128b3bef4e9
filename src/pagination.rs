//! Pagination: pages, page sources and the walker that assembles them.

use std::marker::PhantomData;

use serde::Serialize;

use crate::envelope::PaginationMeta;
use crate::error::{InfraError, Result};
use crate::params::RequestParams;

/// Default page size when the caller did not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Hard ceiling on pages fetched by one walk (safety limit).
pub const MAX_PAGES: u32 = 1000;

/// Pages allowed beyond the first page's `total_pages`.
pub const PAGE_SLACK: u32 = 2;

/// A page of results from a collection endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page, in server order.
    pub items: Vec<T>,
    /// Server-reported pagination metadata, if any.
    pub pagination: Option<PaginationMeta>,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Whether another page should be requested.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a page from decoded items, the server's metadata and the
    /// pagination that was requested.
    ///
    /// Metadata wins over the requested values when present. A page is the
    /// last one when it is empty, shorter than `per_page`, or when metadata
    /// says `current_page >= total_pages`.
    #[must_use]
    pub fn new(
        items: Vec<T>,
        pagination: Option<PaginationMeta>,
        requested_page: u32,
        requested_per_page: u32,
    ) -> Self {
        let page = pagination.map_or(requested_page, |m| m.current_page);
        let per_page = pagination
            .map(|m| m.per_page)
            .filter(|&n| n > 0)
            .unwrap_or(requested_per_page);

        let has_more = !is_short(items.len(), per_page)
            && pagination.map_or(true, |m| !m.is_last_page());

        Self {
            items,
            pagination,
            page,
            per_page,
            has_more,
        }
    }

    /// Total number of items across all pages, if reported.
    pub fn total(&self) -> Option<u64> {
        self.pagination.map(|m| m.total)
    }

    /// Total number of pages, if reported.
    pub fn total_pages(&self) -> Option<u32> {
        self.pagination.map(|m| m.total_pages)
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
            page: self.page,
            per_page: self.per_page,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

fn is_short(len: usize, per_page: u32) -> bool {
    len == 0 || u32::try_from(len).map_or(false, |n| n < per_page)
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Something that can fetch one page of a collection.
///
/// The walker and [`PageHandle`] depend only on this; resources provide it
/// through [`List`](crate::List).
pub trait PageSource {
    /// Item type of the collection.
    type Item;

    /// Fetch the page described by `params`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying request produced.
    fn fetch_page(&self, params: &RequestParams) -> Result<Page<Self::Item>>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    type Item = S::Item;

    fn fetch_page(&self, params: &RequestParams) -> Result<Page<Self::Item>> {
        (**self).fetch_page(params)
    }
}

/// A [`PageSource`] backed by a closure. See [`from_fn`].
pub struct FnSource<F, T> {
    fetch: F,
    _item: PhantomData<fn() -> T>,
}

impl<F, T> PageSource for FnSource<F, T>
where
    F: Fn(&RequestParams) -> Result<Page<T>>,
{
    type Item = T;

    fn fetch_page(&self, params: &RequestParams) -> Result<Page<T>> {
        (self.fetch)(params)
    }
}

/// Wrap a closure as a [`PageSource`].
pub fn from_fn<F, T>(fetch: F) -> FnSource<F, T>
where
    F: Fn(&RequestParams) -> Result<Page<T>>,
{
    FnSource {
        fetch,
        _item: PhantomData,
    }
}

/// One fetched page plus the ability to fetch the one after it.
///
/// Holds no network resource, only the source and the parameters that
/// produced this page. Sources are usually borrowed (`&S`) or are cheap
/// adapters such as [`ListSource`](crate::ListSource).
pub struct PageHandle<S: PageSource> {
    source: S,
    params: RequestParams,
    page: Page<S::Item>,
}

impl<S: PageSource> PageHandle<S> {
    /// Fetch the page `base` asks for (page 1 and [`DEFAULT_PAGE_SIZE`]
    /// when unset).
    ///
    /// # Errors
    ///
    /// Returns an error if the page request fails.
    pub fn first(source: S, base: &RequestParams) -> Result<Self> {
        let params = base.with_page(
            base.page().unwrap_or(1),
            base.per_page().unwrap_or(DEFAULT_PAGE_SIZE),
        );
        let page = source.fetch_page(&params)?;
        Ok(Self {
            source,
            params,
            page,
        })
    }

    /// The page this handle holds.
    pub fn page(&self) -> &Page<S::Item> {
        &self.page
    }

    /// Take the page, dropping the fetch capability.
    pub fn into_page(self) -> Page<S::Item> {
        self.page
    }

    /// Whether a following page exists.
    pub fn has_next(&self) -> bool {
        self.page.has_more
    }
}

impl<S: PageSource + Clone> PageHandle<S> {
    /// Fetch the following page with the same base parameters.
    ///
    /// Returns `Ok(None)` after the last page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page request fails.
    pub fn next_page(&self) -> Result<Option<Self>> {
        if !self.has_next() {
            return Ok(None);
        }
        let current = self.params.page().unwrap_or(1);
        let per_page = self.params.per_page().unwrap_or(DEFAULT_PAGE_SIZE);
        let params = self.params.with_page(current.saturating_add(1), per_page);
        let page = self.source.fetch_page(&params)?;
        Ok(Some(Self {
            source: self.source.clone(),
            params,
            page,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Fetching { page: u32 },
    Done,
}

/// Fetches every page of a collection, strictly in sequence.
///
/// Starts at page 1 and keeps going until a page is the last one (see
/// [`Page::new`]). Items are appended in the order received. Any failed
/// fetch ends the walk with that error and the pages collected so far are
/// dropped. The number of fetches is bounded by the largest `total_pages`
/// seen so far plus [`PAGE_SLACK`], and never exceeds [`MAX_PAGES`].
pub struct Walker<'s, S: PageSource + ?Sized> {
    source: &'s S,
    base: RequestParams,
    per_page: u32,
    state: WalkState,
    fetched: u32,
    limit: u32,
    items: Vec<S::Item>,
}

impl<'s, S: PageSource + ?Sized> Walker<'s, S> {
    /// Seed a walk with `base` at page 1.
    pub fn new(source: &'s S, base: &RequestParams) -> Self {
        Self {
            source,
            base: base.clone(),
            per_page: base.per_page().unwrap_or(DEFAULT_PAGE_SIZE),
            state: WalkState::Fetching { page: 1 },
            fetched: 0,
            limit: MAX_PAGES,
            items: Vec::new(),
        }
    }

    /// Whether the walk has finished.
    pub fn is_done(&self) -> bool {
        self.state == WalkState::Done
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.fetched
    }

    /// Fetch one page and advance. Returns `true` once the walk is done.
    ///
    /// # Errors
    ///
    /// Returns the page's fetch error, or [`InfraError::PaginationLimit`]
    /// when the guard is reached while pages still report more data.
    pub fn step(&mut self) -> Result<bool> {
        let WalkState::Fetching { page } = self.state else {
            return Ok(true);
        };

        if self.fetched >= self.limit {
            tracing::warn!(
                pages = self.fetched,
                limit = self.limit,
                "pagination guard reached, server keeps reporting more pages"
            );
            return Err(InfraError::PaginationLimit {
                pages: self.fetched,
            });
        }

        let params = self.base.with_page(page, self.per_page);
        let result = self.source.fetch_page(&params)?;
        self.fetched += 1;

        // The collection may grow mid-walk; the limit only ever rises.
        if let Some(meta) = result.pagination {
            let reported = meta.total_pages.saturating_add(PAGE_SLACK).clamp(1, MAX_PAGES);
            if self.fetched == 1 || reported > self.limit {
                self.limit = reported;
            }
        }

        if let Some(meta) = result.pagination {
            if !result.has_more && !meta.is_last_page() {
                tracing::warn!(
                    page,
                    total_pages = meta.total_pages,
                    items = result.len(),
                    "short page before reported last page, stopping"
                );
            }
        }

        tracing::debug!(page, items = result.len(), has_more = result.has_more, "fetched page");

        let has_more = result.has_more;
        self.items.extend(result.items);

        self.state = if has_more {
            WalkState::Fetching {
                page: page.saturating_add(1),
            }
        } else {
            WalkState::Done
        };

        Ok(self.is_done())
    }

    /// Drive the walk to completion and return every item.
    ///
    /// # Errors
    ///
    /// See [`step`](Self::step).
    pub fn run(mut self) -> Result<Vec<S::Item>> {
        while !self.step()? {}
        Ok(self.items)
    }
}

/// Fetch every page from `source` and concatenate the items in order.
///
/// # Errors
///
/// Returns the first error encountered; partial results are discarded.
pub fn collect_all<S: PageSource + ?Sized>(source: &S, base: &RequestParams) -> Result<Vec<S::Item>> {
    Walker::new(source, base).run()
}
