//! Filtering, sorting and pagination parameters for list requests.

use std::fmt::Write as _;

use crate::closed_enum;

closed_enum! {
    /// Comparison applied by a filter clause.
    pub enum FilterOp: "operator" {
        Eq => "eq",
        Ne => "ne",
        Gt => "gt",
        Gte => "gte",
        Lt => "lt",
        Lte => "lte",
        In => "in",
        Like => "like",
    }
}

closed_enum! {
    /// Sort order for a sort clause.
    pub enum SortDirection: "direction" {
        Asc => "asc",
        Desc => "desc",
    }
}

/// A single filter clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub values: Vec<String>,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Outgoing request parameters: filter clauses, sort keys and pagination.
///
/// Clauses keep the order they were added in, so rendering is
/// deterministic and the same value always produces the same request. A
/// base set can seed any number of page fetches through
/// [`with_page`](Self::with_page), which never touches the original.
///
/// # Example
///
/// ```
/// use infrapi::{FilterOp, RequestParams, SortDirection};
///
/// let mut params = RequestParams::new();
/// params
///     .add_filter("status", FilterOp::In, ["running", "stopped"])
///     .add_sort("name", SortDirection::Asc);
///
/// let second = params.with_page(2, 20);
/// assert_eq!(
///     second.to_query_string(),
///     "filter[status][in]=running,stopped&sort=name&page=2&per_page=20"
/// );
/// assert_eq!(params.page(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    filters: Vec<Filter>,
    sorts: Vec<Sort>,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl RequestParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter clause.
    ///
    /// Repeated calls for the same field accumulate; nothing is
    /// overwritten. Field names are not validated locally.
    pub fn add_filter<I, V>(&mut self, field: impl Into<String>, op: FilterOp, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.filters.push(Filter {
            field: field.into(),
            op,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Append a sort key after any existing ones.
    pub fn add_sort(&mut self, field: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.sorts.push(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    /// Set pagination in place.
    pub fn set_page(&mut self, page: u32, per_page: u32) -> &mut Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    /// Derive a copy with pagination overridden.
    #[must_use]
    pub fn with_page(&self, page: u32, per_page: u32) -> Self {
        let mut derived = self.clone();
        derived.set_page(page, per_page);
        derived
    }

    /// Requested page number, if set.
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Requested page size, if set.
    pub fn per_page(&self) -> Option<u32> {
        self.per_page
    }

    /// Filter clauses in insertion order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Sort keys in insertion order.
    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Returns true if no clause or pagination control is set.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sorts.is_empty() && self.page.is_none() && self.per_page.is_none()
    }

    /// Render as a query string, without the leading `?`.
    ///
    /// Filters come first as `filter[field][op]=v1,v2`, then a single
    /// `sort=a,-b` pair, then `page` and `per_page`.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::with_capacity(self.filters.len() + 3);

        for filter in &self.filters {
            let values = filter
                .values
                .iter()
                .map(|v| urlencoding::encode(v))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(format!(
                "filter[{}][{}]={}",
                urlencoding::encode(&filter.field),
                filter.op,
                values
            ));
        }

        if !self.sorts.is_empty() {
            let keys = self
                .sorts
                .iter()
                .map(|s| match s.direction {
                    SortDirection::Asc => urlencoding::encode(&s.field).into_owned(),
                    SortDirection::Desc => format!("-{}", urlencoding::encode(&s.field)),
                })
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(format!("sort={keys}"));
        }

        let mut query = pairs.join("&");
        for (key, value) in [("page", self.page), ("per_page", self.per_page)] {
            if let Some(value) = value {
                if !query.is_empty() {
                    query.push('&');
                }
                let _ = write!(query, "{key}={value}");
            }
        }
        query
    }
}
