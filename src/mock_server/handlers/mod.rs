//! HTTP request handlers for the mock server.
//!
//! Every response uses the API envelope: `{"data": ...}` for single
//! resources, `{"data": [...], "meta": {"pagination": ...}}` for
//! collections and `{"errors": [...]}` for failures.

pub mod instances;
pub mod load_balancers;
pub mod networks;
pub mod volumes;

pub use instances::*;
pub use load_balancers::*;
pub use networks::*;
pub use volumes::*;

use std::cmp::Ordering;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;
use crate::{FilterOp, PaginationMeta, SortDirection, DEFAULT_PAGE_SIZE};

pub(crate) type SharedState = Arc<RwLock<MockState>>;

/// `{"data": item}` with the given status.
pub(crate) fn single<T: Serialize>(status: StatusCode, item: &T) -> Response {
    (status, Json(json!({ "data": item }))).into_response()
}

/// `{"errors": [{"code", "message"}]}` with the given status.
pub(crate) fn error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let message = message.into();
    (
        status,
        Json(json!({ "errors": [{ "code": code, "message": message }] })),
    )
        .into_response()
}

pub(crate) fn not_found(entity_type: &str, id: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("No {entity_type} found with id: {id}"),
    )
}

/// Validation failure on a single request field.
pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Response {
    let message = message.into();
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": [{ "code": "invalid", "message": message, "field": field }] })),
    )
        .into_response()
}

/// Parsed collection query: `filter[field][op]=v1,v2`, `sort=a,-b`,
/// `page`, `per_page`.
#[derive(Debug, Default)]
pub(crate) struct ListQuery {
    filters: Vec<(String, FilterOp, Vec<String>)>,
    sorts: Vec<(String, SortDirection)>,
    page: u32,
    per_page: u32,
}

impl ListQuery {
    /// Parse a raw query string. Values are split on `,` before being
    /// percent-decoded, so encoded commas stay inside their value.
    pub(crate) fn parse(raw: Option<&str>) -> Result<Self, Response> {
        let mut query = Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
            ..Default::default()
        };

        for pair in raw.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key);

            if let Some(rest) = key.strip_prefix("filter[") {
                let Some((field, op)) = rest
                    .strip_suffix(']')
                    .and_then(|inner| inner.split_once("]["))
                else {
                    return Err(bad_request(format!("malformed filter key '{key}'")));
                };
                let op: FilterOp = op
                    .parse()
                    .map_err(|e: crate::UnrecognizedValue| bad_request(e.to_string()))?;
                let values = value.split(',').map(decode).collect();
                query.filters.push((field.to_string(), op, values));
                continue;
            }

            match key.as_str() {
                "sort" => {
                    for raw_key in value.split(',').map(decode).filter(|k| !k.is_empty()) {
                        query.sorts.push(match raw_key.strip_prefix('-') {
                            Some(field) => (field.to_string(), SortDirection::Desc),
                            None => (raw_key, SortDirection::Asc),
                        });
                    }
                }
                "page" => query.page = parse_positive("page", value)?,
                "per_page" => query.per_page = parse_positive("per_page", value)?,
                _ => {}
            }
        }

        Ok(query)
    }

    fn matches(&self, item: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, op, values)| filter_matches(item.get(field), *op, values))
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (field, direction) in &self.sorts {
            let ordering = compare_values(a.get(field), b.get(field));
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Filter, sort and paginate `items` into a collection envelope.
///
/// A request for `fail_on_page` gets a 500 instead.
pub(crate) fn collection<'a, T, I>(items: I, query: &ListQuery, fail_on_page: Option<u32>) -> Response
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if fail_on_page == Some(query.page) {
        return error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            format!("injected failure on page {}", query.page),
        );
    }

    let mut matching: Vec<Value> = items
        .into_iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .filter(|value| query.matches(value))
        .collect();

    if !query.sorts.is_empty() {
        matching.sort_by(|a, b| query.compare(a, b));
    }

    let total = matching.len() as u64;
    let start = ((query.page - 1) as usize).saturating_mul(query.per_page as usize);
    let data: Vec<Value> = matching
        .into_iter()
        .skip(start)
        .take(query.per_page as usize)
        .collect();

    let pagination = PaginationMeta::for_page(total, query.page, query.per_page, data.len() as u32);

    (
        StatusCode::OK,
        Json(json!({ "data": data, "meta": { "pagination": pagination } })),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    error(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn parse_positive(name: &str, raw: &str) -> Result<u32, Response> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(bad_request(format!("{name} must be a positive integer, got '{raw}'"))),
    }
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .unwrap_or(raw)
}

/// Scalar renderings of a field; arrays contribute each scalar element.
fn candidates(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Number(n)) => vec![n.to_string()],
        Some(Value::Bool(b)) => vec![b.to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(|item| candidates(Some(item)))
            .collect(),
        _ => vec![],
    }
}

fn filter_matches(value: Option<&Value>, op: FilterOp, values: &[String]) -> bool {
    let candidates = candidates(value);

    match op {
        FilterOp::Eq | FilterOp::In => any_pair(&candidates, values, |c, v| c == v),
        FilterOp::Ne => !any_pair(&candidates, values, |c, v| c == v),
        FilterOp::Like => any_pair(&candidates, values, |c, v| {
            c.to_lowercase()
                .contains(&v.trim_matches('%').to_lowercase())
        }),
        FilterOp::Gt => any_pair(&candidates, values, |c, v| compare_scalars(c, v).is_gt()),
        FilterOp::Gte => any_pair(&candidates, values, |c, v| compare_scalars(c, v).is_ge()),
        FilterOp::Lt => any_pair(&candidates, values, |c, v| compare_scalars(c, v).is_lt()),
        FilterOp::Lte => any_pair(&candidates, values, |c, v| compare_scalars(c, v).is_le()),
    }
}

fn any_pair(candidates: &[String], values: &[String], pred: impl Fn(&str, &str) -> bool) -> bool {
    candidates
        .iter()
        .any(|c| values.iter().any(|v| pred(c.as_str(), v.as_str())))
}

/// Numeric comparison when both sides are numbers, lexical otherwise
/// (which orders RFC 3339 timestamps correctly).
fn compare_scalars(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Missing and null sort before everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = candidates(a);
    let b = candidates(b);
    match (a.first(), b.first()) {
        (Some(x), Some(y)) => compare_scalars(x, y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
