//! Network endpoint handlers.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{collection, error, invalid_field, not_found, single, ListQuery, SharedState};
use crate::{Network, NetworkStatus};

/// Body of `POST /networks`.
#[derive(Debug, Deserialize)]
pub struct CreateNetworkBody {
    pub name: String,
    pub cidr: String,
    pub region: Option<String>,
}

/// GET /networks/{id}
pub async fn get_network(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;

    match state.networks.get(&id) {
        Some(network) => single(StatusCode::OK, network),
        None => not_found("network", &id),
    }
}

/// GET /networks
pub async fn list_networks(State(state): State<SharedState>, RawQuery(raw): RawQuery) -> Response {
    let query = match ListQuery::parse(raw.as_deref()) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let state = state.read().await;
    collection(state.networks.values(), &query, state.fail_on_page)
}

/// POST /networks
pub async fn create_network(
    State(state): State<SharedState>,
    Json(body): Json<CreateNetworkBody>,
) -> Response {
    if !is_cidr(&body.cidr) {
        return invalid_field("cidr", format!("'{}' is not a CIDR block", body.cidr));
    }

    let mut state = state.write().await;

    if state.networks.values().any(|n| n.cidr == body.cidr) {
        return error(
            StatusCode::CONFLICT,
            "overlap",
            format!("{} overlaps an existing network", body.cidr),
        );
    }

    let id = state.allocate_id("net");
    let network = Network {
        id: id.clone(),
        name: body.name,
        cidr: body.cidr,
        status: NetworkStatus::Active,
        region: body.region,
        default: false,
        created_at: Some(Utc::now()),
    };
    state.networks.insert(id, network.clone());

    single(StatusCode::CREATED, &network)
}

/// DELETE /networks/{id}
///
/// Refused with 409 while any instance is attached.
pub async fn delete_network(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.write().await;

    if !state.networks.contains_key(&id) {
        return not_found("network", &id);
    }

    let attached = state.instances_on_network(&id).len();
    if attached > 0 {
        return error(
            StatusCode::CONFLICT,
            "in_use",
            format!("network has {attached} attached instances"),
        );
    }

    state.networks.remove(&id);
    StatusCode::NO_CONTENT.into_response()
}

fn is_cidr(raw: &str) -> bool {
    let Some((addr, prefix)) = raw.split_once('/') else {
        return false;
    };
    addr.parse::<std::net::Ipv4Addr>().is_ok() && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cidr() {
        assert!(is_cidr("10.0.0.0/16"));
        assert!(!is_cidr("10.0.0.0"));
        assert!(!is_cidr("10.0.0.0/33"));
        assert!(!is_cidr("backend/16"));
    }
}
