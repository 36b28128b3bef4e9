//! Load balancer endpoint handlers.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{collection, invalid_field, not_found, single, ListQuery, SharedState};
use crate::{BalancingAlgorithm, LoadBalancer, LoadBalancerStatus};

/// Body of `POST /load_balancers`.
#[derive(Debug, Deserialize)]
pub struct CreateLoadBalancerBody {
    pub name: String,
    pub algorithm: BalancingAlgorithm,
    #[serde(default)]
    pub backend_instance_ids: Vec<String>,
    pub region: Option<String>,
}

/// GET /load_balancers/{id}
pub async fn get_load_balancer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;

    match state.load_balancers.get(&id) {
        Some(lb) => single(StatusCode::OK, lb),
        None => not_found("load balancer", &id),
    }
}

/// GET /load_balancers
pub async fn list_load_balancers(
    State(state): State<SharedState>,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = match ListQuery::parse(raw.as_deref()) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let state = state.read().await;
    collection(state.load_balancers.values(), &query, state.fail_on_page)
}

/// POST /load_balancers
///
/// A balancer without backends starts out pending.
pub async fn create_load_balancer(
    State(state): State<SharedState>,
    Json(body): Json<CreateLoadBalancerBody>,
) -> Response {
    let mut state = state.write().await;

    if let Some(missing) = body
        .backend_instance_ids
        .iter()
        .find(|id| !state.instances.contains_key(*id))
    {
        return invalid_field(
            "backend_instance_ids",
            format!("unknown instance '{missing}'"),
        );
    }

    let id = state.allocate_id("lb");
    let ordinal = state.load_balancers.len() + 20;
    let load_balancer = LoadBalancer {
        id: id.clone(),
        name: body.name,
        status: if body.backend_instance_ids.is_empty() {
            LoadBalancerStatus::Pending
        } else {
            LoadBalancerStatus::Active
        },
        algorithm: body.algorithm,
        public_ip: Some(format!("203.0.113.{}", ordinal % 250)),
        backend_instance_ids: body.backend_instance_ids,
        region: body.region,
        created_at: Some(Utc::now()),
    };
    state.load_balancers.insert(id, load_balancer.clone());

    single(StatusCode::CREATED, &load_balancer)
}

/// DELETE /load_balancers/{id}
pub async fn delete_load_balancer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;

    match state.load_balancers.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found("load balancer", &id),
    }
}
