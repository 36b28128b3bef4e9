//! Instance endpoint handlers.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{collection, error, invalid_field, not_found, single, ListQuery, SharedState};
use crate::{Instance, InstanceAction, InstanceStatus};

/// Body of `POST /instances`.
#[derive(Debug, Deserialize)]
pub struct CreateInstanceBody {
    pub name: String,
    pub flavor: String,
    pub image: String,
    pub region: Option<String>,
    #[serde(default)]
    pub network_ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PATCH /instances/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateInstanceBody {
    pub name: Option<String>,
    pub flavor: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of `POST /instances/{id}/actions`.
#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub action: InstanceAction,
}

/// GET /instances/{id}
pub async fn get_instance(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;

    match state.instances.get(&id) {
        Some(instance) => single(StatusCode::OK, instance),
        None => not_found("instance", &id),
    }
}

/// GET /instances
pub async fn list_instances(State(state): State<SharedState>, RawQuery(raw): RawQuery) -> Response {
    let query = match ListQuery::parse(raw.as_deref()) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let state = state.read().await;
    collection(state.instances.values(), &query, state.fail_on_page)
}

/// POST /instances
///
/// Provisioning completes immediately: new instances come back running.
pub async fn create_instance(
    State(state): State<SharedState>,
    Json(body): Json<CreateInstanceBody>,
) -> Response {
    if body.name.trim().is_empty() {
        return invalid_field("name", "name must not be empty");
    }

    let mut state = state.write().await;

    if let Some(missing) = body
        .network_ids
        .iter()
        .find(|n| !state.networks.contains_key(*n))
    {
        return invalid_field("network_ids", format!("unknown network '{missing}'"));
    }

    let id = state.allocate_id("i");
    let ordinal = state.instances.len() + 100;
    let instance = Instance {
        id: id.clone(),
        name: body.name,
        status: InstanceStatus::Running,
        flavor: body.flavor,
        image: Some(body.image),
        region: body.region,
        ip_addresses: vec![format!("10.0.{}.{}", ordinal / 250, ordinal % 250 + 2)],
        network_ids: body.network_ids,
        tags: body.tags,
        created_at: Some(Utc::now()),
    };
    state.instances.insert(id, instance.clone());

    single(StatusCode::CREATED, &instance)
}

/// PATCH /instances/{id}
pub async fn update_instance(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateInstanceBody>,
) -> Response {
    let mut state = state.write().await;

    let Some(instance) = state.instances.get_mut(&id) else {
        return not_found("instance", &id);
    };
    if let Some(name) = body.name {
        instance.name = name;
    }
    if let Some(flavor) = body.flavor {
        instance.flavor = flavor;
    }
    if let Some(tags) = body.tags {
        instance.tags = tags;
    }

    single(StatusCode::OK, instance)
}

/// DELETE /instances/{id}
pub async fn delete_instance(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.write().await;

    match state.remove_instance(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found("instance", &id),
    }
}

/// POST /instances/{id}/actions
///
/// Transitions apply immediately. Starting a running instance or stopping
/// a stopped one is a conflict.
pub async fn instance_action(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<ActionBody>,
) -> Response {
    let mut state = state.write().await;

    let Some(instance) = state.instances.get_mut(&id) else {
        return not_found("instance", &id);
    };

    let next = match (body.action, instance.status) {
        (InstanceAction::Start, InstanceStatus::Running) => {
            return error(StatusCode::CONFLICT, "invalid_state", "instance is already running")
        }
        (InstanceAction::Stop, InstanceStatus::Stopped) => {
            return error(StatusCode::CONFLICT, "invalid_state", "instance is already stopped")
        }
        (InstanceAction::Stop, _) => InstanceStatus::Stopped,
        (InstanceAction::Start | InstanceAction::Reboot | InstanceAction::Rebuild, _) => {
            InstanceStatus::Running
        }
    };
    instance.status = next;

    single(StatusCode::ACCEPTED, instance)
}
