//! Volume endpoint handlers.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{collection, error, invalid_field, not_found, single, ListQuery, SharedState};
use crate::{Volume, VolumeStatus};

/// Body of `POST /volumes`.
#[derive(Debug, Deserialize)]
pub struct CreateVolumeBody {
    pub name: String,
    pub size_gb: u32,
    pub region: Option<String>,
    pub instance_id: Option<String>,
}

/// Body of `PATCH /volumes/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateVolumeBody {
    pub name: Option<String>,
    pub size_gb: Option<u32>,
}

/// GET /volumes/{id}
pub async fn get_volume(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;

    match state.volumes.get(&id) {
        Some(volume) => single(StatusCode::OK, volume),
        None => not_found("volume", &id),
    }
}

/// GET /volumes
pub async fn list_volumes(State(state): State<SharedState>, RawQuery(raw): RawQuery) -> Response {
    let query = match ListQuery::parse(raw.as_deref()) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let state = state.read().await;
    collection(state.volumes.values(), &query, state.fail_on_page)
}

/// POST /volumes
pub async fn create_volume(
    State(state): State<SharedState>,
    Json(body): Json<CreateVolumeBody>,
) -> Response {
    if body.size_gb == 0 {
        return invalid_field("size_gb", "size_gb must be at least 1");
    }

    let mut state = state.write().await;

    if let Some(ref instance_id) = body.instance_id {
        if !state.instances.contains_key(instance_id) {
            return invalid_field("instance_id", format!("unknown instance '{instance_id}'"));
        }
    }

    let id = state.allocate_id("vol");
    let volume = Volume {
        id: id.clone(),
        name: body.name,
        size_gb: body.size_gb,
        status: if body.instance_id.is_some() {
            VolumeStatus::Attached
        } else {
            VolumeStatus::Available
        },
        instance_id: body.instance_id,
        region: body.region,
        created_at: Some(Utc::now()),
    };
    state.volumes.insert(id, volume.clone());

    single(StatusCode::CREATED, &volume)
}

/// PATCH /volumes/{id}
pub async fn update_volume(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateVolumeBody>,
) -> Response {
    let mut state = state.write().await;

    let Some(volume) = state.volumes.get_mut(&id) else {
        return not_found("volume", &id);
    };

    if let Some(size_gb) = body.size_gb {
        if size_gb < volume.size_gb {
            return invalid_field(
                "size_gb",
                format!("cannot shrink volume from {} to {size_gb} GB", volume.size_gb),
            );
        }
        volume.size_gb = size_gb;
    }
    if let Some(name) = body.name {
        volume.name = name;
    }

    single(StatusCode::OK, volume)
}

/// DELETE /volumes/{id}
///
/// Attached volumes must be detached first.
pub async fn delete_volume(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.write().await;

    let attached = match state.volumes.get(&id) {
        Some(volume) => volume.instance_id.is_some(),
        None => return not_found("volume", &id),
    };
    if attached {
        return error(
            StatusCode::CONFLICT,
            "attached",
            "volume is attached to an instance",
        );
    }

    state.volumes.remove(&id);
    StatusCode::NO_CONTENT.into_response()
}
