//! Block storage volume model and trait implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::closed_enum;
use crate::error::{DomainError, Result};
use crate::handler::{not_found_handler, passthrough};
use crate::models::{resource_path, validate_id};
use crate::pagination::Page;
use crate::params::{FilterOp, RequestParams};
use crate::traits::{Create, Delete, Get, List, Update};
use crate::transport::Transport;
use crate::verbs;

const ENTITY: &str = "volume";
const PATH: &str = "volumes";

closed_enum! {
    /// Provisioning and attachment state of a volume.
    pub enum VolumeStatus: "status" {
        Creating => "creating",
        Available => "available",
        Attached => "attached",
        Resizing => "resizing",
        Error => "error",
    }
}

/// A block storage volume.
///
/// Volumes exist independently of instances and can be attached to at most
/// one instance at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    /// Size in gigabytes.
    pub size_gb: u32,
    pub status: VolumeStatus,
    /// Instance this volume is attached to.
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Volume {
    /// Whether the volume is attached to an instance.
    pub fn is_attached(&self) -> bool {
        self.instance_id.is_some()
    }
}

/// Parameters for creating a volume.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateVolumeParams {
    pub name: String,
    pub size_gb: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Attach to this instance once created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Parameters for updating a volume.
///
/// `size_gb` can only grow; the server rejects shrinking.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<u32>,
}

impl Get for Volume {
    type Id = String;

    #[tracing::instrument(skip(client))]
    fn get<C: Transport + ?Sized>(client: &C, id: String) -> Result<Self> {
        validate_id(ENTITY, &id)?;
        verbs::fetch(
            client,
            &resource_path(PATH, &id),
            &RequestParams::new(),
            not_found_handler(DomainError::not_found(ENTITY, id.clone())),
        )?
        .into_result()
    }
}

impl List for Volume {
    #[tracing::instrument(skip(client))]
    fn list_page<C: Transport + ?Sized>(client: &C, params: &RequestParams) -> Result<Page<Self>> {
        verbs::fetch_page(client, PATH, params, passthrough())?.into_result()
    }
}

impl Create for Volume {
    type Params = CreateVolumeParams;

    #[tracing::instrument(skip(client))]
    fn create<C: Transport + ?Sized>(client: &C, params: Self::Params) -> Result<Self> {
        verbs::create(client, PATH, &params, passthrough())?.into_result()
    }
}

impl Update for Volume {
    type Id = String;
    type Params = VolumeUpdateParams;

    #[tracing::instrument(skip(client))]
    fn update<C: Transport + ?Sized>(client: &C, id: String, params: Self::Params) -> Result<Self> {
        validate_id(ENTITY, &id)?;
        verbs::update(
            client,
            &resource_path(PATH, &id),
            &params,
            not_found_handler(DomainError::not_found(ENTITY, id.clone())),
        )?
        .into_result()
    }
}

impl Delete for Volume {
    type Id = String;

    #[tracing::instrument(skip(client))]
    fn delete<C: Transport + ?Sized>(client: &C, id: String) -> Result<()> {
        validate_id(ENTITY, &id)?;
        let errors = verbs::remove::<(), _, _>(
            client,
            &resource_path(PATH, &id),
            None,
            not_found_handler(DomainError::not_found(ENTITY, id.clone())),
        )?;
        verbs::Decoded { data: (), errors }.into_result()
    }
}

/// Fetch every volume attached to `instance_id`.
///
/// # Errors
///
/// Returns an error if any page request fails.
pub fn volumes_for_instance<C: Transport + ?Sized>(client: &C, instance_id: &str) -> Result<Vec<Volume>> {
    validate_id("instance", instance_id)?;
    let mut params = RequestParams::new();
    params.add_filter("instance_id", FilterOp::Eq, [instance_id]);
    Volume::list_all(client, &params)
}
