//! Load balancer model and trait implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::closed_enum;
use crate::error::{DomainError, Result};
use crate::handler::{not_found_handler, passthrough};
use crate::models::{resource_path, validate_id};
use crate::pagination::Page;
use crate::params::RequestParams;
use crate::traits::{Create, Delete, Get, List};
use crate::transport::Transport;
use crate::verbs;

const ENTITY: &str = "load balancer";
const PATH: &str = "load_balancers";

closed_enum! {
    /// Health of a load balancer.
    pub enum LoadBalancerStatus: "status" {
        Pending => "pending",
        Active => "active",
        Degraded => "degraded",
        Error => "error",
    }
}

closed_enum! {
    /// How traffic is spread across backends.
    pub enum BalancingAlgorithm: "algorithm" {
        RoundRobin => "round_robin",
        LeastConnections => "least_connections",
        SourceIp => "source_ip",
    }
}

/// A layer-4 load balancer in front of a set of instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
    pub status: LoadBalancerStatus,
    pub algorithm: BalancingAlgorithm,
    #[serde(default)]
    pub public_ip: Option<String>,
    /// Instances receiving traffic.
    #[serde(default)]
    pub backend_instance_ids: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a load balancer.
#[derive(Debug, Clone, Serialize)]
pub struct CreateLoadBalancerParams {
    pub name: String,
    pub algorithm: BalancingAlgorithm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub backend_instance_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Get for LoadBalancer {
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

impl List for LoadBalancer {
    #[tracing::instrument(skip(client))]
    fn list_page<C: Transport + ?Sized>(client: &C, params: &RequestParams) -> Result<Page<Self>> {
        verbs::fetch_page(client, PATH, params, passthrough())?.into_result()
    }
}

impl Create for LoadBalancer {
    type Params = CreateLoadBalancerParams;

    #[tracing::instrument(skip(client))]
    fn create<C: Transport + ?Sized>(client: &C, params: Self::Params) -> Result<Self> {
        verbs::create(client, PATH, &params, passthrough())?.into_result()
    }
}

impl Delete for LoadBalancer {
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
