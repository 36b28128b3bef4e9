//! Compute instance model and trait implementations.

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

const ENTITY: &str = "instance";
const PATH: &str = "instances";

closed_enum! {
    /// Lifecycle state of an instance.
    pub enum InstanceStatus: "status" {
        Provisioning => "provisioning",
        Running => "running",
        Stopped => "stopped",
        Rebooting => "rebooting",
        Error => "error",
        Deleting => "deleting",
    }
}

closed_enum! {
    /// Power and lifecycle actions accepted by `instances/{id}/actions`.
    pub enum InstanceAction: "action" {
        Start => "start",
        Stop => "stop",
        Reboot => "reboot",
        Rebuild => "rebuild",
    }
}

/// A compute instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Instance ID (e.g., "i-0a1b2c").
    pub id: String,

    /// Display name.
    pub name: String,

    /// Current lifecycle state.
    pub status: InstanceStatus,

    /// Size/flavor slug (e.g., "g2.small").
    pub flavor: String,

    /// Image the instance was booted from.
    #[serde(default)]
    pub image: Option<String>,

    /// Region slug.
    #[serde(default)]
    pub region: Option<String>,

    /// Assigned IP addresses.
    #[serde(default)]
    pub ip_addresses: Vec<String>,

    /// Attached network IDs.
    #[serde(default)]
    pub network_ids: Vec<String>,

    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// When the instance was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Instance {
    /// Whether the instance is running.
    pub fn is_running(&self) -> bool {
        self.status == InstanceStatus::Running
    }

    /// First assigned IP address, if any.
    pub fn primary_ip(&self) -> Option<&str> {
        self.ip_addresses.first().map(String::as_str)
    }

    /// Request a power or lifecycle action and return the instance as the
    /// server reports it afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid, the instance does not exist,
    /// or the request fails.
    #[tracing::instrument(skip(client))]
    pub fn perform_action<C: Transport + ?Sized>(
        client: &C,
        id: &str,
        action: InstanceAction,
    ) -> Result<Self> {
        validate_id(ENTITY, id)?;
        let path = format!("{}/actions", resource_path(PATH, id));
        let body = ActionRequest { action };
        verbs::create(
            client,
            &path,
            &body,
            not_found_handler(DomainError::not_found(ENTITY, id)),
        )?
        .into_result()
    }

    /// Volumes attached to this instance.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub fn volumes<C: Transport + ?Sized>(
        &self,
        client: &C,
    ) -> Result<Vec<crate::models::volume::Volume>> {
        crate::models::volume::volumes_for_instance(client, &self.id)
    }
}

/// Parameters for creating an instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateInstanceParams {
    pub name: String,
    pub flavor: String,
    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub network_ids: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Parameters for updating an instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstanceUpdateParams {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New flavor (resize).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,

    /// Replacement tag set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ActionRequest {
    action: InstanceAction,
}

impl Get for Instance {
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

impl List for Instance {
    #[tracing::instrument(skip(client))]
    fn list_page<C: Transport + ?Sized>(client: &C, params: &RequestParams) -> Result<Page<Self>> {
        verbs::fetch_page(client, PATH, params, passthrough())?.into_result()
    }
}

impl Create for Instance {
    type Params = CreateInstanceParams;

    #[tracing::instrument(skip(client))]
    fn create<C: Transport + ?Sized>(client: &C, params: Self::Params) -> Result<Self> {
        verbs::create(client, PATH, &params, passthrough())?.into_result()
    }
}

impl Update for Instance {
    type Id = String;
    type Params = InstanceUpdateParams;

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

impl Delete for Instance {
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

/// Fetch every running instance.
///
/// # Errors
///
/// Returns an error if any page request fails.
pub fn running_instances<C: Transport + ?Sized>(client: &C) -> Result<Vec<Instance>> {
    let mut params = RequestParams::new();
    params.add_filter("status", FilterOp::Eq, [InstanceStatus::Running.to_string()]);
    Instance::list_all(client, &params)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::enums::ClosedEnum;
    use crate::error::InfraError;
    use crate::verbs::tests::FakeTransport;

    fn instance_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("web-{id}"),
            "status": status,
            "flavor": "g2.small",
            "ip_addresses": ["10.0.0.4"],
            "created_at": "2026-03-01T08:00:00Z"
        })
    }

    #[test]
    fn test_instance_deserialize() {
        let instance: Instance = serde_json::from_value(instance_json("i-1", "running")).unwrap();

        assert_eq!(instance.id, "i-1");
        assert!(instance.is_running());
        assert_eq!(instance.primary_ip(), Some("10.0.0.4"));
        assert!(instance.tags.is_empty());
        assert!(instance.created_at.is_some());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = serde_json::from_value::<Instance>(instance_json("i-1", "hibernating")).unwrap_err();
        assert!(err.to_string().contains("unrecognized status value 'hibernating'"));
    }

    #[test]
    fn test_action_round_trip() {
        for action in InstanceAction::VARIANTS {
            assert_eq!(action.to_string().parse::<InstanceAction>().unwrap(), *action);
        }
        assert!("Reboot".parse::<InstanceAction>().is_err());
    }

    #[test]
    fn test_get_not_found() {
        let transport = FakeTransport::new().respond(404, json!({"errors": ["not found"]}));

        let err = Instance::get(&transport, "i-missing".to_string()).unwrap_err();

        assert!(matches!(
            err,
            InfraError::Domain(DomainError::NotFound { entity_type: "instance", ref id }) if id == "i-missing"
        ));
        assert_eq!(transport.sent.borrow()[0].path, "instances/i-missing");
    }

    #[test]
    fn test_invalid_id_sends_nothing() {
        let transport = FakeTransport::new();

        let err = Instance::get(&transport, String::new()).unwrap_err();

        assert!(matches!(err, InfraError::InvalidId { .. }));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn test_perform_action_posts_action() {
        let transport = FakeTransport::new().respond(202, json!({"data": instance_json("i-1", "rebooting")}));

        let instance = Instance::perform_action(&transport, "i-1", InstanceAction::Reboot).unwrap();

        assert_eq!(instance.status, InstanceStatus::Rebooting);
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].path, "instances/i-1/actions");
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"action":"reboot"}"#));
    }

    #[test]
    fn test_running_instances_walks_pages() {
        let page = |n: u32, ids: &[&str]| {
            json!({
                "data": ids.iter().map(|id| instance_json(id, "running")).collect::<Vec<_>>(),
                "meta": {"pagination": {"total": 3, "count": ids.len(), "per_page": 2, "current_page": n, "total_pages": 2}}
            })
        };
        let transport = FakeTransport::new()
            .respond(200, page(1, &["i-1", "i-2"]))
            .respond(200, page(2, &["i-3"]));

        let mut params = RequestParams::new();
        params.add_filter("status", FilterOp::Eq, ["running"]);
        let all = Instance::list_all(&transport, &params.with_page(1, 2)).unwrap();

        let ids: Vec<_> = all.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i-1", "i-2", "i-3"]);
        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].query, "filter[status][eq]=running&page=2&per_page=2");
    }

    #[test]
    fn test_delete_surfaces_server_errors() {
        let transport = FakeTransport::new().respond(200, json!({"errors": ["snapshot retained"]}));

        let err = Instance::delete(&transport, "i-1".to_string()).unwrap_err();

        assert!(matches!(err, InfraError::Server(_)));
    }

    #[test]
    fn test_dot_segment_ids_never_reach_transport() {
        let transport = FakeTransport::new().respond_raw(crate::transport::RawResponse::new(204, ""));

        for id in [".", ".."] {
            let err = Instance::delete(&transport, id.to_string()).unwrap_err();
            assert!(matches!(err, InfraError::InvalidId { entity_type: "instance", .. }));
        }

        assert!(transport.sent.borrow().is_empty());
    }
}
