//! Private network model and trait implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::closed_enum;
use crate::error::{DomainError, Result};
use crate::handler::{conflict_handler, either, not_found_handler, passthrough};
use crate::models::{resource_path, validate_id};
use crate::pagination::Page;
use crate::params::RequestParams;
use crate::traits::{Create, Delete, Get, List};
use crate::transport::Transport;
use crate::verbs;

const ENTITY: &str = "network";
const PATH: &str = "networks";

closed_enum! {
    /// Provisioning state of a network.
    pub enum NetworkStatus: "status" {
        Pending => "pending",
        Active => "active",
        Error => "error",
    }
}

/// A private network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    /// Address range in CIDR notation (e.g., "10.20.0.0/16").
    pub cidr: String,
    pub status: NetworkStatus,
    #[serde(default)]
    pub region: Option<String>,
    /// Whether this is the account's default network.
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a network.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateNetworkParams {
    pub name: String,
    pub cidr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Get for Network {
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

impl List for Network {
    #[tracing::instrument(skip(client))]
    fn list_page<C: Transport + ?Sized>(client: &C, params: &RequestParams) -> Result<Page<Self>> {
        verbs::fetch_page(client, PATH, params, passthrough())?.into_result()
    }
}

impl Create for Network {
    type Params = CreateNetworkParams;

    #[tracing::instrument(skip(client))]
    fn create<C: Transport + ?Sized>(client: &C, params: Self::Params) -> Result<Self> {
        verbs::create(client, PATH, &params, passthrough())?.into_result()
    }
}

impl Delete for Network {
    type Id = String;

    /// Networks with attached instances are refused with a
    /// [`DomainError::Conflict`].
    #[tracing::instrument(skip(client))]
    fn delete<C: Transport + ?Sized>(client: &C, id: String) -> Result<()> {
        validate_id(ENTITY, &id)?;
        let handler = either(
            not_found_handler(DomainError::not_found(ENTITY, id.clone())),
            conflict_handler(ENTITY, id.clone()),
        );
        let errors = verbs::remove::<(), _, _>(client, &resource_path(PATH, &id), None, handler)?;
        verbs::Decoded { data: (), errors }.into_result()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::InfraError;
    use crate::verbs::tests::FakeTransport;

    #[test]
    fn test_network_deserialize() {
        let network: Network = serde_json::from_value(json!({
            "id": "net-1",
            "name": "backend",
            "cidr": "10.20.0.0/16",
            "status": "active"
        }))
        .unwrap();

        assert_eq!(network.status, NetworkStatus::Active);
        assert!(!network.default);
        assert!(network.region.is_none());
    }

    #[test]
    fn test_delete_in_use_is_conflict() {
        let transport = FakeTransport::new().respond(
            409,
            json!({"errors": [{"code": "in_use", "message": "network has 2 attached instances"}]}),
        );

        let err = Network::delete(&transport, "net-1".to_string()).unwrap_err();

        match err {
            InfraError::Domain(DomainError::Conflict { entity_type, id, reason }) => {
                assert_eq!(entity_type, "network");
                assert_eq!(id, "net-1");
                assert_eq!(reason, "network has 2 attached instances");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let transport = FakeTransport::new().respond(404, json!({}));

        let err = Network::delete(&transport, "net-9".to_string()).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_posts_params() {
        let transport = FakeTransport::new().respond(
            201,
            json!({"data": {"id": "net-2", "name": "db", "cidr": "10.30.0.0/24", "status": "pending"}}),
        );

        let network = Network::create(
            &transport,
            CreateNetworkParams {
                name: "db".to_string(),
                cidr: "10.30.0.0/24".to_string(),
                region: None,
            },
        )
        .unwrap();

        assert_eq!(network.id, "net-2");
        assert_eq!(
            transport.sent.borrow()[0].body.as_deref(),
            Some(r#"{"name":"db","cidr":"10.30.0.0/24"}"#)
        );
    }
}
