//! Mock server state management.
//!
//! Provides the in-memory data store for the mock infrastructure API server.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{Instance, LoadBalancer, Network, Volume};

/// Shared state for the mock server.
///
/// Resources are kept in ordered maps keyed by id, so unsorted listings
/// come back in id order and page boundaries are stable between requests.
#[derive(Debug, Default)]
pub struct MockState {
    pub instances: BTreeMap<String, Instance>,
    pub networks: BTreeMap<String, Network>,
    pub volumes: BTreeMap<String, Volume>,
    pub load_balancers: BTreeMap<String, LoadBalancer>,

    /// Optional authentication token. If set, requests must carry it as a
    /// bearer token.
    pub required_token: Option<String>,

    /// Collection requests for this page number answer with a 500.
    pub fail_on_page: Option<u32>,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instances.insert(instance.id.clone(), instance);
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.networks.insert(network.id.clone(), network);
        self
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volumes.insert(volume.id.clone(), volume);
        self
    }

    pub fn with_load_balancer(mut self, load_balancer: LoadBalancer) -> Self {
        self.load_balancers
            .insert(load_balancer.id.clone(), load_balancer);
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Make collection requests for `page` fail with a server error.
    pub fn with_fail_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    /// Allocate an id for a newly created resource.
    pub fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-new-{:04}", self.next_id)
    }

    /// Instances attached to `network_id`.
    pub fn instances_on_network(&self, network_id: &str) -> Vec<&Instance> {
        self.instances
            .values()
            .filter(|i| i.network_ids.iter().any(|n| n == network_id))
            .collect()
    }

    /// Remove an instance, detaching its volumes and dropping it from
    /// load balancer backends. Returns the removed instance.
    pub fn remove_instance(&mut self, id: &str) -> Option<Instance> {
        let instance = self.instances.remove(id)?;

        for volume in self.volumes.values_mut() {
            if volume.instance_id.as_deref() == Some(id) {
                volume.instance_id = None;
                volume.status = crate::VolumeStatus::Available;
            }
        }

        for lb in self.load_balancers.values_mut() {
            lb.backend_instance_ids.retain(|backend| backend != id);
        }

        Some(instance)
    }
}
