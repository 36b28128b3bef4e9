//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use crate::{
    BalancingAlgorithm, Instance, InstanceStatus, LoadBalancer, LoadBalancerStatus, Network,
    NetworkStatus, Volume, VolumeStatus,
};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Instance Fixtures
    // =========================================================================

    /// Create a running instance with one private address.
    pub fn instance(id: &str, name: &str) -> Instance {
        Instance {
            id: id.to_string(),
            name: name.to_string(),
            status: InstanceStatus::Running,
            flavor: "g2.small".to_string(),
            image: Some("ubuntu-24.04".to_string()),
            region: Some("fra1".to_string()),
            ip_addresses: vec!["10.0.0.10".to_string()],
            network_ids: vec![],
            tags: vec![],
            created_at: None,
        }
    }

    /// Create an instance in the given state.
    pub fn instance_with_status(id: &str, name: &str, status: InstanceStatus) -> Instance {
        let mut instance = Self::instance(id, name);
        instance.status = status;
        instance
    }

    /// Create `count` running instances with ids `i-0001`, `i-0002`, ...
    pub fn numbered_instances(count: usize) -> Vec<Instance> {
        (1..=count)
            .map(|n| Self::instance(&format!("i-{n:04}"), &format!("worker-{n}")))
            .collect()
    }

    // =========================================================================
    // Network Fixtures
    // =========================================================================

    /// Create an active network.
    pub fn network(id: &str, name: &str, cidr: &str) -> Network {
        Network {
            id: id.to_string(),
            name: name.to_string(),
            cidr: cidr.to_string(),
            status: NetworkStatus::Active,
            region: Some("fra1".to_string()),
            default: false,
            created_at: None,
        }
    }

    // =========================================================================
    // Volume Fixtures
    // =========================================================================

    /// Create an unattached volume.
    pub fn volume(id: &str, name: &str, size_gb: u32) -> Volume {
        Volume {
            id: id.to_string(),
            name: name.to_string(),
            size_gb,
            status: VolumeStatus::Available,
            instance_id: None,
            region: Some("fra1".to_string()),
            created_at: None,
        }
    }

    /// Create a 100 GB volume attached to `instance_id`.
    pub fn attached_volume(id: &str, name: &str, instance_id: &str) -> Volume {
        let mut volume = Self::volume(id, name, 100);
        volume.status = VolumeStatus::Attached;
        volume.instance_id = Some(instance_id.to_string());
        volume
    }

    // =========================================================================
    // Load Balancer Fixtures
    // =========================================================================

    /// Create an active round-robin load balancer.
    pub fn load_balancer(id: &str, name: &str, backends: &[&str]) -> LoadBalancer {
        LoadBalancer {
            id: id.to_string(),
            name: name.to_string(),
            status: LoadBalancerStatus::Active,
            algorithm: BalancingAlgorithm::RoundRobin,
            public_ip: Some("203.0.113.10".to_string()),
            backend_instance_ids: backends.iter().map(|b| b.to_string()).collect(),
            region: Some("fra1".to_string()),
            created_at: None,
        }
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// A small web stack: two web instances behind a load balancer, a
    /// stopped database instance with an attached volume, and two networks.
    pub fn default_scenario() -> DefaultScenario {
        let mut default_net = Self::network("net-default", "default", "10.0.0.0/16");
        default_net.default = true;
        let backend_net = Self::network("net-backend", "backend", "10.20.0.0/16");

        let mut web_1 = Self::instance("i-web-1", "web-1");
        web_1.network_ids = vec![default_net.id.clone()];
        web_1.tags = vec!["web".to_string()];
        let mut web_2 = Self::instance("i-web-2", "web-2");
        web_2.network_ids = vec![default_net.id.clone()];
        web_2.ip_addresses = vec!["10.0.0.11".to_string()];
        web_2.tags = vec!["web".to_string()];
        let mut db = Self::instance_with_status("i-db-1", "db-1", InstanceStatus::Stopped);
        db.flavor = "m2.large".to_string();
        db.network_ids = vec![backend_net.id.clone()];
        db.ip_addresses = vec!["10.20.0.5".to_string()];

        DefaultScenario {
            volumes: vec![
                Self::attached_volume("vol-db-data", "db-data", &db.id),
                Self::volume("vol-scratch", "scratch", 20),
            ],
            load_balancers: vec![Self::load_balancer(
                "lb-web",
                "web",
                &[web_1.id.as_str(), web_2.id.as_str()],
            )],
            instances: vec![web_1, web_2, db],
            networks: vec![default_net, backend_net],
        }
    }
}

/// A complete test scenario with related entities.
pub struct DefaultScenario {
    pub instances: Vec<Instance>,
    pub networks: Vec<Network>,
    pub volumes: Vec<Volume>,
    pub load_balancers: Vec<LoadBalancer>,
}
