//! Mock infrastructure API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the
//! infrastructure API for integration and end-to-end testing. Unlike
//! wiremock which mocks at the HTTP level per-test, this server maintains
//! state across requests, enabling realistic workflow testing.
//!
//! # Example
//!
//! ```no_run
//! use infrapi::mock_server::MockServer;
//! use infrapi::{Get, InfraClient, Instance};
//!
//! let server = MockServer::start();
//! let client = InfraClient::new("test-token", server.url()).unwrap();
//!
//! // Server comes with default fixtures
//! let instance = Instance::get(&client, "i-web-1".to_string()).unwrap();
//! assert_eq!(instance.name, "web-1");
//!
//! server.shutdown();
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::MockState;
