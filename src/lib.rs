//! Infrastructure API client library.
//!
//! A Rust library for a cloud-infrastructure REST API built on a small
//! generic core: a parameter model that renders filters, sort keys and
//! pagination deterministically, a response envelope decoder, pluggable
//! error-mapping handlers, and a pagination walker. Per-resource methods
//! are thin instantiations of the generic verb functions in [`verbs`].
//!
//! # Quick Start
//!
//! ```no_run
//! use infrapi::{FilterOp, Get, InfraClient, Instance, List, RequestParams, SortDirection};
//!
//! fn main() -> infrapi::Result<()> {
//!     // Create client from environment variables
//!     let client = InfraClient::from_env()?;
//!
//!     // Get an instance by ID
//!     let instance = Instance::get(&client, "i-0a1b2c".to_string())?;
//!     println!("Instance: {} ({})", instance.name, instance.status);
//!
//!     // List every running instance, newest first
//!     let mut params = RequestParams::new();
//!     params
//!         .add_filter("status", FilterOp::Eq, ["running"])
//!         .add_sort("created_at", SortDirection::Desc);
//!     let running = Instance::list_all(&client, &params)?;
//!     println!("Found {} running instances", running.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Resource capabilities are traits that entity types implement:
//!
//! - [`Get`] - Fetch a single entity by ID
//! - [`List`] - Fetch paginated collections of entities
//! - [`Create`] - Create a new entity
//! - [`Update`] - Modify an existing entity
//! - [`Delete`] - Remove an entity
//!
//! Every call goes through a [`Transport`]. [`InfraClient`] is the HTTP
//! implementation; tests and embedders can supply their own.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `INFRA_API_KEY` (required) - API bearer token
//! - `INFRA_API_URL` (optional) - Base URL (defaults to `https://api.infra.example.com/v1`)
//! - `INFRA_TIMEOUT_SECS` (optional) - Request timeout in seconds (defaults to 60)

pub mod cli;
mod client;
pub mod enums;
mod envelope;
mod error;
pub mod handler;
mod models;
pub mod output;
mod pagination;
mod params;
mod traits;
mod transport;
pub mod verbs;

#[cfg(feature = "test-server")]
pub mod mock_server;

#[doc(hidden)]
pub use serde as __serde;

// Re-export core types
pub use client::InfraClient;
pub use enums::{ClosedEnum, UnrecognizedValue};
pub use envelope::{decode_collection, decode_single, Meta, PaginationMeta, RawEnvelope, ServerError};
pub use error::{DomainError, InfraError, Result};
pub use handler::ErrorHandler;
pub use pagination::{
    collect_all, from_fn, FnSource, Page, PageHandle, PageSource, Walker, DEFAULT_PAGE_SIZE,
    MAX_PAGES,
};
pub use params::{Filter, FilterOp, RequestParams, Sort, SortDirection};
pub use transport::{RawResponse, Transport};
pub use verbs::Decoded;

// Re-export traits
pub use traits::{Create, Delete, Get, List, ListSource, Update};

// Re-export models
pub use models::{
    // Instance types
    CreateInstanceParams,
    Instance,
    InstanceAction,
    InstanceStatus,
    InstanceUpdateParams,
    // Network types
    CreateNetworkParams,
    Network,
    NetworkStatus,
    // Volume types
    CreateVolumeParams,
    Volume,
    VolumeStatus,
    VolumeUpdateParams,
    // Load balancer types
    BalancingAlgorithm,
    CreateLoadBalancerParams,
    LoadBalancer,
    LoadBalancerStatus,
};

// Re-export convenience functions
pub use models::{running_instances, volumes_for_instance};
