//! Mock infrastructure API server.
//!
//! Provides an axum-based HTTP server that simulates the infrastructure API.
//! The server runs on its own tokio runtime so that blocking callers can
//! use it from plain `#[test]` functions.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::{oneshot, RwLock};

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers::{self, SharedState};
use super::state::MockState;

/// A mock infrastructure API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a stateful API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
    /// Signals graceful shutdown to the serve task.
    shutdown: oneshot::Sender<()>,
    /// Runtime driving the server; dropping it stops the server.
    runtime: Runtime,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns once it
    /// is accepting connections. Use `url()` to get the server's base URL.
    ///
    /// Must not be called from inside an async runtime.
    pub fn start() -> Self {
        Self::with_state(Self::default_state())
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub fn start_empty() -> Self {
        Self::with_state(MockState::new())
    }

    /// Start a mock server with custom state.
    pub fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("infrapi-mock-server")
            .enable_all()
            .build()
            .expect("Failed to build mock server runtime");

        // Bind to a random available port
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let (shutdown, signal) = oneshot::channel::<()>();
        runtime.spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "mock server stopped");
            }
        });

        tracing::debug!(%addr, "mock server listening");

        Self {
            url: format!("http://{addr}"),
            state: shared_state,
            shutdown,
            runtime,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating an `InfraClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// From synchronous test code use `blocking_read`/`blocking_write`.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server and wait briefly for in-flight requests.
    pub fn shutdown(self) {
        let _ = self.shutdown.send(());
        self.runtime.shutdown_timeout(Duration::from_secs(1));
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        let scenario = Fixtures::default_scenario();
        Self::state_from_scenario(scenario)
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for instance in scenario.instances {
            state.instances.insert(instance.id.clone(), instance);
        }

        for network in scenario.networks {
            state.networks.insert(network.id.clone(), network);
        }

        for volume in scenario.volumes {
            state.volumes.insert(volume.id.clone(), volume);
        }

        for lb in scenario.load_balancers {
            state.load_balancers.insert(lb.id.clone(), lb);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: SharedState) -> Router {
        Router::new()
            // Instance routes
            .route(
                "/instances",
                get(handlers::list_instances).post(handlers::create_instance),
            )
            .route(
                "/instances/:id",
                get(handlers::get_instance)
                    .patch(handlers::update_instance)
                    .delete(handlers::delete_instance),
            )
            .route("/instances/:id/actions", post(handlers::instance_action))
            // Network routes
            .route(
                "/networks",
                get(handlers::list_networks).post(handlers::create_network),
            )
            .route(
                "/networks/:id",
                get(handlers::get_network).delete(handlers::delete_network),
            )
            // Volume routes
            .route(
                "/volumes",
                get(handlers::list_volumes).post(handlers::create_volume),
            )
            .route(
                "/volumes/:id",
                get(handlers::get_volume)
                    .patch(handlers::update_volume)
                    .delete(handlers::delete_volume),
            )
            // Load balancer routes
            .route(
                "/load_balancers",
                get(handlers::list_load_balancers).post(handlers::create_load_balancer),
            )
            .route(
                "/load_balancers/:id",
                get(handlers::get_load_balancer).delete(handlers::delete_load_balancer),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Reject requests without the configured bearer token.
async fn require_token(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let expected = state.read().await.required_token.clone();

    if let Some(expected) = expected {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected.as_str()) {
            return handlers::error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing or invalid bearer token",
            );
        }
    }

    next.run(request).await
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Get, InfraClient, InfraError, Instance, List, RequestParams};

    #[test]
    fn test_server_starts_and_responds() {
        let server = MockServer::start();

        // Server should be accessible
        let response = reqwest::blocking::get(format!("{}/health", server.url()))
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().unwrap(), "ok");

        server.shutdown();
    }

    #[test]
    fn test_get_instance_with_infra_client() {
        let server = MockServer::start();
        let client = InfraClient::new("test-token", server.url()).unwrap();

        let instance = Instance::get(&client, "i-web-1".to_string()).expect("Failed to get instance");

        assert_eq!(instance.name, "web-1");

        server.shutdown();
    }

    #[test]
    fn test_list_instances_with_infra_client() {
        let server = MockServer::start();
        let client = InfraClient::new("test-token", server.url()).unwrap();

        let page = Instance::list_page(&client, &RequestParams::new()).expect("Failed to list instances");

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total(), Some(3));
        assert!(!page.has_more);

        server.shutdown();
    }

    #[test]
    fn test_empty_server() {
        let server = MockServer::start_empty();
        let client = InfraClient::new("test-token", server.url()).unwrap();

        let result = Instance::get(&client, "nonexistent".to_string());

        assert!(result.unwrap_err().is_not_found());

        server.shutdown();
    }

    #[test]
    fn test_required_token() {
        let server = MockServer::with_state(
            MockState::new()
                .with_instance(Fixtures::instance("i-1", "web"))
                .with_required_token("secret"),
        );

        let wrong = InfraClient::new("nope", server.url()).unwrap();
        let err = Instance::get(&wrong, "i-1".to_string()).unwrap_err();
        assert!(matches!(err, InfraError::ApiError { status: 401, .. }));

        let right = InfraClient::new("secret", server.url()).unwrap();
        assert!(Instance::get(&right, "i-1".to_string()).is_ok());

        server.shutdown();
    }
}
