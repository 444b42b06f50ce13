//! `GatewayServer` — Axum HTTP + WebSocket gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use kernelgate_kernels::{ConnectionFactory, KernelManager};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::{Authorizer, IdentityProvider};
use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::ws;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Kernel registry.
    pub kernels: Arc<dyn KernelManager>,
    /// Relay handle factory.
    pub connections: Arc<dyn ConnectionFactory>,
    /// Identity oracle.
    pub identity: Arc<dyn IdentityProvider>,
    /// Authorization oracle.
    pub authorizer: Arc<dyn Authorizer>,
    /// Live relayed-connection count.
    pub active: Arc<AtomicUsize>,
    /// When the gateway started.
    pub start_time: Instant,
    /// Prometheus render handle, when metrics are installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Assemble gateway state from its collaborators.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        kernels: Arc<dyn KernelManager>,
        connections: Arc<dyn ConnectionFactory>,
        identity: Arc<dyn IdentityProvider>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            config,
            kernels,
            connections,
            identity,
            authorizer,
            active: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
            metrics: None,
        }
    }
}

/// The gateway server.
pub struct GatewayServer {
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl GatewayServer {
    /// Create a new gateway.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        kernels: Arc<dyn KernelManager>,
        connections: Arc<dyn ConnectionFactory>,
        identity: Arc<dyn IdentityProvider>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            state: AppState::new(config, kernels, connections, identity, authorizer),
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Attach an installed Prometheus recorder for the `/metrics` endpoint.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.state.metrics = Some(handle);
        self
    }

    /// Build the Axum router with all routes.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route(
                "/api/kernels/{kernel_id}/channels",
                get(ws::channels_handler),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// Returns the bound address and the serve task handle.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        let router = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(err) = result {
                error!(error = %err, "gateway serve loop failed");
            }
        });

        Ok((local_addr, handle))
    }

    /// Get the shutdown coordinator.
    #[must_use]
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.active.load(Ordering::Relaxed);
    Json(health::health_check(state.start_time, connections))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
