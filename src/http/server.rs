//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the federated query API
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::client::{InstanceError, REQUEST_ID_HEADER};
use crate::combiner::FailurePolicy;
use crate::config::{FederationConfig, QueryConfig};
use crate::http::handlers;
use crate::querier::FederatedQuerier;

/// Extra time the HTTP layer allows past the query deadline, so the
/// fan-out answers with metadata before the connection is cut.
const TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub querier: Arc<FederatedQuerier>,
    pub query: QueryConfig,
    pub policy: FailurePolicy,
}

impl AppState {
    pub fn new(querier: Arc<FederatedQuerier>, query: QueryConfig) -> Self {
        let policy = FailurePolicy::from_fail_on_partial(query.fail_on_partial);
        Self {
            querier,
            query,
            policy,
        }
    }
}

/// HTTP server for the federated query API.
pub struct HttpServer {
    router: Router,
    config: FederationConfig,
}

impl HttpServer {
    /// Build clients for every configured instance and the router.
    pub fn new(config: FederationConfig) -> Result<Self, InstanceError> {
        let querier = Arc::new(FederatedQuerier::from_config(&config.instances)?);
        let state = AppState::new(querier, config.query.clone());
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FederationConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        Router::new()
            .route("/api/traces/{trace_id}", get(handlers::trace_by_id))
            .route("/api/v2/traces/{trace_id}", get(handlers::trace_by_id_v2))
            .route("/api/search", get(handlers::search))
            .route("/api/search/tags", get(handlers::search_tags))
            .route("/api/v2/search/tags", get(handlers::search_tags_v2))
            .route("/api/search/tag/{tag_name}/values", get(handlers::search_tag_values))
            .route("/api/v2/search/tag/{tag_name}/values", get(handlers::search_tag_values_v2))
            .route("/api/echo", get(handlers::echo))
            .route("/ready", get(handlers::ready))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(REQUEST_ID_HEADER)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("unknown");
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id,
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::new(request_id))
                    .layer(TimeoutLayer::new(config.query.timeout() + TIMEOUT_SLACK)),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            instances = self.config.instances.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
