//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app with the route listing and the tenant tree
//! - Wire up middleware (tracing, request ID, timeout, metrics)
//! - Identify the tenant, strip its prefix, dispatch to the inner tree
//! - Bind server to listener with graceful shutdown
//!
//! # Request Flow
//! ```text
//! request
//!     → request ID / trace / timeout / metrics
//!     → listing path?  → list_paths
//!     → otherwise      → trusted_tenant_header
//!                      → StripTenantPrefix
//!                      → upstream tree (tenant-unaware)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::{header::HeaderName, Method},
    middleware::{self, Next},
    response::Response,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::forward::ForwardPrefix;
use crate::http::middleware::{trusted_tenant_header, StripTenantPrefixLayer, TenantHeader};
use crate::lifecycle::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{list_paths, Route, RouteTable};
use crate::tenant::{get_tenant, PrefixTemplate};

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    routes: Arc<[Route]>,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server from a validated configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let (router, routes) = Self::build_router(&config);
        Self {
            router,
            routes,
            config,
        }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig) -> (Router, Arc<[Route]>) {
        let template = PrefixTemplate::new(config.tenancy.prefix_template.clone());
        if !template.has_placeholder() {
            tracing::warn!(
                template = %template,
                "Prefix template has no {{tenant}} placeholder; stripping a fixed prefix"
            );
        }

        let header = match HeaderName::from_bytes(config.tenancy.tenant_header.as_bytes()) {
            Ok(name) => TenantHeader(name),
            Err(e) => {
                tracing::warn!(
                    header = %config.tenancy.tenant_header,
                    error = %e,
                    "Invalid tenant header name, using default"
                );
                TenantHeader::default()
            }
        };

        let upstream = upstream_table();
        let exposed: Vec<Route> = upstream
            .routes()
            .iter()
            .map(|r| r.prefixed(template.as_str()))
            .collect();

        let tenant_service = ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(header, trusted_tenant_header))
            .layer(StripTenantPrefixLayer::new(template))
            .service(upstream.into_router());

        let mut table = RouteTable::new();
        if config.introspection.enabled {
            let path = config.introspection.path.as_str();
            let mut listed = vec![Route::new(path, vec![Method::GET])];
            listed.extend(exposed.iter().cloned());
            table = table.get(path, list_paths(&listed));
        }
        let table = table.record(exposed);
        let routes = table.routes();

        let router = table
            .into_router()
            .fallback_service(tenant_service)
            .layer(middleware::from_fn(track_metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            );

        (router, routes)
    }

    /// Run the server until `shutdown` fires or Ctrl+C is received.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            template = %self.config.tenancy.prefix_template,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for driving the app without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Routes exposed by this server, in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// What the upstream tree saw of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoResponse {
    pub tenant: Option<String>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub forward_prefix: Option<String>,
    /// Path a prefix-aware proxy would send to the backend.
    pub upstream_path: String,
}

/// Tenant-unaware handler tree.
///
/// Echoes the request so the rewrite can be observed end to end; actual
/// backend forwarding happens outside this crate.
fn upstream_table() -> RouteTable {
    RouteTable::new()
        .any("/", echo_handler)
        .any("/{*path}", echo_handler)
}

async fn echo_handler(req: Request) -> Json<EchoResponse> {
    let forward = req.extensions().get::<ForwardPrefix>();
    let path = req.uri().path().to_string();

    Json(EchoResponse {
        tenant: get_tenant(req.extensions()).map(String::from),
        method: req.method().to_string(),
        query: req.uri().query().map(String::from),
        forward_prefix: forward.map(|p| p.as_str().to_string()),
        upstream_path: forward.map_or_else(|| path.clone(), |p| p.absolute_path(&path)),
        path,
    })
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let response = next.run(req).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}
