//! Tenant-aware request routing for a multi-tenant HTTP gateway.
//!
//! - [`routing`]: route table bookkeeping and the route listing endpoint
//! - [`http::middleware::tenant_prefix`]: per-tenant URL prefix stripping
//! - [`tenant`]: request-scoped tenant identity and prefix templates

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod tenant;

pub use config::GatewayConfig;
pub use http::{GatewayServer, StripTenantPrefixLayer};
pub use lifecycle::Shutdown;
pub use routing::{list_paths, Route, RouteTable};
