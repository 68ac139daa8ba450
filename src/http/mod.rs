//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, shared layers)
//!     → middleware/tenant_header.rs (tenant into request context)
//!     → middleware/tenant_prefix.rs (strip tenant prefix, annotate)
//!     → forward.rs (prefix annotation read by the forwarding side)
//!     → error.rs (structured API errors)
//! ```

pub mod error;
pub mod forward;
pub mod middleware;
pub mod server;

pub use error::{api_error_response, ApiError, ApiErrorBody};
pub use forward::{forward_prefix, ForwardPrefix};
pub use middleware::{StripTenantPrefix, StripTenantPrefixLayer};
pub use server::{EchoResponse, GatewayServer};
