//! Tenant identity and per-tenant path prefixes.
//!
//! # Data Flow
//! ```text
//! authentication (external)
//!     → context.rs (TenantId stored in request extensions)
//!     → template.rs (PrefixTemplate resolved against the tenant)
//!     → http::middleware::tenant_prefix (path rewrite)
//! ```
//!
//! # Design Decisions
//! - Identity lives in the request's own extensions, never in process state
//! - Templates are plain strings; only the first `{tenant}` is substituted
//! - Prefix stripping never fails: a non-matching path passes through

pub mod context;
pub mod template;

pub use context::{get_tenant, insert_tenant, is_valid_tenant_id, TenantId};
pub use template::{PrefixTemplate, RewrittenPath, TENANT_PLACEHOLDER};
