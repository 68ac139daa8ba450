//! HTTP middleware.
//!
//! - [`tenant_header`] - Tenant identification from a trusted edge header
//! - [`tenant_prefix`] - Per-tenant URL prefix stripping

pub mod tenant_header;
pub mod tenant_prefix;

pub use tenant_header::{trusted_tenant_header, TenantHeader, X_TENANT_ID};
pub use tenant_prefix::{StripTenantPrefix, StripTenantPrefixLayer};
