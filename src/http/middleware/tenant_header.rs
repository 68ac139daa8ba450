//! Tenant identification from a trusted header.
//!
//! For deployments where an authenticating edge in front of the gateway has
//! already established the tenant and forwards it in a header. The header is
//! trusted as is; it only has to be usable as a path segment.

use axum::{
    extract::{Request, State},
    http::header::HeaderName,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::ApiError;
use crate::tenant::{insert_tenant, is_valid_tenant_id, TenantId};

/// Default header carrying the tenant.
pub static X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// Name of the header the edge puts the tenant in.
#[derive(Debug, Clone)]
pub struct TenantHeader(pub HeaderName);

impl Default for TenantHeader {
    fn default() -> Self {
        Self(X_TENANT_ID.clone())
    }
}

/// Copies the header's tenant into the request context.
///
/// A missing or empty header leaves the context untouched, so the prefix
/// layer downstream reports the tenant as not found.
pub async fn trusted_tenant_header(
    State(header): State<TenantHeader>,
    mut req: Request,
    next: Next,
) -> Response {
    let tenant = match req.headers().get(&header.0).map(|v| v.to_str()) {
        None => None,
        Some(Ok("")) => None,
        Some(Ok(value)) if is_valid_tenant_id(value) => Some(TenantId::new(value)),
        Some(_) => {
            tracing::warn!(header = %header.0, "Rejected malformed tenant header");
            return ApiError::InvalidTenant.into_response();
        }
    };

    if let Some(tenant) = tenant {
        tracing::debug!(tenant = %tenant, "Tenant identified from header");
        insert_tenant(req.extensions_mut(), tenant);
    }

    next.run(req).await
}
