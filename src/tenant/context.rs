//! Request-scoped tenant identity.

use std::fmt;

use axum::http::Extensions;

/// Maximum accepted length of a tenant identifier.
const MAX_TENANT_ID_LEN: usize = 64;

/// Tenant identifier attached to a request by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Looks up the tenant stored in the request's extensions.
///
/// Returns `None` when no authentication layer ran before the caller.
pub fn get_tenant(extensions: &Extensions) -> Option<&str> {
    extensions.get::<TenantId>().map(TenantId::as_str)
}

/// Stores the tenant in the request's extensions, replacing any previous one.
pub fn insert_tenant(extensions: &mut Extensions, tenant: TenantId) {
    extensions.insert(tenant);
}

/// Checks that a string is usable as a tenant identifier inside a URL path.
///
/// Alphanumerics, hyphens and underscores only, 1 to 64 characters.
pub fn is_valid_tenant_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_TENANT_ID_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
