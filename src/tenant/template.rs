//! Prefix templates and path rewriting.

use std::fmt;
use std::sync::Arc;

/// Placeholder substituted with the tenant identifier.
pub const TENANT_PLACEHOLDER: &str = "{tenant}";

/// A path prefix containing a `{tenant}` placeholder, e.g. `/api/v1/{tenant}`.
///
/// Cheap to clone; the string is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTemplate {
    raw: Arc<str>,
}

impl PrefixTemplate {
    /// Stores the template. Nothing is validated here; a template without
    /// placeholder behaves as a fixed prefix.
    pub fn new(template: impl Into<String>) -> Self {
        let template: String = template.into();
        Self {
            raw: Arc::from(template),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the template contains the tenant placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.raw.contains(TENANT_PLACEHOLDER)
    }

    /// Substitutes the first placeholder with the tenant.
    pub fn resolve(&self, tenant: &str) -> String {
        self.raw.replacen(TENANT_PLACEHOLDER, tenant, 1)
    }
}

impl fmt::Display for PrefixTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for PrefixTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for PrefixTemplate {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

/// Outcome of stripping a resolved prefix from a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewrittenPath {
    /// The path started with the prefix. `path` is what remains of it,
    /// with a leading `/` added when the literal remainder lacked one
    /// (`synthesized_slash`).
    Stripped { path: String, synthesized_slash: bool },
    /// The path did not start with the prefix and passes through as is.
    Unchanged,
}

impl RewrittenPath {
    /// Strips `prefix` from the start of `path`.
    ///
    /// The remainder always starts with `/`: an exact match yields `/` and a
    /// remainder like `corp/x` becomes `/corp/x`. The added slash is flagged
    /// so the original path can be rebuilt exactly.
    pub fn compute(path: &str, prefix: &str) -> Self {
        match path.strip_prefix(prefix) {
            Some(rest) if rest.starts_with('/') => RewrittenPath::Stripped {
                path: rest.to_string(),
                synthesized_slash: false,
            },
            Some(rest) => RewrittenPath::Stripped {
                path: format!("/{rest}"),
                synthesized_slash: true,
            },
            None => RewrittenPath::Unchanged,
        }
    }

    pub fn is_stripped(&self) -> bool {
        matches!(self, RewrittenPath::Stripped { .. })
    }
}
