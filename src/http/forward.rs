//! Forwarding annotation for prefix-aware proxies.
//!
//! The tenant prefix middleware records the prefix it stripped so that
//! whatever forwards the request later can rebuild the exact path the client
//! sent.

use axum::http::Extensions;

/// Prefix removed from the request path before it reached the inner handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPrefix {
    prefix: String,
    synthesized_slash: bool,
}

impl ForwardPrefix {
    /// `synthesized_slash` marks a rewritten path whose leading `/` was not
    /// part of the client's path.
    pub fn new(prefix: impl Into<String>, synthesized_slash: bool) -> Self {
        Self {
            prefix: prefix.into(),
            synthesized_slash,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Rebuilds the original path from the rewritten one.
    pub fn absolute_path(&self, rewritten: &str) -> String {
        let rest = if self.synthesized_slash {
            rewritten.strip_prefix('/').unwrap_or(rewritten)
        } else {
            rewritten
        };
        format!("{}{rest}", self.prefix)
    }
}

/// Returns the forwarding prefix attached to a request, if any.
pub fn forward_prefix(extensions: &Extensions) -> Option<&str> {
    extensions.get::<ForwardPrefix>().map(ForwardPrefix::as_str)
}
