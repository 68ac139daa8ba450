//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, paths and header names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - A template without `{tenant}` is legal: it acts as a fixed prefix

use std::net::SocketAddr;

use axum::http::header::HeaderName;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::tenant::TENANT_PLACEHOLDER;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: path {value:?} must start with '/'")]
    RelativePath { field: &'static str, value: String },

    #[error("introspection.path: {0:?} must not contain {{tenant}}")]
    PlaceholderInListingPath(String),

    #[error("tenancy.tenant_header: invalid header name {0:?}")]
    InvalidHeader(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if !config.tenancy.prefix_template.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            field: "tenancy.prefix_template",
            value: config.tenancy.prefix_template.clone(),
        });
    }

    if HeaderName::from_bytes(config.tenancy.tenant_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(
            config.tenancy.tenant_header.clone(),
        ));
    }

    if config.introspection.enabled {
        let path = &config.introspection.path;
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field: "introspection.path",
                value: path.clone(),
            });
        }
        if path.contains(TENANT_PLACEHOLDER) {
            errors.push(ValidationError::PlaceholderInListingPath(path.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
