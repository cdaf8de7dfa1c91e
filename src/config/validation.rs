//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the node has every endpoint role it wires routes to
//! - Validate addresses, the remote URL and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NodeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{EndpointRole, NodeConfig, NodeKind};
use crate::net::listener::{resolve_bind_address, AddressError};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("{node} server endpoint for role '{role}' not configured")]
    MissingEndpoint { node: NodeKind, role: EndpointRole },

    #[error("endpoint role '{0}' configured more than once")]
    DuplicateRole(EndpointRole),

    #[error("endpoint {index}: {source}")]
    BadAddress { index: usize, source: AddressError },

    #[error("remote api root not configured")]
    MissingRemote,

    #[error("remote api root '{url}' is malformed: {reason}")]
    MalformedRemote { url: String, reason: String },

    #[error("remote api root '{url}' must use the {expected} scheme")]
    RemoteScheme { url: String, expected: &'static str },

    #[error("local api root prefix '{0}' must be a bare host name")]
    PrefixHasScheme(String),

    #[error("notification path '{0}' must start with '/'")]
    NotificationPath(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("correlation_secs ({correlation}) must be below request_secs ({request})")]
    CorrelationOutlivesRequest { correlation: u64, request: u64 },

    #[error("max body size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a config for the given node.
pub fn validate_config(kind: NodeKind, config: &NodeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    for (index, endpoint) in config.endpoints.iter().enumerate() {
        if let Err(source) = resolve_bind_address(&endpoint.address) {
            errors.push(ValidationError::BadAddress { index, source });
        }
    }

    for role in kind.required_roles() {
        let count = config
            .endpoints
            .iter()
            .filter(|e| e.role == Some(*role))
            .count();
        match count {
            0 => errors.push(ValidationError::MissingEndpoint { node: kind, role: *role }),
            1 => {}
            _ => errors.push(ValidationError::DuplicateRole(*role)),
        }
    }

    match (&config.remote_api_root, kind) {
        (None, NodeKind::Nf1) => errors.push(ValidationError::MissingRemote),
        (None, NodeKind::Nf2) => {}
        (Some(raw), _) => {
            let expected = config.http_version.scheme();
            match url::Url::parse(raw) {
                Ok(url) if url.scheme() != expected => errors.push(ValidationError::RemoteScheme {
                    url: raw.clone(),
                    expected,
                }),
                Ok(url) if url.host().is_none() => errors.push(ValidationError::MalformedRemote {
                    url: raw.clone(),
                    reason: "missing host".to_string(),
                }),
                Ok(_) => {}
                Err(e) => errors.push(ValidationError::MalformedRemote {
                    url: raw.clone(),
                    reason: e.to_string(),
                }),
            }
        }
    }

    if config.local_api_root_prefix.contains("://") {
        errors.push(ValidationError::PrefixHasScheme(config.local_api_root_prefix.clone()));
    }

    if kind == NodeKind::Nf1 && !config.notification_path.starts_with('/') {
        errors.push(ValidationError::NotificationPath(config.notification_path.clone()));
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("outbound_secs", timeouts.outbound_secs),
        ("correlation_secs", timeouts.correlation_secs),
        ("request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if timeouts.correlation_secs >= timeouts.request_secs {
        errors.push(ValidationError::CorrelationOutlivesRequest {
            correlation: timeouts.correlation_secs,
            request: timeouts.request_secs,
        });
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
