//! Listener address resolution.
//!
//! # Responsibilities
//! - Turn configured endpoint strings into bindable socket addresses
//! - Accept the ":port" shorthand (all interfaces)
//! - Derive the callback URL a peer uses to reach a local route

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

use crate::config::HttpVersion;

/// Error type for address resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Address string is empty.
    #[error("endpoint address is empty")]
    Empty,

    /// Address could not be parsed as host:port.
    #[error("invalid endpoint address '{address}': {reason}")]
    Invalid { address: String, reason: String },
}

/// Resolve a configured endpoint address to a socket address.
///
/// ":8080" binds every interface; anything else must be a literal
/// `ip:port`.
pub fn resolve_bind_address(address: &str) -> Result<SocketAddr, AddressError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty);
    }

    if let Some(port) = trimmed.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|e: std::num::ParseIntError| AddressError::Invalid {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    if let Some(port) = trimmed.strip_prefix("localhost:") {
        let port: u16 = port.parse().map_err(|e: std::num::ParseIntError| AddressError::Invalid {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    }

    trimmed.parse().map_err(|e: std::net::AddrParseError| AddressError::Invalid {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Build the URL a peer should call to reach `path` on this endpoint.
///
/// `prefix` is the externally reachable host name. When it is empty the
/// bound IP is used, with the unspecified address mapped to loopback.
pub fn callback_url(version: HttpVersion, prefix: &str, addr: SocketAddr, path: &str) -> String {
    let host = if prefix.is_empty() {
        let ip = if addr.ip().is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            addr.ip()
        };
        match ip {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{}]", v6),
        }
    } else {
        prefix.trim_end_matches('/').to_string()
    };

    format!("{}://{}:{}{}", version.scheme(), host, addr.port(), path)
}
