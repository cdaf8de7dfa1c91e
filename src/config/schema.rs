//! Configuration schema definitions.
//!
//! This module defines the configuration structure shared by both nodes.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for one node (NF1 or NF2).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// One entry per listening server.
    pub endpoints: Vec<EndpointConfig>,

    /// Base URL of the peer node's trigger route.
    ///
    /// Required for NF1. For NF2 it is optional: when absent the follow-up
    /// goes to the location carried by the inbound message.
    pub remote_api_root: Option<String>,

    /// Host name other nodes use to reach this one (e.g. "localhost").
    ///
    /// When empty, the host of the endpoint address is used.
    pub local_api_root_prefix: String,

    /// Path of NF1's notification receiver.
    pub notification_path: String,

    /// Protocol version used by servers and outbound clients.
    pub http_version: HttpVersion,

    /// Certificate material.
    pub tls: TlsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            remote_api_root: None,
            local_api_root_prefix: String::new(),
            notification_path: "/nf1".to_string(),
            http_version: HttpVersion::default(),
            tls: TlsConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl NodeConfig {
    /// First endpoint carrying the given role.
    pub fn endpoint(&self, role: EndpointRole) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.role == Some(role))
    }
}

/// Which of the two cooperating nodes a config describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Nf1,
    Nf2,
}

impl NodeKind {
    /// Value sent in the `User-Agent` header of outbound calls.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Nf1 => "NF1",
            NodeKind::Nf2 => "NF2",
        }
    }

    /// Roles a config for this node must provide.
    pub fn required_roles(&self) -> &'static [EndpointRole] {
        match self {
            NodeKind::Nf1 => &[EndpointRole::Api, EndpointRole::Notification],
            NodeKind::Nf2 => &[EndpointRole::Nf],
        }
    }

    /// Default config file location.
    pub fn default_config_path(&self) -> &'static str {
        match self {
            NodeKind::Nf1 => "config/nf1.json",
            NodeKind::Nf2 => "config/nf2.json",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single listener.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Bind address, either "host:port" or the ":port" shorthand.
    pub address: String,

    /// Which routes this listener serves.
    #[serde(default)]
    pub role: Option<EndpointRole>,
}

impl EndpointConfig {
    pub fn new(address: impl Into<String>, role: EndpointRole) -> Self {
        Self {
            address: address.into(),
            role: Some(role),
        }
    }
}

/// Peer-role label attached to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    /// NF1 client-triggering API (`/nf2loc`).
    Api,
    /// NF1 notification receiver.
    Notification,
    /// NF2 combined trigger and receiver (`/nf2`).
    Nf,
}

impl EndpointRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointRole::Api => "api",
            EndpointRole::Notification => "notification",
            EndpointRole::Nf => "nf",
        }
    }
}

impl std::fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport protocol version, serialized as the bare number 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HttpVersion {
    /// Cleartext HTTP/1.1.
    Http1,
    /// HTTP/2 over TLS.
    #[default]
    Http2,
}

impl HttpVersion {
    /// URL scheme servers of this version are reachable under.
    pub fn scheme(&self) -> &'static str {
        match self {
            HttpVersion::Http1 => "http",
            HttpVersion::Http2 => "https",
        }
    }

    pub fn uses_tls(&self) -> bool {
        matches!(self, HttpVersion::Http2)
    }
}

impl TryFrom<u8> for HttpVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(HttpVersion::Http1),
            2 => Ok(HttpVersion::Http2),
            other => Err(format!("unsupported http version {}", other)),
        }
    }
}

impl From<HttpVersion> for u8 {
    fn from(version: HttpVersion) -> Self {
        match version {
            HttpVersion::Http1 => 1,
            HttpVersion::Http2 => 2,
        }
    }
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Certificate and key locations (PEM).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Server certificate presented by every listener.
    pub cert_path: String,

    /// Private key for `cert_path`.
    pub key_path: String,

    /// CA bundle trusted by outbound clients.
    pub ca_cert_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: "certs/server-cert.pem".to_string(),
            key_path: "certs/server-key.pem".to_string(),
            ca_cert_path: "certs/root-ca-cert.pem".to_string(),
        }
    }
}

/// Timeout configuration for the exchange.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound on every outbound POST.
    pub outbound_secs: u64,

    /// How long a trigger waits for the peer's follow-up.
    pub correlation_secs: u64,

    /// NF2 delay between acknowledging and sending the follow-up.
    pub follow_up_delay_ms: u64,

    /// Outer bound on any inbound request.
    pub request_secs: u64,

    /// Grace period servers get to drain on stop.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            outbound_secs: 30,
            correlation_secs: 30,
            follow_up_delay_ms: 1000,
            request_secs: 90,
            shutdown_grace_secs: 5,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus scrape address; metrics are not exported when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_version_from_number() {
        let v: HttpVersion = serde_json::from_str("1").unwrap();
        assert_eq!(v, HttpVersion::Http1);
        assert_eq!(v.scheme(), "http");
        assert!(serde_json::from_str::<HttpVersion>("3").is_err());
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg: NodeConfig = serde_json::from_str(
            r#"{"endpoints": [{"address": ":8081", "role": "notification"}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.http_version, HttpVersion::Http2);
        assert_eq!(cfg.timeouts.follow_up_delay_ms, 1000);
        assert_eq!(cfg.tls.ca_cert_path, "certs/root-ca-cert.pem");
        assert_eq!(
            cfg.endpoint(EndpointRole::Notification).map(|e| e.address.as_str()),
            Some(":8081")
        );
        assert!(cfg.endpoint(EndpointRole::Api).is_none());
    }
}
