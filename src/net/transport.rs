//! Outbound client construction.
//!
//! # Responsibilities
//! - Pick the wire protocol from the configured version
//! - Bind the client to a trust store built from the CA bundle
//! - Apply the outbound timeout and node User-Agent
//!
//! # Design Decisions
//! - Version 1 speaks HTTP/1.1; the CA is loaded when present so https
//!   peers still verify, and a missing CA only rules out https targets
//! - Version 2 speaks HTTP/2 with prior knowledge over TLS and requires the CA
//! - Built-in web roots are disabled for both; only the configured CA is trusted

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::{HttpVersion, NodeConfig, NodeKind};
use crate::net::tls::{install_crypto_provider, load_ca_certificates, TlsError};

/// Error type for client construction.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("trust store: {0}")]
    TrustStore(#[from] TlsError),

    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Everything needed to build an outbound client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub version: HttpVersion,
    pub ca_cert_path: PathBuf,
    pub timeout: Duration,
    pub user_agent: String,
}

impl TransportConfig {
    /// Derive the transport settings for `kind` from its node config.
    pub fn for_node(kind: NodeKind, config: &NodeConfig) -> Self {
        Self {
            version: config.http_version,
            ca_cert_path: PathBuf::from(&config.tls.ca_cert_path),
            timeout: Duration::from_secs(config.timeouts.outbound_secs),
            user_agent: kind.name().to_string(),
        }
    }

    /// Build a protocol-aware client bound to the CA trust store.
    pub fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        let builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .no_proxy();

        install_crypto_provider();
        let builder = builder.use_rustls_tls().tls_built_in_root_certs(false);

        let (builder, roots) = match self.version {
            HttpVersion::Http1 if !self.ca_cert_path.exists() => {
                tracing::warn!(
                    ca = %self.ca_cert_path.display(),
                    "CA bundle not found; https peers will be rejected"
                );
                (builder.http1_only(), Vec::new())
            }
            HttpVersion::Http1 => (builder.http1_only(), load_ca_certificates(&self.ca_cert_path)?),
            HttpVersion::Http2 => (
                builder.http2_prior_knowledge(),
                load_ca_certificates(&self.ca_cert_path)?,
            ),
        };
        let builder = roots
            .into_iter()
            .fold(builder, |builder, cert| builder.add_root_certificate(cert));

        let client = builder.build()?;
        tracing::debug!(
            version = %self.version,
            ca = %self.ca_cert_path.display(),
            timeout_secs = self.timeout.as_secs(),
            "Outbound client built"
        );
        Ok(client)
    }
}
