//! Node assembly: route wiring, shared state, and the supervised run.
//!
//! # Data Flow
//! ```text
//! NodeConfig (Arc, read-only)
//!     → transport (outbound client bound to the CA)
//!     → nf1.rs / nf2.rs (routers + handler state per endpoint role)
//!     → EndpointServer per endpoint
//!     → ServerGroup (start, stop on shutdown, wait)
//! ```
//!
//! # Design Decisions
//! - Handler state is built once and cloned into each router; nothing is
//!   global
//! - Follow-up tasks are tracked so `run()` returns only after they finish

pub mod nf1;
pub mod nf2;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::task::TaskTracker;

use crate::config::{EndpointConfig, EndpointRole, NodeConfig, NodeKind};
use crate::exchange::Forwarder;
use crate::http::server::{with_common_layers, EndpointServer, ServerStopper};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::supervisor::{GroupReport, ServerGroup};
use crate::net::listener::{callback_url, resolve_bind_address, AddressError};
use crate::net::transport::{TransportConfig, TransportError};

/// Body acknowledging a delivered message.
pub const ACK_BODY: &str = "Hello Thanks !!!";

/// Errors assembling a node. All are fatal at startup.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("{node} server endpoint for role '{role}' not configured")]
    MissingEndpoint { node: NodeKind, role: EndpointRole },

    #[error("{0} requires a remote api root")]
    MissingRemote(NodeKind),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A fully wired node, ready to run.
pub struct Node {
    kind: NodeKind,
    servers: Vec<EndpointServer>,
    shutdown: Shutdown,
    follow_ups: TaskTracker,
}

impl Node {
    /// Build the servers and handler state for `kind`.
    pub fn build(kind: NodeKind, config: Arc<NodeConfig>, shutdown: Shutdown) -> Result<Self, NodeError> {
        let client = TransportConfig::for_node(kind, &config).build_client()?;
        let forwarder = Forwarder::new(client, kind);
        let follow_ups = TaskTracker::new();

        let routed = match kind {
            NodeKind::Nf1 => nf1::routes(&config, forwarder, &shutdown)?,
            NodeKind::Nf2 => nf2::routes(&config, forwarder, &shutdown, follow_ups.clone())?,
        };

        let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
        let servers = routed
            .into_iter()
            .map(|(endpoint, router)| {
                let role = endpoint.role.map(|r| r.as_str()).unwrap_or("none");
                let server = EndpointServer::new(
                    format!("{} {}", kind, role),
                    endpoint.address.clone(),
                    with_common_layers(router, &config),
                )
                .with_grace(grace);
                if config.http_version.uses_tls() {
                    server.with_tls(config.tls.clone())
                } else {
                    server
                }
            })
            .collect();

        Ok(Self {
            kind,
            servers,
            shutdown,
            follow_ups,
        })
    }

    /// Stop levers of every server, e.g. to await binding in tests.
    pub fn stoppers(&self) -> Vec<ServerStopper> {
        self.servers.iter().map(EndpointServer::stopper).collect()
    }

    /// Serve until shutdown, then wait for servers and follow-ups.
    pub async fn run(self) -> GroupReport {
        let group = ServerGroup::start(self.kind.name(), self.servers, self.shutdown.clone());
        let report = group.run().await;

        self.follow_ups.close();
        if !self.follow_ups.is_empty() {
            tracing::info!(pending = self.follow_ups.len(), "Waiting for follow-ups");
        }
        self.follow_ups.wait().await;

        tracing::info!(node = %self.kind, "Exiting node servers");
        report
    }
}

/// Endpoint for `role`, or the startup error naming it.
fn require_endpoint(
    kind: NodeKind,
    config: &NodeConfig,
    role: EndpointRole,
) -> Result<&EndpointConfig, NodeError> {
    config
        .endpoint(role)
        .ok_or(NodeError::MissingEndpoint { node: kind, role })
}

/// Callback URL peers use to reach `path` on `endpoint`.
fn own_callback(config: &NodeConfig, endpoint: &EndpointConfig, path: &str) -> Result<String, NodeError> {
    let addr = resolve_bind_address(&endpoint.address)?;
    Ok(callback_url(
        config.http_version,
        &config.local_api_root_prefix,
        addr,
        path,
    ))
}
