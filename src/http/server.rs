//! Endpoint server: one listener serving a set of routes.
//!
//! # Responsibilities
//! - Resolve the configured address and bind it (cleartext or TLS)
//! - Serve HTTP/1.1 and HTTP/2 on the bound socket
//! - Wire up middleware (tracing, request ID, limits, timeout)
//! - Stop on request via a cloneable [`ServerStopper`]
//!
//! # Design Decisions
//! - Bind and TLS setup failures end this server only; the error is logged
//!   and returned so the group can count it as stopped
//! - `stop()` is safe to call any number of times, before or after exit

use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{NodeConfig, TlsConfig};
use crate::http::request::{propagate_request_id, set_request_id};
use crate::net::listener::{resolve_bind_address, AddressError};
use crate::net::tls::load_tls_config;

/// Error type for a server that could not serve.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("TLS setup failed: {0}")]
    Tls(std::io::Error),

    #[error("server error: {0}")]
    Bind(std::io::Error),
}

/// Apply the middleware stack shared by every endpoint.
#[allow(deprecated)]
pub fn with_common_layers(router: Router, config: &NodeConfig) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(propagate_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id())
}

/// A single listening server.
pub struct EndpointServer {
    name: String,
    address: String,
    router: Router,
    tls: Option<TlsConfig>,
    handle: Handle,
    grace: Duration,
    exited: CancellationToken,
}

impl EndpointServer {
    /// Create a cleartext server for `address` serving `router`.
    pub fn new(name: impl Into<String>, address: impl Into<String>, router: Router) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            router,
            tls: None,
            handle: Handle::new(),
            grace: Duration::ZERO,
            exited: CancellationToken::new(),
        }
    }

    /// Serve TLS with the given certificate and key.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Let in-flight requests drain for up to `grace` on stop.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A handle that stops this server from any task.
    pub fn stopper(&self) -> ServerStopper {
        ServerStopper {
            name: self.name.clone(),
            handle: self.handle.clone(),
            grace: self.grace,
            exited: self.exited.clone(),
        }
    }

    /// Run until stopped or until binding fails.
    pub async fn start(self) -> Result<(), ServerError> {
        // Fires on return and if the task is dropped mid-serve.
        let _exited = self.exited.clone().drop_guard();
        let result = self.serve().await;
        match &result {
            Ok(()) => tracing::info!(server = %self.name, address = %self.address, "HTTP server stopped"),
            Err(e) => tracing::error!(server = %self.name, address = %self.address, error = %e, "HTTP server error"),
        }
        result
    }

    async fn serve(&self) -> Result<(), ServerError> {
        let addr = resolve_bind_address(&self.address)?;
        let app = self.router.clone().into_make_service();

        // Announce the actual bound address (port 0 resolves here).
        let announcer = {
            let handle = self.handle.clone();
            let name = self.name.clone();
            let scheme = if self.tls.is_some() { "https" } else { "http" };
            tokio::spawn(async move {
                if let Some(bound) = handle.listening().await {
                    tracing::info!(server = %name, address = %bound, scheme, "HTTP server listening");
                }
            })
        };

        let result = match &self.tls {
            Some(tls) => {
                let config = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path))
                    .await
                    .map_err(ServerError::Tls);
                match config {
                    Ok(config) => axum_server::bind_rustls(addr, config)
                        .handle(self.handle.clone())
                        .serve(app)
                        .await
                        .map_err(ServerError::Bind),
                    Err(e) => Err(e),
                }
            }
            None => axum_server::bind(addr)
                .handle(self.handle.clone())
                .serve(app)
                .await
                .map_err(ServerError::Bind),
        };

        announcer.abort();
        result
    }
}

/// Cloneable stop lever for an [`EndpointServer`].
#[derive(Clone)]
pub struct ServerStopper {
    name: String,
    handle: Handle,
    grace: Duration,
    exited: CancellationToken,
}

impl ServerStopper {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the listener; in-flight connections get the grace period.
    pub fn stop(&self) {
        tracing::info!(server = %self.name, "Executing graceful stop");
        if self.grace.is_zero() {
            self.handle.shutdown();
        } else {
            self.handle.graceful_shutdown(Some(self.grace));
        }
    }

    /// Address the server is listening on, once bound.
    ///
    /// `None` if the server exited without binding, including address and
    /// TLS setup failures.
    pub async fn listening(&self) -> Option<std::net::SocketAddr> {
        tokio::select! {
            biased;
            bound = self.handle.listening() => bound,
            _ = self.exited.cancelled() => None,
        }
    }
}
