//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Install the signal listener
//! - Build the node and run it until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Logging starts before validation so config errors are logged

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;

use crate::config::{log_config, read_config, validate_config, ConfigError, HttpVersion, NodeKind};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::lifecycle::supervisor::GroupReport;
use crate::net::listener::resolve_bind_address;
use crate::node::{Node, NodeError};
use crate::observability::{logging, metrics};

/// Command line shared by both node binaries.
#[derive(Debug, Clone, Parser)]
pub struct NodeArgs {
    /// Config file (JSON, or TOML by extension).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the protocol version from the config (1 or 2).
    #[arg(long = "http-version", value_name = "1|2")]
    pub http_version: Option<u8>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    HttpVersion(String),

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Run `kind` to completion: load config, serve, and return once shut down.
pub async fn launch(kind: NodeKind, args: NodeArgs) -> Result<GroupReport, StartupError> {
    let path = args
        .config
        .unwrap_or_else(|| PathBuf::from(kind.default_config_path()));

    let mut config = match read_config(&path) {
        Ok(config) => config,
        Err(e) => {
            logging::init_tracing("info");
            tracing::error!(node = %kind, path = %path.display(), error = %e, "Failed to read configuration");
            return Err(e.into());
        }
    };
    logging::init_tracing(&config.observability.log_level);
    tracing::info!(node = %kind, path = %path.display(), "{} starting", kind);

    if let Some(version) = args.http_version {
        config.http_version = HttpVersion::try_from(version).map_err(StartupError::HttpVersion)?;
    }
    if let Err(errors) = validate_config(kind, &config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }
    log_config(kind, &config);

    if let Some(address) = &config.observability.metrics_address {
        match resolve_bind_address(address) {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %address, error = %e, "Failed to parse metrics address"),
        }
    }

    let shutdown = Shutdown::new();
    let signals = spawn_signal_listener(shutdown.clone());

    let node = Node::build(kind, Arc::new(config), shutdown.clone())?;
    let report = node.run().await;

    // Servers may all exit on their own; release the signal listener too.
    shutdown.trigger();
    let _ = signals.await;

    tracing::info!(
        node = %kind,
        servers = report.servers,
        failed = report.failed,
        "Shutdown complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_version_override() {
        let args = NodeArgs::parse_from(["nf1", "--config", "x.json", "--http-version", "1"]);
        assert_eq!(args.config, Some(PathBuf::from("x.json")));
        assert_eq!(args.http_version, Some(1));

        let bare = NodeArgs::parse_from(["nf2"]);
        assert!(bare.config.is_none());
        assert!(bare.http_version.is_none());
    }

    #[tokio::test]
    async fn missing_config_fails_fast() {
        let args = NodeArgs {
            config: Some(PathBuf::from("/definitely/not/here.json")),
            http_version: None,
        };
        assert!(matches!(
            launch(NodeKind::Nf1, args).await,
            Err(StartupError::Config(ConfigError::Io { .. }))
        ));
    }

    #[tokio::test]
    async fn bad_version_override_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"endpoints": [{"address": "127.0.0.1:0", "role": "nf"}]}"#,
        )
        .unwrap();
        let args = NodeArgs {
            config: Some(file.path().to_path_buf()),
            http_version: Some(3),
        };
        assert!(matches!(
            launch(NodeKind::Nf2, args).await,
            Err(StartupError::HttpVersion(_))
        ));
    }
}
