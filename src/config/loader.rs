//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{NodeConfig, NodeKind};
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse config text. TOML is used when `path` ends in `.toml`, JSON otherwise.
pub fn parse_config(path: &Path, content: &str) -> Result<NodeConfig, ConfigError> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Read and parse a config file without validating it.
pub fn read_config(path: &Path) -> Result<NodeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(path, &content)
}

/// Log the accepted configuration, one structured line per setting.
pub fn log_config(kind: NodeKind, config: &NodeConfig) {
    tracing::info!(node = %kind, http_version = %config.http_version, "Configuration loaded");
    tracing::info!(
        remote_api_root = config.remote_api_root.as_deref().unwrap_or("<from inbound location>"),
        "Remote API"
    );
    tracing::info!(prefix = %config.local_api_root_prefix, "Local API root prefix");
    for endpoint in &config.endpoints {
        tracing::info!(
            address = %endpoint.address,
            role = endpoint.role.map(|r| r.as_str()).unwrap_or("none"),
            "Endpoint"
        );
    }
}
