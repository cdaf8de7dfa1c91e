//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NodeConfig (validated, immutable)
//!     → shared via Arc to every server and handler
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never mutated afterwards
//! - All fields except endpoints have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{log_config, read_config, ConfigError};
pub use schema::{
    EndpointConfig, EndpointRole, HttpVersion, LimitsConfig, NodeConfig, NodeKind,
    ObservabilityConfig, TimeoutConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
