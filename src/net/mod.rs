//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint config
//!     → listener.rs (address resolution, callback URLs)
//!     → tls.rs (server certificate, CA trust anchors)
//!     → Hand off to HTTP layer
//!
//! Outbound:
//!     → transport.rs (protocol-aware client bound to the CA)
//! ```
//!
//! # Design Decisions
//! - Certificates are read-only after load and shared freely
//! - TLS is selected by protocol version, never per request

pub mod listener;
pub mod tls;
pub mod transport;

pub use transport::{TransportConfig, TransportError};
