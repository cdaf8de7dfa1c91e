//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum-server listener, protocol detection, middleware)
//!     → request.rs (request ID, request dump)
//!     → node handlers (trigger / receiver)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{with_common_layers, EndpointServer, ServerError, ServerStopper};
