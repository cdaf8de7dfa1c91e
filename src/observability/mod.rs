//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of preformatted strings
//! - Request ID and exchange ID flow through handler spans
//! - Metrics macros are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
