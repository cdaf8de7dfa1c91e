//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Logging/metrics → Build node → Run
//!
//! Supervision (supervisor.rs):
//!     Start K servers → wait for shutdown → stop each → collect K completions
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - One shutdown signal per process, observed by servers and handlers alike
//! - The supervisor returns only after every server task has finished

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use startup::{launch, NodeArgs, StartupError};
pub use supervisor::{GroupReport, ServerGroup, SupervisorState};
