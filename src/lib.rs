//! Two cooperating HTTP nodes exchanging location messages.
//!
//! ```text
//!   client ──POST /nf2loc──▶ NF1 api ──POST /nf2──▶ NF2
//!                              │                     │ 200 ack, then after a delay
//!                              │ waits on correlator │
//!   client ◀── follow-up ───── NF1 notification ◀────┘ POST /nf1 {location, time}
//! ```
//!
//! Each node runs one server per configured endpoint under a supervisor that
//! stops them all on SIGINT/SIGTERM.

pub mod config;
pub mod exchange;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod node;
pub mod observability;

pub use config::{NodeConfig, NodeKind};
pub use lifecycle::Shutdown;
pub use node::Node;
