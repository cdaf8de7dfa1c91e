//! Cross-node location exchange.
//!
//! # Data Flow
//! ```text
//! NF1 trigger (/nf2loc)
//!     → forwarder.rs (POST own callback location to NF2)
//!     → correlator.rs (wait for NF2's follow-up)
//!     → reply with the follow-up payload
//!
//! NF1 receiver (/nf1)
//!     → message.rs (decode)
//!     → correlator.rs (deposit, wakes the trigger)
//! ```
//!
//! # Design Decisions
//! - The correlator is the only mutable state shared across requests
//! - Every suspend point takes the process cancellation token
//! - Errors surface to callers as a status code only

pub mod correlator;
pub mod error;
pub mod forwarder;
pub mod message;

pub use correlator::CorrelationGate;
pub use error::ExchangeError;
pub use forwarder::{Forwarder, PeerResponse};
pub use message::LocationMessage;
