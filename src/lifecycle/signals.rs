//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM
//! - Fire the node's shutdown signal exactly once on receipt
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The listener exits when shutdown fires by other means, so it never
//!   outlives the node

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Wait for an interrupt or terminate signal and return its name.
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        let mut interrupt = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = terminate.recv() => Ok("SIGTERM"),
            _ = interrupt.recv() => Ok("SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("ctrl-c")
    }
}

/// Spawn a task that triggers `shutdown` when a signal arrives.
pub fn spawn_signal_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            received = wait_for_signal() => match received {
                Ok(name) => {
                    tracing::info!(signal = name, "Received signal");
                    shutdown.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handlers");
                }
            },
            _ = shutdown.wait() => {}
        }
    })
}
