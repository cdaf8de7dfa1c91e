//! Server group supervision.
//!
//! # Responsibilities
//! - Launch every endpoint server of a node as its own task
//! - Stop all of them together when the shutdown signal fires
//! - Return only after every server task has finished
//!
//! # State Machine
//! ```text
//! Idle ──start()──▶ Running ──signal──▶ Stopping ──tally == N──▶ Stopped
//!                      │                                          ▲
//!                      └──────── every server exited on its own ──┘
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::http::server::{EndpointServer, ServerError, ServerStopper};
use crate::lifecycle::shutdown::Shutdown;

/// Supervisor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Count of server tasks that have finished.
#[derive(Debug)]
pub struct CompletionTally {
    done: AtomicUsize,
    expected: usize,
}

impl CompletionTally {
    pub fn new(expected: usize) -> Self {
        Self {
            done: AtomicUsize::new(0),
            expected,
        }
    }

    /// Record one finished server. Returns the new count.
    pub fn record(&self) -> usize {
        self.done.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.done.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.count() >= self.expected
    }
}

/// Outcome of a supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    /// Servers the group was started with.
    pub servers: usize,
    /// Server tasks that finished (always equals `servers`).
    pub stopped: usize,
    /// Servers that exited with an error or panicked.
    pub failed: usize,
    /// `stop()` calls issued on shutdown.
    pub stop_invocations: usize,
}

type ServerOutcome = (String, Result<(), ServerError>);

/// Owns the endpoint servers of one node.
pub struct ServerGroup {
    name: String,
    stoppers: Vec<ServerStopper>,
    tasks: JoinSet<ServerOutcome>,
    shutdown: Shutdown,
    tally: Arc<CompletionTally>,
    state: watch::Sender<SupervisorState>,
}

impl ServerGroup {
    /// Launch every server and enter `Running`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(name: impl Into<String>, servers: Vec<EndpointServer>, shutdown: Shutdown) -> Self {
        let name = name.into();
        let (state, _) = watch::channel(SupervisorState::Idle);
        let tally = Arc::new(CompletionTally::new(servers.len()));
        let mut stoppers = Vec::with_capacity(servers.len());
        let mut tasks = JoinSet::new();

        tracing::info!(group = %name, servers = servers.len(), "Starting servers");
        for server in servers {
            stoppers.push(server.stopper());
            tasks.spawn(async move {
                let server_name = server.name().to_string();
                let result = server.start().await;
                (server_name, result)
            });
        }
        state.send_replace(SupervisorState::Running);

        Self {
            name,
            stoppers,
            tasks,
            shutdown,
            tally,
            state,
        }
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.borrow()
    }

    /// Observe state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SupervisorState> {
        self.state.subscribe()
    }

    pub fn tally(&self) -> Arc<CompletionTally> {
        self.tally.clone()
    }

    /// Stop levers, e.g. to learn bound addresses.
    pub fn stoppers(&self) -> &[ServerStopper] {
        &self.stoppers
    }

    /// Block until every server has stopped.
    pub async fn run(mut self) -> GroupReport {
        let token = self.shutdown.token();
        let mut stopping = false;
        let mut failed = 0;
        let mut stop_invocations = 0;

        while !self.tally.is_complete() {
            tokio::select! {
                _ = token.cancelled(), if !stopping => {
                    stopping = true;
                    self.state.send_replace(SupervisorState::Stopping);
                    tracing::info!(group = %self.name, "Stopping servers");
                    for stopper in &self.stoppers {
                        stopper.stop();
                        stop_invocations += 1;
                    }
                }
                joined = self.tasks.join_next() => {
                    match joined {
                        Some(Ok((_, Ok(())))) => {}
                        Some(Ok((server, Err(_)))) => {
                            tracing::warn!(group = %self.name, server = %server, "Server exited without serving");
                            failed += 1;
                        }
                        Some(Err(e)) => {
                            tracing::error!(group = %self.name, error = %e, "Server task panicked");
                            failed += 1;
                        }
                        None => break,
                    }
                    let done = self.tally.record();
                    tracing::debug!(group = %self.name, done, total = self.stoppers.len(), "Server finished");
                }
            }
        }

        self.state.send_replace(SupervisorState::Stopped);
        tracing::info!(group = %self.name, "Exiting servers");

        GroupReport {
            servers: self.stoppers.len(),
            stopped: self.tally.count(),
            failed,
            stop_invocations,
        }
    }
}
