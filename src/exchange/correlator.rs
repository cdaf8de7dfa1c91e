//! Single-slot hand-off between the trigger and receiver handlers.
//!
//! # Responsibilities
//! - Hold at most one delivered message until a trigger withdraws it
//! - Wake exactly one waiting trigger per deposit
//! - Abort a wait on cancellation or deadline without consuming the slot
//!
//! # Design Decisions
//! - Capacity is one; a second deposit before withdrawal replaces the first
//!   (last write wins) and the replaced message is returned to the depositor
//! - One exchange in flight at a time; concurrent waiters race for the slot
//! - Happens-before between deposit and withdrawal comes from the slot lock

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::exchange::error::ExchangeError;
use crate::exchange::message::LocationMessage;

/// Capacity-1 gate pairing a trigger's wait with a receiver's deposit.
#[derive(Debug, Default)]
pub struct CorrelationGate {
    slot: Mutex<Option<LocationMessage>>,
    ready: Notify,
}

impl CorrelationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a delivered message and wake one waiter.
    ///
    /// Returns the unconsumed message this deposit replaced, if any.
    pub fn deposit(&self, message: LocationMessage) -> Option<LocationMessage> {
        let replaced = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(message);
        if let Some(old) = &replaced {
            tracing::warn!(location = %old.location, "Unconsumed delivery replaced");
        }
        self.ready.notify_one();
        replaced
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn take(&self) -> Option<LocationMessage> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Block until a deposit is available, `cancel` fires, or `timeout` passes.
    pub async fn await_delivery(
        &self,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<LocationMessage, ExchangeError> {
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            // Register before checking the slot so a deposit landing in
            // between still wakes us.
            notified.as_mut().enable();

            if let Some(message) = self.take() {
                return Ok(message);
            }

            tokio::select! {
                _ = &mut notified => continue,
                _ = cancel.cancelled() => return Err(ExchangeError::Cancelled),
                _ = &mut deadline => return Err(ExchangeError::TimedOut(timeout)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn msg(location: &str) -> LocationMessage {
        LocationMessage {
            location: location.to_string(),
            time: "t".to_string(),
        }
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn deposit_before_wait_is_delivered() {
        let gate = CorrelationGate::new();
        let token = CancellationToken::new();

        assert!(gate.deposit(msg("a")).is_none());
        assert!(gate.is_pending());
        assert_eq!(gate.await_delivery(&token, WAIT).await.unwrap(), msg("a"));
        assert!(!gate.is_pending());
    }

    #[tokio::test]
    async fn deposit_wakes_pending_waiter() {
        let gate = Arc::new(CorrelationGate::new());
        let token = CancellationToken::new();

        let waiter = {
            let gate = gate.clone();
            let token = token.clone();
            tokio::spawn(async move { gate.await_delivery(&token, WAIT).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.deposit(msg("b"));

        assert_eq!(waiter.await.unwrap().unwrap(), msg("b"));
        assert!(!gate.is_pending());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let gate = CorrelationGate::new();
        let token = CancellationToken::new();

        gate.deposit(msg("first"));
        assert_eq!(gate.deposit(msg("second")), Some(msg("first")));
        assert_eq!(gate.await_delivery(&token, WAIT).await.unwrap(), msg("second"));
    }

    #[tokio::test]
    async fn cancellation_does_not_consume() {
        let gate = Arc::new(CorrelationGate::new());
        let token = CancellationToken::new();

        let waiter = {
            let gate = gate.clone();
            let token = token.clone();
            tokio::spawn(async move { gate.await_delivery(&token, WAIT).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        assert!(matches!(waiter.await.unwrap(), Err(ExchangeError::Cancelled)));

        gate.deposit(msg("late"));
        let fresh = CancellationToken::new();
        assert_eq!(gate.await_delivery(&fresh, WAIT).await.unwrap(), msg("late"));
    }

    #[tokio::test]
    async fn wait_times_out() {
        let gate = CorrelationGate::new();
        let token = CancellationToken::new();

        let result = gate.await_delivery(&token, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ExchangeError::TimedOut(_))));
    }

    #[tokio::test]
    async fn stale_wakeup_does_not_return_empty() {
        let gate = Arc::new(CorrelationGate::new());
        let token = CancellationToken::new();

        // Deposit and withdraw, leaving a stored notify permit behind.
        gate.deposit(msg("x"));
        gate.await_delivery(&token, WAIT).await.unwrap();
        gate.ready.notify_one();

        let waiter = {
            let gate = gate.clone();
            let token = token.clone();
            tokio::spawn(async move { gate.await_delivery(&token, WAIT).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        gate.deposit(msg("y"));
        assert_eq!(waiter.await.unwrap().unwrap(), msg("y"));
    }
}
