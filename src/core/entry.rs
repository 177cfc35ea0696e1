//! # Registry entries and the futures handed out to callers.
//!
//! Every live delay is a pair:
//! ```text
//! Entry (owned by the registry)              PendingDelay (owned by the caller)
//!   ├─ tx:     oneshot::Sender ───────────────► oneshot::Receiver
//!   ├─ timer:  CancellationToken ──► timer task (sleep / cancelled)
//!   └─ generation
//! ```
//!
//! ## Rules
//! - The sender is consumed exactly once (natural completion, cancel, or teardown).
//! - An entry dropped without settlement (replaced by `update`) abandons its future:
//!   the [`PendingDelay`] then never completes.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::TimeoutError;

/// Outcome delivered to a [`PendingDelay`].
pub(crate) type Outcome = Result<String, TimeoutError>;

/// Registry-side half of a live delay.
pub(crate) struct Entry {
    /// Distinguishes this entry from earlier entries that used the same identifier.
    pub(crate) generation: u64,
    /// Settlement handle; consumed by [`Entry::settle`].
    tx: oneshot::Sender<Outcome>,
    /// Retires the timer task when cancelled.
    timer: CancellationToken,
}

impl Entry {
    /// Creates an entry and the caller-side future bound to it.
    pub(crate) fn new(generation: u64) -> (Self, PendingDelay) {
        let (tx, rx) = oneshot::channel();
        let entry = Self {
            generation,
            tx,
            timer: CancellationToken::new(),
        };
        (entry, PendingDelay::new(rx))
    }

    /// Token the timer task waits on.
    pub(crate) fn timer_token(&self) -> CancellationToken {
        self.timer.clone()
    }

    /// Stops the timer task. Idempotent.
    pub(crate) fn retire(&self) {
        self.timer.cancel();
    }

    /// Retires the timer and delivers `outcome`.
    ///
    /// Returns the outcome back if the caller already dropped its future.
    pub(crate) fn settle(self, outcome: Outcome) -> Result<(), Outcome> {
        self.retire();
        self.tx.send(outcome)
    }

    /// Retires the timer and drops the sender without settling.
    pub(crate) fn abandon(self) {
        self.retire();
    }
}

/// Future returned by [`TimeoutRegistry::create`](crate::TimeoutRegistry::create)
/// and [`TimeoutRegistry::update`](crate::TimeoutRegistry::update).
///
/// Resolves with `Ok("Timeout {id} completed")` when the delay fires, or with
/// [`TimeoutError::Cancelled`] when it is cancelled or torn down.
/// A future whose delay was rescheduled through `update` never completes.
#[must_use = "futures do nothing unless polled"]
#[derive(Debug)]
pub struct PendingDelay {
    rx: oneshot::Receiver<Outcome>,
    abandoned: bool,
}

impl PendingDelay {
    fn new(rx: oneshot::Receiver<Outcome>) -> Self {
        Self {
            rx,
            abandoned: false,
        }
    }
}

impl Future for PendingDelay {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.abandoned {
            return Poll::Pending;
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Sender dropped without settling: the delay was replaced.
            Poll::Ready(Err(_)) => {
                self.abandoned = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A freshly created cancellable delay: its identifier plus the future to await.
#[must_use = "the delay's future should be awaited or its id kept for cancellation"]
#[derive(Debug)]
pub struct CancellableDelay {
    /// Identifier accepted by `cancel` and `update`.
    pub id: String,
    /// Completes when the delay fires or is cancelled.
    pub future: PendingDelay,
}

impl CancellableDelay {
    /// Splits into `(id, future)`.
    pub fn into_parts(self) -> (String, PendingDelay) {
        (self.id, self.future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_settle_delivers_outcome() {
        let (entry, fut) = Entry::new(1);
        let token = entry.timer_token();
        assert!(entry.settle(Ok("done".into())).is_ok());
        assert!(token.is_cancelled());
        assert_eq!(fut.await, Ok("done".to_string()));
    }

    #[tokio::test]
    async fn test_settle_reports_dropped_receiver() {
        let (entry, fut) = Entry::new(1);
        drop(fut);
        let err = TimeoutError::cancelled("id", None);
        assert_eq!(entry.settle(Err(err.clone())), Err(Err(err)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_future_never_completes() {
        let (entry, fut) = Entry::new(1);
        let token = entry.timer_token();
        entry.abandon();
        assert!(token.is_cancelled());
        let res = tokio::time::timeout(Duration::from_secs(60), fut).await;
        assert!(res.is_err(), "abandoned future must stay pending");
    }
}
