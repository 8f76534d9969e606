//! Per-request cancellation signal.
//!
//! A signal fires at most once. The first reason recorded is kept forever and
//! every clone observes it, so any number of tasks may poll or await the same
//! signal without coordinating with each other.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Why in-flight work was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The caller's time budget ran out.
    DeadlineExceeded,
    /// The caller went away or aborted explicitly.
    Cancelled,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
            CancelReason::Cancelled => write!(f, "request cancelled"),
        }
    }
}

/// One-shot, broadcastable "stop" indicator.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    tx: Arc<watch::Sender<Option<CancelReason>>>,
}

impl CancellationSignal {
    /// Create an unfired signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal.
    ///
    /// Returns `false` if it had already fired; the first reason is kept.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        let fired = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });

        if fired {
            tracing::debug!(reason = %reason, "Cancellation signalled");
        }
        fired
    }

    /// The recorded reason, if the signal has fired.
    pub fn reason(&self) -> Option<CancelReason> {
        *self.tx.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Wait until the signal fires.
    pub async fn cancelled(&self) -> CancelReason {
        let mut rx = self.tx.subscribe();
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(current) => *current,
            Err(_) => None,
        };

        match reason {
            Some(reason) => reason,
            // We hold the sender, so the channel cannot close underneath us.
            None => std::future::pending().await,
        }
    }

    /// Fire with `reason` once `budget` has elapsed.
    ///
    /// The timer is cancelled when the returned handle is dropped.
    pub fn cancel_after(&self, budget: Duration, reason: CancelReason) -> DeadlineTimer {
        let signal = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            signal.cancel(reason);
        });
        DeadlineTimer { handle }
    }

    /// Guard that fires [`CancelReason::Cancelled`] if dropped while armed.
    pub fn drop_guard(&self) -> DropGuard {
        DropGuard {
            signal: Some(self.clone()),
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Background timer created by [`CancellationSignal::cancel_after`].
#[derive(Debug)]
pub struct DeadlineTimer {
    handle: JoinHandle<()>,
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Fires the signal when the owning scope is abandoned.
#[derive(Debug)]
pub struct DropGuard {
    signal: Option<CancellationSignal>,
}

impl DropGuard {
    /// Consume the guard without firing.
    pub fn disarm(mut self) {
        self.signal = None;
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.cancel(CancelReason::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unfired() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());
        assert_eq!(signal.reason(), None);
    }

    #[test]
    fn first_reason_wins() {
        let signal = CancellationSignal::new();
        assert!(signal.cancel(CancelReason::DeadlineExceeded));
        assert!(!signal.cancel(CancelReason::Cancelled));
        assert_eq!(signal.reason(), Some(CancelReason::DeadlineExceeded));
    }

    #[test]
    fn clones_observe_the_same_signal() {
        let signal = CancellationSignal::new();
        let observer = signal.clone();
        signal.cancel(CancelReason::Cancelled);
        assert_eq!(observer.reason(), Some(CancelReason::Cancelled));
    }

    #[test]
    fn signals_are_independent() {
        let a = CancellationSignal::new();
        let b = CancellationSignal::new();
        a.cancel(CancelReason::Cancelled);
        assert!(!b.is_cancelled());
    }

    #[test]
    fn drop_guard_fires_cancelled() {
        let signal = CancellationSignal::new();
        drop(signal.drop_guard());
        assert_eq!(signal.reason(), Some(CancelReason::Cancelled));
    }

    #[test]
    fn disarmed_guard_does_not_fire() {
        let signal = CancellationSignal::new();
        signal.drop_guard().disarm();
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn reason_text() {
        assert_eq!(CancelReason::DeadlineExceeded.to_string(), "deadline exceeded");
        assert_eq!(CancelReason::Cancelled.to_string(), "request cancelled");
    }

    #[tokio::test]
    async fn waiters_wake_on_cancel() {
        let signal = CancellationSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.cancelled().await })
        };

        tokio::task::yield_now().await;
        signal.cancel(CancelReason::Cancelled);

        assert_eq!(waiter.await.unwrap(), CancelReason::Cancelled);
    }

    #[tokio::test]
    async fn already_fired_resolves_immediately() {
        let signal = CancellationSignal::new();
        signal.cancel(CancelReason::DeadlineExceeded);
        assert_eq!(signal.cancelled().await, CancelReason::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_budget() {
        let signal = CancellationSignal::new();
        let _timer = signal.cancel_after(Duration::from_secs(1), CancelReason::DeadlineExceeded);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(!signal.is_cancelled());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(signal.reason(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_timer_never_fires() {
        let signal = CancellationSignal::new();
        drop(signal.cancel_after(Duration::from_secs(1), CancelReason::DeadlineExceeded));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!signal.is_cancelled());
    }
}
