//! Shutdown coordination.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::signals::wait_for_signal;

/// Fan-out stop notice for the server and its background tasks.
///
/// Clones share one channel, so any holder may trigger and every subscriber
/// is woken.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Wake every subscriber. A no-op when nobody is listening.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no subscribers");
        }
    }

    /// Trigger once the process receives SIGINT or SIGTERM.
    pub fn trigger_on_signal(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        let mut server = shutdown.subscribe();
        let mut worker = shutdown.subscribe();

        shutdown.trigger();

        assert!(server.recv().await.is_ok());
        assert!(worker.recv().await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        shutdown.clone().trigger();

        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn trigger_without_subscribers_is_harmless() {
        Shutdown::new().trigger();
    }

    #[tokio::test]
    async fn signal_listener_stays_pending_until_signalled() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let listener = shutdown.trigger_on_signal();

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert!(!listener.is_finished());

        listener.abort();
    }
}
