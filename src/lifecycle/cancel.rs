//! Cooperative cancellation for confirmation waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// Cancellation signal shared between a waiter and whoever may abort it.
///
/// Clones observe the same signal. Cancelling is sticky: waiters that
/// start after [`Cancellation::cancel`] return immediately.
#[derive(Clone, Debug)]
pub struct Cancellation {
    tx: broadcast::Sender<()>,
    fired: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal every current and future waiter.
    pub fn cancel(&self) {
        self.fired.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Resolve once [`Cancellation::cancel`] has been called.
    pub async fn cancelled(&self) {
        // Subscribe before checking the flag so a concurrent cancel is not missed.
        let mut rx = self.tx.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = rx.recv().await;
    }

    /// Number of tasks currently waiting.
    pub fn waiter_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let cancel = Cancellation::new();
        let waiter = {
            let cancel = cancel.clone();
            tokio::spawn(async move { cancel.cancelled().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cancel.waiter_count(), 1);
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_is_sticky() {
        let cancel = Cancellation::new();
        cancel.cancel();
        assert!(cancel.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), cancel.cancelled())
            .await
            .expect("already cancelled");
    }

    #[tokio::test]
    async fn test_uncancelled_keeps_waiting() {
        let cancel = Cancellation::new();
        let result = tokio::time::timeout(Duration::from_millis(20), cancel.cancelled()).await;
        assert!(result.is_err());
        assert!(!cancel.is_cancelled());
    }
}
