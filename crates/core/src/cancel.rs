//! Cooperative cancellation
//!
//! A watch-channel token pair: long-running operations poll
//! `CancelToken::is_cancelled` between iterations (batchers return partial
//! results, streams emit a terminal error event) and may await `cancelled()`
//! inside `select!` loops.

use tokio::sync::watch;

/// Create a linked handle/token pair
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Owning side; dropping it does NOT cancel, call `cancel()` explicitly
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation to every token clone
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cheap clonable token observed by workers
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never cancels, for callers without a lifecycle
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Keep the sender alive forever so the channel never closes
        std::mem::forget(tx);
        Self { rx }
    }

    /// Non-blocking cancellation check
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is signalled (or the handle is dropped)
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without cancelling; treat as cancelled so
                // orphaned workers wind down.
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_signals_all_clones() {
        let (handle, token) = cancel_pair();
        let token2 = token.clone();

        assert!(!token.is_cancelled());
        assert!(!token2.is_cancelled());

        handle.cancel();

        assert!(token.is_cancelled());
        assert!(token2.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_never_token() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let (handle, token) = cancel_pair();
        let waiter = tokio::spawn(async move { token.cancelled().await });
        handle.cancel();
        waiter.await.unwrap();
    }
}
