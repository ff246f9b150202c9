//! Cancellable timer for debounced search.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs an action once no new call has arrived for `delay`.
///
/// Scheduling or cancelling only affects the pending timer. Once the timer
/// has fired, the action runs to completion regardless of later calls.
#[derive(Default)]
pub struct SearchDebouncer {
    pending: Mutex<Option<CancellationToken>>,
}

impl SearchDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any pending timer with a new one that runs `action` after
    /// `delay`. Must be called within a tokio runtime.
    pub fn schedule<F, Fut>(&self, delay: Duration, action: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        if let Some(previous) = self.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Debounced search superseded");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            action().await;
        })
    }

    /// Cancels the pending timer, if any. In-flight actions are unaffected.
    pub fn cancel(&self) {
        if let Some(pending) = self.lock().take() {
            pending.cancel();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
