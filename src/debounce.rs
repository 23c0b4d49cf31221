//! Delayed callback with at most one pending invocation.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs a callback once input has been quiet for the given delay.
///
/// Each [`schedule`](Debouncer::schedule) replaces whatever was pending, so a
/// burst of calls collapses into a single invocation of the last callback.
/// Must be used from within a tokio runtime.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn schedule<F>(&mut self, callback: F, delay: Duration)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Drop the pending callback without running it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
