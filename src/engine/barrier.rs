//! Join-barrier for a known number of workers.
//!
//! Each worker holds a [`CompletionGuard`]. Dropping the guard is the
//! completion signal, so a worker that panics still releases the barrier
//! while its task unwinds.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

struct Inner {
    pending: AtomicUsize,
    released: Notify,
}

/// Wait-group: blocks [`WaitGroup::wait`] until every issued guard is dropped.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

/// Completion signal for one worker. Signals exactly once, on drop.
#[must_use = "dropping the guard immediately signals completion"]
pub struct CompletionGuard {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: AtomicUsize::new(0),
                released: Notify::new(),
            }),
        }
    }

    /// Register one more worker and hand back its completion guard.
    pub fn add(&self) -> CompletionGuard {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        CompletionGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of guards not yet dropped.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Wait until every outstanding guard has been dropped.
    ///
    /// Returns immediately if nothing is pending.
    pub async fn wait(&self) {
        loop {
            let released = self.inner.released.notified();
            tokio::pin!(released);
            // Register before checking the count so a release between the
            // check and the await is not missed.
            released.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            released.await;
        }
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.released.notify_waiters();
        }
    }
}
