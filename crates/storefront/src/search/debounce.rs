//! Cancellable debounce timer.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs at most one job at a time, each after a quiet period.
///
/// [`schedule_with`](Self::schedule_with) cancels whatever is pending or
/// running and starts the new job's timer from zero, so a burst of calls
/// results in only the last job running. Dropping the debouncer cancels the
/// pending job.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: Mutex::new(None),
        }
    }

    /// Replace the current job with the one `prepare` returns.
    ///
    /// The previous job is aborted even if its timer already fired and it
    /// is mid-way through running. `prepare` runs while the debouncer is
    /// locked, so concurrent callers are ordered: the caller whose `prepare`
    /// runs last owns the job that survives. Returning `None` leaves nothing
    /// scheduled.
    ///
    /// # Panics
    ///
    /// Panics if `prepare` returns a job outside a Tokio runtime.
    pub fn schedule_with<F>(&self, prepare: impl FnOnce() -> Option<F>)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet_period = self.quiet_period;
        let mut pending = self.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = prepare().map(|job| {
            tokio::spawn(async move {
                tokio::time::sleep(quiet_period).await;
                job.await;
            })
        });
    }

    /// Abort the pending or running job, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.lock().take() {
            handle.abort();
        }
    }

    /// Whether a job is waiting for its timer or still running.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
