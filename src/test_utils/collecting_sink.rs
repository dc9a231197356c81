//! A remote sink that accumulates entries in memory for test assertions.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::sink::{PushEntry, PushError, RemoteSink};

/// Sink that stores every entry it receives for later inspection.
///
/// It can be told to fail a number of initial pushes and to sleep on every
/// push, which lets tests exercise error handling and backpressure without a
/// network.
#[derive(Clone)]
pub struct CollectingSink {
    entries: Arc<Mutex<Vec<PushEntry>>>,
    failures_left: Arc<AtomicUsize>,
    delay: Duration,
    enabled: bool,
    job: String,
}

impl CollectingSink {
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            failures_left: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            enabled: true,
            job: job.into(),
        }
    }

    /// Fail the first `count` pushes with [`PushError::UnexpectedStatus`].
    pub fn failing_first(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Sleep for `delay` inside every push.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report the sink as disabled; failures are then not logged.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Return a snapshot of every successfully pushed entry.
    pub fn collected(&self) -> Vec<PushEntry> {
        self.entries.lock().clone()
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl RemoteSink for CollectingSink {
    fn push(&self, entry: &PushEntry) -> Result<(), PushError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.take_failure() {
            return Err(PushError::UnexpectedStatus {
                url: "memory://collecting".to_owned(),
                status: 500,
            });
        }
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn job(&self) -> &str {
        &self.job
    }
}
