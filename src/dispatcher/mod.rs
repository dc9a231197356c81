//! Single-consumer delivery pipeline.
//!
//! [`Dispatcher`] moves [`LogRecord`]s from any number of producer threads to
//! one background worker. Each [`enqueue`](Dispatcher::enqueue) call first
//! writes the record to the console sink on the caller's thread and then hands
//! it over a rendezvous queue, blocking until the worker has taken it. A slow
//! remote push therefore delays the *next* producer's hand-off, never the
//! current producer's console line.
//!
//! # Lifecycle
//!
//! ```text
//! Running ──shutdown()──▶ Draining ──queue empty──▶ Closed
//! ```
//!
//! `shutdown` clears the accepting flag before releasing the queue, so a
//! record offered afterwards is rejected with [`DispatchError::Closed`]
//! rather than racing the closing queue. Records already handed over, or
//! whose hand-off was in flight when the flag flipped, are drained before
//! `shutdown` returns.

mod worker;


use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use log::warn;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::{
    console::ConsoleSink, log_record::LogRecord, rate_limited_warner::RateLimitedWarner,
    sink::RemoteSink,
};

pub use worker::DispatchSummary;

/// Errors returned to producers by [`Dispatcher::enqueue`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// `shutdown` has been called; the record was written to the console only.
    #[error("dispatcher is shut down; record was not queued")]
    Closed,
    /// The worker thread is gone (it panicked); the record was not queued.
    #[error("dispatch worker is no longer running")]
    WorkerUnavailable,
}

/// Observable lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatcherState {
    /// Accepting records.
    Running,
    /// Rejecting new records while the worker finishes accepted ones.
    Draining,
    /// The worker has exited.
    Closed,
}

pub struct Dispatcher {
    console: ConsoleSink,
    accepting: AtomicBool,
    closed: AtomicBool,
    tx: RwLock<Option<Sender<LogRecord>>>,
    handle: Mutex<Option<JoinHandle<DispatchSummary>>>,
    summary: Mutex<Option<DispatchSummary>>,
    warner: RateLimitedWarner,
}

impl Dispatcher {
    /// Start the worker thread.
    ///
    /// With `sink` set to `None` records are only written to the console.
    pub fn new(console: ConsoleSink, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        let (tx, handle) = worker::spawn_worker(sink);
        Self {
            console,
            accepting: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            tx: RwLock::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            summary: Mutex::new(None),
            warner: RateLimitedWarner::default(),
        }
    }

    /// Emit `record` locally, then hand it to the worker.
    ///
    /// Blocks until the worker has accepted the record.
    ///
    /// # Errors
    ///
    /// * [`DispatchError::Closed`] - called after [`shutdown`](Self::shutdown).
    /// * [`DispatchError::WorkerUnavailable`] - the worker thread has died.
    pub fn enqueue(&self, record: LogRecord) -> Result<(), DispatchError> {
        self.console.emit(&record);

        if !self.accepting.load(Ordering::Acquire) {
            return Err(self.reject());
        }
        let Some(tx) = self.sender() else {
            return Err(self.reject());
        };
        tx.send(record).map_err(|_| {
            warn!("Dispatcher: worker is gone; record dropped");
            DispatchError::WorkerUnavailable
        })
    }

    /// Stop accepting records, drain the queue and join the worker.
    ///
    /// Every call returns the same summary; only the first one waits.
    pub fn shutdown(&self) -> DispatchSummary {
        self.accepting.store(false, Ordering::Release);
        drop(self.tx.write().take());

        let mut summary = self.summary.lock();
        if let Some(done) = *summary {
            return done;
        }
        let done = match self.handle.lock().take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                warn!("Dispatcher: worker thread panicked");
                DispatchSummary::default()
            }),
            None => DispatchSummary::default(),
        };
        *summary = Some(done);
        self.closed.store(true, Ordering::Release);
        self.warner.flush(|count| {
            warn!("Dispatcher rejected {count} records after shutdown");
        });
        done
    }

    pub fn state(&self) -> DispatcherState {
        if self.accepting.load(Ordering::Acquire) {
            DispatcherState::Running
        } else if self.closed.load(Ordering::Acquire) {
            DispatcherState::Closed
        } else {
            DispatcherState::Draining
        }
    }

    pub fn console(&self) -> &ConsoleSink {
        &self.console
    }

    fn sender(&self) -> Option<Sender<LogRecord>> {
        self.tx.read().as_ref().cloned()
    }

    fn reject(&self) -> DispatchError {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("Dispatcher rejected {count} records after shutdown");
        });
        DispatchError::Closed
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state())
            .field("console", &self.console)
            .finish()
    }
}
