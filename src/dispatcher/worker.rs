//! Background worker draining the dispatch queue.
//!
//! The worker receives records one at a time, in the order the queue
//! accepted them, and forwards each to the remote sink. It exits once every
//! sender has been dropped and the queue is empty.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{error, warn};

use crate::{
    log_record::LogRecord,
    sink::{PushEntry, RemoteSink, stream_labels},
};

/// Counters reported once the worker has stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Records taken off the queue.
    pub processed: u64,
    /// Push calls that reported success. A disabled sink reports success
    /// without sending anything.
    pub pushed: u64,
    /// Records whose serialization or push failed.
    pub failed: u64,
}

/// Spawn the worker and return the sending half of its rendezvous queue.
///
/// The queue has zero capacity: every send blocks until the worker is ready
/// to receive.
pub(crate) fn spawn_worker(
    sink: Option<Arc<dyn RemoteSink>>,
) -> (Sender<LogRecord>, JoinHandle<DispatchSummary>) {
    let (tx, rx) = bounded(0);
    let handle = thread::spawn(move || Worker::new(sink).run(rx));
    (tx, handle)
}

struct Worker {
    sink: Option<Arc<dyn RemoteSink>>,
    summary: DispatchSummary,
}

impl Worker {
    fn new(sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self {
            sink,
            summary: DispatchSummary::default(),
        }
    }

    fn run(mut self, rx: Receiver<LogRecord>) -> DispatchSummary {
        for record in rx {
            self.handle_record(record);
        }
        self.summary
    }

    fn handle_record(&mut self, record: LogRecord) {
        self.summary.processed += 1;
        let Some(sink) = self.sink.as_deref() else {
            return;
        };

        let line = match record.to_json() {
            Ok(line) => line,
            Err(err) => {
                warn!("Dispatcher: failed to serialize {} record: {err}", record.kind());
                self.summary.failed += 1;
                return;
            }
        };
        let entry = PushEntry {
            labels: stream_labels(sink.job(), record.kind()),
            timestamp: record.timestamp(),
            line,
        };

        match sink.push(&entry) {
            Ok(()) => self.summary.pushed += 1,
            Err(err) => {
                self.summary.failed += 1;
                if sink.is_enabled() {
                    error!("Dispatcher: failed to send log to Loki: {err}");
                }
            }
        }
    }
}
