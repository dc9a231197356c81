//! The remote delivery seam used by the dispatcher worker.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Label set identifying a Loki stream.
pub type Labels = BTreeMap<String, String>;

/// Label carrying the configured job name.
pub const JOB_LABEL: &str = "job";
/// Label carrying the record's classification tag.
pub const TYPE_LABEL: &str = "type";

/// Build the `{job, type}` label set for one record.
pub fn stream_labels(job: &str, kind: &str) -> Labels {
    Labels::from([
        (JOB_LABEL.to_owned(), job.to_owned()),
        (TYPE_LABEL.to_owned(), kind.to_owned()),
    ])
}

/// One timestamped line destined for a single stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushEntry {
    pub labels: Labels,
    pub timestamp: DateTime<Utc>,
    pub line: String,
}

/// Errors reported by a [`RemoteSink`].
#[derive(Debug, Error)]
pub enum PushError {
    /// The push payload could not be serialized.
    #[error("failed to marshal push payload: {0}")]
    Encode(#[from] serde_json::Error),
    /// The timestamp lies outside the range representable in nanoseconds.
    #[error("timestamp {0} cannot be expressed as unix nanoseconds")]
    TimestampOutOfRange(DateTime<Utc>),
    /// The request never produced an HTTP response.
    #[error("failed to send request to {url}: {message}")]
    Transport { url: String, message: String },
    /// The backend answered with a status other than 200 or 204.
    #[error("unexpected response from {url}: {status}")]
    UnexpectedStatus { url: String, status: u16 },
}

/// Destination for records leaving the dispatcher worker.
///
/// Implementations are shared with the worker thread and must therefore be
/// `Send + Sync`. `push` is called for one record at a time.
pub trait RemoteSink: Send + Sync {
    /// Deliver a single entry.
    fn push(&self, entry: &PushEntry) -> Result<(), PushError>;

    /// Whether pushes actually reach a backend. Failures of a disabled sink
    /// are not reported.
    fn is_enabled(&self) -> bool;

    /// Value of the `job` label attached to every stream.
    fn job(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_contain_job_and_type() {
        let labels = stream_labels("events", "ACTION");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[JOB_LABEL], "events");
        assert_eq!(labels[TYPE_LABEL], "ACTION");
    }
}
