//! Loki push API request body.
//!
//! Each push carries exactly one stream holding exactly one
//! `[timestamp, line]` pair, where the timestamp is the record's creation
//! time in Unix nanoseconds rendered as a decimal string.

use serde::Serialize;

use crate::sink::{Labels, PushEntry, PushError};

#[derive(Debug, Serialize)]
pub(super) struct PushRequest<'a> {
    streams: [Stream<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Stream<'a> {
    stream: &'a Labels,
    values: [(String, &'a str); 1],
}

impl<'a> PushRequest<'a> {
    pub(super) fn from_entry(entry: &'a PushEntry) -> Result<Self, PushError> {
        let nanos = entry
            .timestamp
            .timestamp_nanos_opt()
            .ok_or(PushError::TimestampOutOfRange(entry.timestamp))?;
        Ok(Self {
            streams: [Stream {
                stream: &entry.labels,
                values: [(nanos.to_string(), entry.line.as_str())],
            }],
        })
    }
}

/// Serialize `entry` into the JSON body expected by `/loki/api/v1/push`.
///
/// # Errors
///
/// Returns [`PushError::TimestampOutOfRange`] for timestamps that do not fit
/// in an `i64` nanosecond count and [`PushError::Encode`] if serialization
/// fails.
pub fn encode_push_request(entry: &PushEntry) -> Result<String, PushError> {
    let request = PushRequest::from_entry(entry)?;
    Ok(serde_json::to_string(&request)?)
}
