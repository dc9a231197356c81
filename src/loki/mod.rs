//! Remote sink for the Grafana Loki push API.
//!
//! [`LokiSink`] serializes a single [`PushEntry`](crate::sink::PushEntry)
//! into Loki's JSON push format and POSTs it to the configured endpoint:
//!
//! ```text
//! {"streams":[{"stream":{"job":"<job>","type":"<kind>"},
//!              "values":[["<unix-ns>","<record json>"]]}]}
//! ```
//!
//! # Delivery semantics
//!
//! - **Disabled or no URL**: every push succeeds immediately without I/O.
//! - **200 / 204**: success.
//! - **Any other status**: [`PushError::UnexpectedStatus`](crate::sink::PushError).
//! - **Network errors and timeouts**: [`PushError::Transport`](crate::sink::PushError).
//!
//! Nothing is retried; the dispatcher logs the failure and moves on.

mod client;
mod config;
mod payload;

#[cfg(test)]
mod tests;

pub use client::LokiSink;
pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, LokiConfig};
pub use payload::encode_push_request;
