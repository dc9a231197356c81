//! Formatters turning [`LogRecord`]s into console lines.
//!
//! [`TextFormatter`] produces logfmt-style `key=value` lines with the fixed
//! keys (`time`, `level`, `msg`, `type`, `error`) first and the record's
//! fields after them in key order. [`JsonFormatter`] emits the same JSON
//! document that is pushed to Loki.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use chrono::SecondsFormat;
use log::warn;
use serde_json::Value;

use crate::log_record::LogRecord;

/// Trait for formatting log records into strings.
///
/// Implementors must be `Send + Sync` so a single formatter can serve every
/// producer thread.
pub trait RecordFormatter: Send + Sync {
    /// Format a log record into a single line (without trailing newline).
    fn format(&self, record: &LogRecord) -> String;
}

/// Shared formatter trait object used by the console sink.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn RecordFormatter>,
}

impl SharedFormatter {
    pub fn new<F>(formatter: F) -> Self
    where
        F: RecordFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    pub fn format(&self, record: &LogRecord) -> String {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(TextFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn RecordFormatter>)")
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct TextFormatter;

impl RecordFormatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(96);
        let time = record
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        push_pair(&mut line, "time", &time);
        push_pair(&mut line, "level", record.level().as_wire_str());
        push_pair(&mut line, "msg", record.message());
        push_pair(&mut line, "type", record.kind());
        if let Some(error) = record.error() {
            push_pair(&mut line, "error", error);
        }
        for (key, value) in record.fields() {
            match value {
                Value::String(text) => push_pair(&mut line, key, text),
                other => push_pair(&mut line, key, &other.to_string()),
            }
        }
        line
    }
}

fn push_pair(line: &mut String, key: &str, value: &str) {
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(key);
    line.push('=');
    if needs_quoting(value) {
        // Debug formatting escapes quotes, backslashes and control characters.
        let _ = write!(line, "{value:?}");
    } else {
        line.push_str(value);
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || !value.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+' | ':')
        })
}

#[derive(Copy, Clone, Debug, Default)]
pub struct JsonFormatter;

impl RecordFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> String {
        match record.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!("JsonFormatter: failed to serialize record: {err}");
                record.to_string()
            }
        }
    }
}
