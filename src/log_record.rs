//! Log record representation.
//!
//! A [`LogRecord`] captures one application event: the rendered message, the
//! upper-cased classification tag, the severity, free-form structured fields
//! and the creation time. The message, tag, level and timestamp are fixed once
//! the record exists; fields and the error description may still be appended
//! by the producer before the record is handed to the dispatcher.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::level::LogLevel;

/// Structured key-value pairs attached to a record.
///
/// A `BTreeMap` keeps serialization deterministic, so the same record always
/// produces the same bytes on the wire.
pub type Fields = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    kind: String,
    level: LogLevel,
    #[serde(rename = "additional_data", skip_serializing_if = "BTreeMap::is_empty")]
    fields: Fields,
    timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Construct a record stamped with the current time.
    pub fn new(kind: &str, level: LogLevel, message: impl Into<String>, fields: Fields) -> Self {
        Self::with_timestamp(kind, level, message, fields, Utc::now())
    }

    /// Construct a record with an explicit creation time.
    pub fn with_timestamp(
        kind: &str,
        level: LogLevel,
        message: impl Into<String>,
        fields: Fields,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            error: None,
            kind: kind.to_uppercase(),
            level,
            fields,
            timestamp,
        }
    }

    /// Attach an error description, consuming and returning the record.
    pub fn with_error(mut self, error: impl fmt::Display) -> Self {
        self.set_error(error);
        self
    }

    /// Attach an error description in place.
    pub fn set_error(&mut self, error: impl fmt::Display) {
        self.error = Some(error.to_string());
    }

    /// Insert or replace a structured field.
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Upper-cased classification tag, used as the Loki `type` label.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Serialize the record to its JSON line form.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.kind, self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn kind_is_upper_cased(fixed_time: DateTime<Utc>) {
        let record =
            LogRecord::with_timestamp("http", LogLevel::Warn, "hi", Fields::new(), fixed_time);
        assert_eq!(record.kind(), "HTTP");
        assert_eq!(record.level(), LogLevel::Warn);
        assert_eq!(record.timestamp(), fixed_time);
    }

    #[rstest]
    fn add_field_overwrites_existing_key(fixed_time: DateTime<Utc>) {
        let mut record =
            LogRecord::with_timestamp("x", LogLevel::Info, "m", Fields::new(), fixed_time);
        record.add_field("mac", "aa:bb");
        record.add_field("mac", "cc:dd");
        record.add_field("port", 3000);
        assert_eq!(record.fields().len(), 2);
        assert_eq!(record.fields()["mac"], json!("cc:dd"));
        assert_eq!(record.fields()["port"], json!(3000));
    }

    #[rstest]
    fn json_form_uses_wire_names(fixed_time: DateTime<Utc>) {
        let mut record =
            LogRecord::with_timestamp("action", LogLevel::Error, "boom", Fields::new(), fixed_time)
                .with_error("disk full");
        record.add_field("customer", "c-1");

        let parsed: Value = serde_json::from_str(&record.to_json().expect("json")).expect("parse");
        assert_eq!(parsed["message"], "boom");
        assert_eq!(parsed["error"], "disk full");
        assert_eq!(parsed["type"], "ACTION");
        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["additional_data"]["customer"], "c-1");
        assert_eq!(parsed["timestamp"], "2024-05-01T12:30:00Z");
    }

    #[rstest]
    fn empty_members_are_omitted(fixed_time: DateTime<Utc>) {
        let record = LogRecord::with_timestamp("", LogLevel::Info, "", Fields::new(), fixed_time);
        let parsed: Value = serde_json::from_str(&record.to_json().expect("json")).expect("parse");
        let object = parsed.as_object().expect("object");
        assert!(!object.contains_key("message"));
        assert!(!object.contains_key("error"));
        assert!(!object.contains_key("type"));
        assert!(!object.contains_key("additional_data"));
        assert!(object.contains_key("level"));
    }

    #[rstest]
    fn serialization_is_deterministic(fixed_time: DateTime<Utc>) {
        let mut fields = Fields::new();
        fields.insert("zeta".into(), json!(1));
        fields.insert("alpha".into(), json!({"nested": [1, 2]}));
        let record = LogRecord::with_timestamp("t", LogLevel::Debug, "m", fields, fixed_time);
        assert_eq!(
            record.to_json().expect("first"),
            record.clone().to_json().expect("second")
        );
    }
}
