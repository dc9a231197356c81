//! The object producers log through.
//!
//! A [`LogManager`] owns the frozen [`TemplateRegistry`] and the
//! [`Dispatcher`]. It is built once at startup with
//! [`LogManagerBuilder`](crate::LogManagerBuilder) and shared with producers
//! behind an `Arc`; there is no process-global instance.

use crate::{
    builder::LogManagerBuilder,
    dispatcher::{DispatchError, DispatchSummary, Dispatcher, DispatcherState},
    level::LogLevel,
    log_record::{Fields, LogRecord},
    template::{Args, TemplateRegistry},
};

#[derive(Debug)]
pub struct LogManager {
    templates: TemplateRegistry,
    dispatcher: Dispatcher,
}

impl LogManager {
    pub fn builder() -> LogManagerBuilder {
        LogManagerBuilder::new()
    }

    pub(crate) fn from_parts(templates: TemplateRegistry, dispatcher: Dispatcher) -> Self {
        Self {
            templates,
            dispatcher,
        }
    }

    /// Read-only view of the registered templates.
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Build a record whose message is `template` rendered with `args`.
    ///
    /// `template` is looked up case-insensitively; an unknown name is used as
    /// the template text itself. `kind` is upper-cased. The record is stamped
    /// with the current time and is not sent anywhere.
    pub fn build_log(
        &self,
        kind: &str,
        template: &str,
        level: LogLevel,
        fields: Fields,
        args: &Args<'_>,
    ) -> LogRecord {
        let message = self.templates.resolve(template, args);
        LogRecord::new(kind, level, message, fields)
    }

    /// Write `record` to the console and hand it to the dispatcher.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::enqueue`].
    pub fn send_log(&self, record: LogRecord) -> Result<(), DispatchError> {
        self.dispatcher.enqueue(record)
    }

    /// Build and send a record in one step.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::enqueue`].
    pub fn log(
        &self,
        kind: &str,
        template: &str,
        level: LogLevel,
        fields: Fields,
        args: &Args<'_>,
    ) -> Result<(), DispatchError> {
        self.send_log(self.build_log(kind, template, level, fields, args))
    }

    /// Drain outstanding records and stop the dispatcher.
    pub fn shutdown(&self) -> DispatchSummary {
        self.dispatcher.shutdown()
    }

    pub fn state(&self) -> DispatcherState {
        self.dispatcher.state()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleConfig;
    use crate::test_utils::{CollectingSink, SharedBuf};
    use chrono::Utc;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn manager() -> LogManager {
        LogManager::builder()
            .with_template("GREETING", "hello {}")
            .build()
            .expect("build")
    }

    #[test]
    fn build_log_resolves_template_and_stamps_time() {
        let manager = manager();
        let before = Utc::now();
        let mut fields = Fields::new();
        fields.insert("ip".into(), json!("10.0.0.7"));
        let record = manager.build_log("http", "greeting", LogLevel::Warn, fields, &[&"bob"]);
        let after = Utc::now();

        assert_eq!(record.message(), "hello bob");
        assert_eq!(record.kind(), "HTTP");
        assert_eq!(record.level(), LogLevel::Warn);
        assert_eq!(record.fields()["ip"], json!("10.0.0.7"));
        assert!(before <= record.timestamp() && record.timestamp() <= after);
    }

    #[test]
    fn build_log_falls_back_to_name_as_template() {
        let manager = manager();
        let record = manager.build_log("x", "X_UNKNOWN", LogLevel::Info, Fields::new(), &[&1, &2]);
        assert_eq!(
            record.message(),
            manager.templates().resolve("X_UNKNOWN", &[&1, &2])
        );
        assert_eq!(record.message(), "X_UNKNOWN {!EXTRA: 1, 2}");
    }

    #[test]
    fn log_sends_through_dispatcher() {
        let sink = CollectingSink::new("events");
        let buf = SharedBuf::default();
        let manager = LogManager::builder()
            .with_console_writer(buf.clone(), ConsoleConfig::default())
            .with_remote_sink(Arc::new(sink.clone()))
            .build()
            .expect("build");

        manager
            .log("action", "GenericError", LogLevel::Error, Fields::new(), &[&"disk"])
            .expect("log");
        let summary = manager.shutdown();

        assert_eq!(summary.pushed, 1);
        assert!(buf.contents_string().contains("An error occurred: disk"));
        assert!(sink.collected()[0].line.contains("An error occurred: disk"));
    }

    proptest! {
        #[test]
        fn build_log_preserves_inputs(
            kind in "[a-zA-Z_]{0,12}",
            level in prop_oneof![
                Just(LogLevel::Debug),
                Just(LogLevel::Info),
                Just(LogLevel::Warn),
                Just(LogLevel::Error),
            ],
            message in "[a-z ]{0,20}",
        ) {
            let manager = LogManager::builder().with_console_disabled().build().expect("build");
            let record = manager.build_log(&kind, &message, level, Fields::new(), &[]);
            prop_assert_eq!(record.kind(), kind.to_uppercase());
            prop_assert_eq!(record.level(), level);
            prop_assert_eq!(record.message(), message.as_str());
        }
    }
}
