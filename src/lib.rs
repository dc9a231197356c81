//! Template-based structured logging with asynchronous Loki delivery.
//!
//! Producers build [`LogRecord`]s through a [`LogManager`] and send them. Each
//! record is written to the console on the producer's thread, then handed to
//! a single background worker that pushes it to Grafana Loki. Delivery is
//! best effort: push failures are logged through the `log` facade and never
//! reach the producer.
//!
//! ```no_run
//! use lokilog::{Fields, LogLevel, LogManager, LoggingConfig, LogManagerBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = LogManagerBuilder::from_config(LoggingConfig::from_env()?)
//!     .with_template("CallStarted", "call {} started on {}")
//!     .build()?;
//! manager.log("action", "callstarted", LogLevel::Info, Fields::new(), &[&"42", &"desk-7"])?;
//! manager.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod formatter;
pub mod level;
pub mod log_record;
pub mod loki;
pub mod manager;
pub mod rate_limited_warner;
pub mod sink;
pub mod template;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use builder::{BuildError, LogManagerBuilder};
pub use config::{ConfigError, LoggingConfig};
pub use console::{ConsoleConfig, ConsoleFormat, ConsoleSink};
pub use dispatcher::{DispatchError, DispatchSummary, Dispatcher, DispatcherState};
pub use formatter::{JsonFormatter, RecordFormatter, SharedFormatter, TextFormatter};
pub use level::LogLevel;
pub use log_record::{Fields, LogRecord};
pub use loki::{LokiConfig, LokiSink};
pub use manager::LogManager;
pub use sink::{Labels, PushEntry, PushError, RemoteSink};
pub use template::{TemplateError, TemplateRegistry};
