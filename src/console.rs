//! Local console emission.
//!
//! [`ConsoleSink`] writes one formatted line per record on the caller's
//! thread. The writer sits behind a mutex so that lines emitted by concurrent
//! producers never interleave, and console output therefore follows producer
//! call order.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use log::warn;
use parking_lot::Mutex;
use thiserror::Error;

use crate::{
    formatter::{JsonFormatter, SharedFormatter, TextFormatter},
    level::LogLevel,
    log_record::LogRecord,
};

/// Line format used by the console sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown console format: {0}")]
pub struct ParseFormatError(pub String);

impl FromStr for ConsoleFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ParseFormatError(s.to_owned())),
        }
    }
}

/// Console sink settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Records below this level are not written locally. They are still
    /// forwarded to the remote sink.
    pub level: LogLevel,
    pub format: ConsoleFormat,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: ConsoleFormat::Text,
        }
    }
}

pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    formatter: SharedFormatter,
    level: LogLevel,
}

impl ConsoleSink {
    /// Sink writing to `stdout` according to `config`.
    pub fn stdout(config: ConsoleConfig) -> Self {
        Self::new(io::stdout(), config)
    }

    /// Sink writing to an arbitrary writer according to `config`.
    pub fn new<W>(writer: W, config: ConsoleConfig) -> Self
    where
        W: Write + Send + 'static,
    {
        let formatter = match config.format {
            ConsoleFormat::Text => SharedFormatter::new(TextFormatter),
            ConsoleFormat::Json => SharedFormatter::new(JsonFormatter),
        };
        Self::with_formatter(writer, formatter, config.level)
    }

    /// Sink using a caller-supplied formatter.
    pub fn with_formatter<W>(writer: W, formatter: SharedFormatter, level: LogLevel) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Mutex::new(Box::new(writer)),
            formatter,
            level,
        }
    }

    /// Sink that discards everything.
    pub fn disabled() -> Self {
        Self::new(io::sink(), ConsoleConfig::default())
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Write `record` if its level passes the threshold.
    ///
    /// Write failures are reported through the `log` facade and otherwise
    /// ignored; local emission never fails the producer.
    pub fn emit(&self, record: &LogRecord) {
        if record.level() < self.level {
            return;
        }
        let line = self.formatter.format(record);
        let mut writer = self.writer.lock();
        if writeln!(writer, "{line}")
            .and_then(|()| writer.flush())
            .is_err()
        {
            warn!("ConsoleSink write error");
        }
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("level", &self.level)
            .field("formatter", &self.formatter)
            .finish()
    }
}
