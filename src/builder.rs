//! Builder for [`LogManager`].
//!
//! Collects templates, console settings and the remote sink, validates them
//! and starts the dispatcher. Templates can only be registered here: once
//! [`build`](LogManagerBuilder::build) moves the registry into the manager it
//! is read-only.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::LoggingConfig,
    console::{ConsoleConfig, ConsoleSink},
    dispatcher::Dispatcher,
    loki::{LokiConfig, LokiSink},
    manager::LogManager,
    sink::RemoteSink,
    template::TemplateRegistry,
};

/// Errors that may occur while building a [`LogManager`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid logging configuration: {0}")]
    InvalidConfig(String),
}

enum ConsoleTarget {
    Stdout,
    Writer(Box<dyn Write + Send>),
    Disabled,
}

enum RemoteTarget {
    None,
    Loki(LokiConfig),
    Custom(Arc<dyn RemoteSink>),
}

pub struct LogManagerBuilder {
    templates: TemplateRegistry,
    console: ConsoleTarget,
    console_config: ConsoleConfig,
    remote: RemoteTarget,
}

impl LogManagerBuilder {
    /// Start from the default templates, a stdout console and no remote sink.
    pub fn new() -> Self {
        Self {
            templates: TemplateRegistry::with_defaults(),
            console: ConsoleTarget::Stdout,
            console_config: ConsoleConfig::default(),
            remote: RemoteTarget::None,
        }
    }

    /// Start from a loaded [`LoggingConfig`]: stdout console with its
    /// settings and a [`LokiSink`] for its Loki section.
    pub fn from_config(config: LoggingConfig) -> Self {
        Self::new()
            .with_console_config(config.console)
            .with_loki(config.loki)
    }

    /// Replace the whole template registry.
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Register one template (case-insensitive name, last write wins).
    pub fn with_template(mut self, name: &str, template: impl Into<String>) -> Self {
        self.templates.add_template(name, template);
        self
    }

    pub fn with_console_config(mut self, config: ConsoleConfig) -> Self {
        self.console_config = config;
        self
    }

    /// Write console lines to `writer` instead of stdout.
    pub fn with_console_writer<W>(mut self, writer: W, config: ConsoleConfig) -> Self
    where
        W: Write + Send + 'static,
    {
        self.console = ConsoleTarget::Writer(Box::new(writer));
        self.console_config = config;
        self
    }

    /// Discard console output.
    pub fn with_console_disabled(mut self) -> Self {
        self.console = ConsoleTarget::Disabled;
        self
    }

    /// Push records to Loki using `config`.
    ///
    /// A disabled config still installs the sink; it then accepts every push
    /// without network activity.
    pub fn with_loki(mut self, config: LokiConfig) -> Self {
        self.remote = RemoteTarget::Loki(config);
        self
    }

    /// Push records to a caller-supplied sink.
    pub fn with_remote_sink(mut self, sink: Arc<dyn RemoteSink>) -> Self {
        self.remote = RemoteTarget::Custom(sink);
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        if let RemoteTarget::Loki(config) = &self.remote {
            validate_loki(config)?;
        }
        Ok(())
    }

    /// Validate the settings and start the dispatcher worker.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] when an active Loki config has a
    /// URL without an `http://` or `https://` scheme, or a zero timeout.
    pub fn build(self) -> Result<LogManager, BuildError> {
        self.validate()?;

        let console = match self.console {
            ConsoleTarget::Stdout => ConsoleSink::stdout(self.console_config),
            ConsoleTarget::Writer(writer) => ConsoleSink::new(writer, self.console_config),
            ConsoleTarget::Disabled => ConsoleSink::disabled(),
        };
        let sink: Option<Arc<dyn RemoteSink>> = match self.remote {
            RemoteTarget::None => None,
            RemoteTarget::Loki(config) => Some(Arc::new(LokiSink::new(config))),
            RemoteTarget::Custom(sink) => Some(sink),
        };

        Ok(LogManager::from_parts(
            self.templates,
            Dispatcher::new(console, sink),
        ))
    }
}

fn validate_loki(config: &LokiConfig) -> Result<(), BuildError> {
    if !config.is_active() {
        return Ok(());
    }
    let url = config.push_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(BuildError::InvalidConfig(format!(
            "Loki push URL must use http or https: {url}"
        )));
    }
    if config.connect_timeout.is_zero() || config.timeout.is_zero() {
        return Err(BuildError::InvalidConfig(
            "Loki timeouts must be greater than zero".into(),
        ));
    }
    Ok(())
}

impl Default for LogManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let console = match self.console {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Writer(_) => "writer",
            ConsoleTarget::Disabled => "disabled",
        };
        let remote = match &self.remote {
            RemoteTarget::None => "none".to_owned(),
            RemoteTarget::Loki(config) => format!("{config:?}"),
            RemoteTarget::Custom(_) => "custom".to_owned(),
        };
        f.debug_struct("LogManagerBuilder")
            .field("templates", &self.templates.len())
            .field("console", &console)
            .field("console_config", &self.console_config)
            .field("remote", &remote)
            .finish()
    }
}
