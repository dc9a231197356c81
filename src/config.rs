//! Loading [`LoggingConfig`] from the environment or an INI file.
//!
//! Environment variables:
//!
//! | Variable                  | Meaning                               |
//! |---------------------------|---------------------------------------|
//! | `LOKI_ENABLED`            | bool, invalid values count as `false` |
//! | `LOKI_PUSH_URL`           | push endpoint                         |
//! | `LOKI_USERNAME`           | basic auth user                       |
//! | `LOKI_PASSWORD`           | basic auth password                   |
//! | `LOKI_JOB`                | `job` label                           |
//! | `LOKI_CONNECT_TIMEOUT_MS` | connect timeout in milliseconds       |
//! | `LOKI_TIMEOUT_MS`         | request timeout in milliseconds       |
//! | `LOG_CONSOLE_LEVEL`       | minimum console level                 |
//! | `LOG_CONSOLE_FORMAT`      | `text` or `json`                      |
//!
//! The INI form uses `[loki]` and `[console]` sections with the same keys in
//! lower case and without the prefix (`enabled`, `push_url`, `timeout_ms`,
//! `level`, `format`, ...). Missing keys keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{Ini, Properties};
use log::warn;
use thiserror::Error;

use crate::{console::ConsoleConfig, loki::LokiConfig};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse INI configuration: {0}")]
    Ini(#[from] ini::ParseError),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Everything needed to assemble a [`LogManager`](crate::LogManager).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    pub loki: LokiConfig,
    pub console: ConsoleConfig,
}

impl LoggingConfig {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable timeouts, console
    /// levels or formats.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        apply_loki(&mut config.loki, |key| {
            lookup(&format!("LOKI_{}", key.to_ascii_uppercase()))
        })?;
        apply_console(&mut config.console, |key| {
            lookup(&format!("LOG_CONSOLE_{}", key.to_ascii_uppercase()))
        })?;
        Ok(config)
    }

    /// Read configuration from an INI file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Ini`] if it is not valid INI, and
    /// [`ConfigError::InvalidValue`] for unparsable values.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini_str(&text)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        let mut config = Self::default();
        if let Some(section) = ini.section(Some("loki")) {
            apply_loki(&mut config.loki, |key| property(section, key))?;
        }
        if let Some(section) = ini.section(Some("console")) {
            apply_console(&mut config.console, |key| property(section, key))?;
        }
        Ok(config)
    }
}

fn property(section: &Properties, key: &str) -> Option<String> {
    section.get(key).map(str::to_owned)
}

fn apply_loki<F>(loki: &mut LokiConfig, get: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = get("enabled") {
        loki.enabled = parse_bool(&value).unwrap_or_else(|| {
            warn!("ignoring invalid Loki enabled flag {value:?}; Loki stays disabled");
            false
        });
    }
    if let Some(value) = get("push_url") {
        loki.push_url = value.trim().to_owned();
    }
    if let Some(value) = get("username") {
        loki.username = value;
    }
    if let Some(value) = get("password") {
        loki.password = value;
    }
    if let Some(value) = get("job") {
        loki.job = value;
    }
    if let Some(value) = get("connect_timeout_ms") {
        loki.connect_timeout = parse_millis("connect_timeout_ms", &value)?;
    }
    if let Some(value) = get("timeout_ms") {
        loki.timeout = parse_millis("timeout_ms", &value)?;
    }
    Ok(())
}

fn apply_console<F>(console: &mut ConsoleConfig, get: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = get("level") {
        console.level = value.parse().map_err(|_| invalid("level", &value))?;
    }
    if let Some(value) = get("format") {
        console.format = value.parse().map_err(|_| invalid("format", &value))?;
    }
    Ok(())
}

/// Boolean parsing accepting `1/t/true/0/f/false` in any of the usual cases.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}
