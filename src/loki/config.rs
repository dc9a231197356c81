//! Settings for the Loki push client.

use std::time::Duration;

/// Default timeout for establishing the TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default limit on the whole request, including reading the response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration consumed by [`LokiSink`](super::LokiSink).
///
/// A sink is only active when `enabled` is set and `push_url` is non-empty;
/// otherwise every push succeeds without touching the network. Basic auth is
/// sent only when both `username` and `password` are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct LokiConfig {
    pub enabled: bool,
    /// Full push endpoint, e.g. `http://loki:3100/loki/api/v1/push`.
    pub push_url: String,
    pub username: String,
    pub password: String,
    /// Value of the `job` stream label.
    pub job: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl LokiConfig {
    /// Enabled configuration pointing at `push_url`.
    pub fn new(push_url: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            enabled: true,
            push_url: push_url.into(),
            job: job.into(),
            ..Self::default()
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.timeout = timeout;
        self
    }

    /// Whether pushes will be sent to the network.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.push_url.trim().is_empty()
    }

    /// Credentials to send, if both halves are configured.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }
}

impl Default for LokiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            push_url: String::new(),
            username: String::new(),
            password: String::new(),
            job: String::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for LokiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LokiConfig")
            .field("enabled", &self.enabled)
            .field("push_url", &self.push_url)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .field("job", &self.job)
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .finish()
    }
}
