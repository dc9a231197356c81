//! Blocking Loki push client.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use once_cell::sync::OnceCell;
use ureq::{Agent, AgentBuilder};

use crate::sink::{PushEntry, PushError, RemoteSink};

use super::{config::LokiConfig, payload::encode_push_request};

/// [`RemoteSink`] pushing entries to a Loki `/loki/api/v1/push` endpoint.
///
/// Each entry is sent as its own POST request; there is no batching, retry or
/// backoff. The agent enforces the configured connect and request timeouts so
/// a hung backend cannot block the dispatcher worker indefinitely. The agent is
/// built on the first push that actually reaches the network.
pub struct LokiSink {
    config: LokiConfig,
    authorization: Option<String>,
    agent: OnceCell<Agent>,
}

impl LokiSink {
    pub fn new(config: LokiConfig) -> Self {
        let authorization = config
            .basic_auth()
            .map(|(username, password)| basic_auth_header(username, password));
        Self {
            config,
            authorization,
            agent: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &LokiConfig {
        &self.config
    }

    fn agent(&self) -> &Agent {
        self.agent.get_or_init(|| {
            AgentBuilder::new()
                .timeout_connect(self.config.connect_timeout)
                .timeout(self.config.timeout)
                .build()
        })
    }

    fn send(&self, body: &str) -> Result<(), PushError> {
        let url = &self.config.push_url;
        let mut request = self
            .agent()
            .post(url)
            .set("Content-Type", "application/json");
        if let Some(header) = &self.authorization {
            request = request.set("Authorization", header);
        }

        let status = match request.send_string(body) {
            Ok(response) => response.status(),
            Err(ureq::Error::Status(code, _)) => code,
            Err(ureq::Error::Transport(transport)) => {
                return Err(PushError::Transport {
                    url: url.clone(),
                    message: transport.to_string(),
                });
            }
        };
        if is_accepted(status) {
            Ok(())
        } else {
            Err(PushError::UnexpectedStatus {
                url: url.clone(),
                status,
            })
        }
    }
}

impl RemoteSink for LokiSink {
    fn push(&self, entry: &PushEntry) -> Result<(), PushError> {
        if !self.config.is_active() {
            return Ok(());
        }
        let body = encode_push_request(entry)?;
        self.send(&body)
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn job(&self) -> &str {
        &self.config.job
    }
}

impl fmt::Debug for LokiSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LokiSink")
            .field("config", &self.config)
            .field("agent_initialised", &self.agent.get().is_some())
            .finish()
    }
}

/// Loki answers 204 on success; some proxies in front of it answer 200.
pub(crate) fn is_accepted(status: u16) -> bool {
    matches!(status, 200 | 204)
}

fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    format!("Basic {}", BASE64_STANDARD.encode(credentials.as_bytes()))
}
