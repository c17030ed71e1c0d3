//! Requester configuration.
//!
//! Defaults reproduce the bridge's reference client: loopback port 5005,
//! a 1 second receive timeout, no send timeout and no check of who replied.
//! A YAML file may override any subset of the fields:
//!
//! ```yaml
//! endpoint: "192.168.1.40:5005"
//! receive_timeout_ms: 500
//! send_timeout_ms: 250
//! verify_reply_origin: true
//! ```

use crate::endpoint::Endpoint;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default receive timeout in milliseconds.
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 1_000;

/// Settings for a [`crate::TelemetryRequester`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequesterConfig {
    /// Where requests are sent.
    pub endpoint: Endpoint,
    /// Upper bound on waiting for the reply.
    pub receive_timeout_ms: u64,
    /// Upper bound on the send call. `None` leaves it to the OS.
    pub send_timeout_ms: Option<u64>,
    /// Discard replies that do not come from `endpoint`.
    pub verify_reply_origin: bool,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
            send_timeout_ms: None,
            verify_reply_origin: false,
        }
    }
}

impl RequesterConfig {
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout_ms = duration_to_ms(timeout);
        self
    }

    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout_ms = timeout.map(duration_to_ms);
        self
    }

    pub fn with_reply_origin_check(mut self, enabled: bool) -> Self {
        self.verify_reply_origin = enabled;
        self
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn send_timeout(&self) -> Option<Duration> {
        self.send_timeout_ms.map(Duration::from_millis)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject values the socket layer cannot honour.
    ///
    /// A zero socket timeout is refused by the OS bindings, and port 0 is not
    /// a reachable destination.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.port() == 0 {
            return Err(ConfigError::Invalid {
                field: "endpoint",
                reason: "port must be non-zero".to_string(),
            });
        }
        if self.receive_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "receive_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.send_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "send_timeout_ms",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
