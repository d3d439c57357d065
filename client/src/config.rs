//! Client configuration with TOML file support.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use subnet_types::Id;

use crate::error::ClientError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Where the node is and how patiently to talk to it.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically. Durations are written in milliseconds:
///
/// ```toml
/// uri = "http://127.0.0.1:9650"
/// poll_interval_ms = 1000
/// request_timeout_ms = 120000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Node base URI, e.g. `http://127.0.0.1:9650`.
    #[serde(default)]
    pub uri: String,

    #[serde(rename = "poll_interval_ms", with = "millis", default = "default_poll_interval")]
    pub poll_interval: Duration,

    #[serde(
        rename = "request_timeout_ms",
        with = "millis",
        default = "default_request_timeout"
    )]
    pub request_timeout: Duration,

    /// Fetched from the node when absent.
    #[serde(default)]
    pub network_id: Option<u32>,

    /// Fetched from the node when absent.
    #[serde(default)]
    pub asset_id: Option<Id>,
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            network_id: None,
            asset_id: None,
        }
    }
}

impl ClientConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.uri.trim().is_empty() {
            return Err(ClientError::EmptyUri);
        }
        if self.poll_interval.is_zero() {
            return Err(ClientError::InvalidInterval);
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::InvalidRequestTimeout);
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = ClientConfig::from_toml_str(r#"uri = "http://localhost:9650""#).unwrap();
        assert_eq!(cfg, ClientConfig::new("http://localhost:9650"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn durations_in_milliseconds() {
        let cfg = ClientConfig::from_toml_str(
            r#"
            uri = "http://localhost:9650"
            poll_interval_ms = 250
            request_timeout_ms = 5000
            network_id = 12345
            "#,
        )
        .unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.network_id, Some(12345));
    }

    #[test]
    fn validation_errors() {
        assert!(matches!(ClientConfig::default().validate(), Err(ClientError::EmptyUri)));

        let mut cfg = ClientConfig::new("http://localhost:9650");
        cfg.poll_interval = Duration::ZERO;
        assert!(matches!(cfg.validate(), Err(ClientError::InvalidInterval)));

        let mut cfg = ClientConfig::new("http://localhost:9650");
        cfg.request_timeout = Duration::ZERO;
        assert!(matches!(cfg.validate(), Err(ClientError::InvalidRequestTimeout)));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        assert!(matches!(
            ClientConfig::from_toml_str("uri = "),
            Err(ClientError::Config(_))
        ));
    }
}
