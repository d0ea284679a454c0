use crate::encoder::EncoderFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PORT: u16 = 7777;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_POOL_SIZE: usize = 5;

const API_PATH: &str = "/v0.3/traces";
const LEGACY_API_PATH: &str = "/v0.2/traces";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Where and how spans are delivered to the trace agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub hostname: String,
    pub port: u16,
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
    pub pool_size: usize,
    pub encoding: EncoderFormat,
    pub legacy_encoding: EncoderFormat,
    pub user_agent: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            encoding: EncoderFormat::Msgpack,
            legacy_encoding: EncoderFormat::Json,
            user_agent: format!("trace-transport/{}", env!("CARGO_PKG_VERSION")),
            headers: BTreeMap::new(),
        }
    }
}

impl TransportConfig {
    /// Config for an agent on `hostname:port`; empty or zero values keep the defaults.
    pub fn for_agent(hostname: &str, port: u16) -> Self {
        let mut config = Self::default();
        if !hostname.is_empty() {
            config.hostname = hostname.to_string();
        }
        if port != 0 {
            config.port = port;
        }
        config
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.pool_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Pool size must be greater than 0".to_string(),
            ));
        }

        if self.encoding == self.legacy_encoding {
            return Err(ConfigError::InvalidConfig(format!(
                "Legacy encoding must differ from the primary encoding ({})",
                self.encoding
            )));
        }

        Url::parse(&self.primary_url()).map_err(|e| {
            ConfigError::InvalidConfig(format!("Invalid agent address '{}': {}", self.authority(), e))
        })?;

        Ok(())
    }

    pub fn primary_url(&self) -> String {
        format!("http://{}{}", self.authority(), API_PATH)
    }

    pub fn legacy_url(&self) -> String {
        format!("http://{}{}", self.authority(), LEGACY_API_PATH)
    }

    fn authority(&self) -> String {
        let hostname = if self.hostname.is_empty() {
            DEFAULT_HOSTNAME
        } else {
            &self.hostname
        };
        let port = if self.port == 0 { DEFAULT_PORT } else { self.port };
        format!("{hostname}:{port}")
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
