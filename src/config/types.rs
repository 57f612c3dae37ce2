use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::id::{IdScheme, DEFAULT_EPOCH_MS};

/// Root configuration for a shim instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Reject capture patterns that omit a path (default: false).
    #[serde(default)]
    pub path_required: bool,
    /// Snowflake epoch in Unix milliseconds (default: 2024-01-01).
    #[serde(default = "default_epoch_ms")]
    pub epoch_ms: u64,
    /// Snowflake node override; derived from the process id when unset.
    #[serde(default)]
    pub node_id: Option<u16>,
    #[serde(default)]
    pub id_scheme: IdScheme,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub pool: PoolSettings,
}

/// What happens to a request whose capture callback fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackFailure {
    /// Forward untouched, emit nothing.
    #[default]
    PassThrough,
    /// Instrument the request anyway, with empty metadata.
    CaptureWithoutMetadata,
}

/// Whether a failed network call still produces a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailure {
    #[default]
    Skip,
    /// Emit an `ERROR` record with a null status code and the transport error text.
    Record,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePolicy {
    #[serde(default)]
    pub callback: CallbackFailure,
    #[serde(default)]
    pub transport: TransportFailure,
}

/// Timeouts for the bundled reqwest transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_seconds: u32,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout")]
    pub request_seconds: u32,
}

/// Connection pool settings for the bundled reqwest transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Pool idle timeout in seconds (default: 90).
    #[serde(default = "default_pool_idle_timeout")]
    pub idle_timeout_seconds: u32,
    /// Max idle connections per host (default: 8).
    #[serde(default = "default_pool_max_idle_per_host")]
    pub max_idle_per_host: u32,
}

fn default_epoch_ms() -> u64 {
    DEFAULT_EPOCH_MS
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_request_timeout() -> u32 {
    30
}

fn default_pool_idle_timeout() -> u32 {
    90
}

fn default_pool_max_idle_per_host() -> u32 {
    8
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            path_required: false,
            epoch_ms: DEFAULT_EPOCH_MS,
            node_id: None,
            id_scheme: IdScheme::default(),
            failure_policy: FailurePolicy::default(),
            timeouts: TimeoutSettings::default(),
            pool: PoolSettings::default(),
        }
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_seconds: 5,
            request_seconds: 30,
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: 90,
            max_idle_per_host: 8,
        }
    }
}

impl ShimConfig {
    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
