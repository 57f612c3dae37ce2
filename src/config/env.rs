//! Environment-driven configuration.
//!
//! `CAPTURE_SHIM_OPTIONS` carries flat `key=value` pairs separated by `;`,
//! e.g. `path_required=true;id_scheme=uuid7;transport_failure=record`.

use std::str::FromStr;

use serde::de::DeserializeOwned;

use super::types::ShimConfig;
use crate::error::ConfigError;

/// When set to `1`, the shim never intercepts anything.
pub const DISABLE_ENV: &str = "CAPTURE_SHIM_DISABLE";

pub const OPTIONS_ENV: &str = "CAPTURE_SHIM_OPTIONS";

/// Read the disable flag. Only the exact value `1` disables.
pub fn disabled_from_env() -> bool {
    std::env::var(DISABLE_ENV).map_or(false, |v| is_disable_sentinel(&v))
}

fn is_disable_sentinel(value: &str) -> bool {
    value == "1"
}

impl ShimConfig {
    /// Defaults overlaid with `CAPTURE_SHIM_OPTIONS`, if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(OPTIONS_ENV) {
            Ok(options) => Self::from_options_str(&options),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse `key=value;key=value` on top of the defaults.
    pub fn from_options_str(options: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for pair in options.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidOption {
                key: pair.to_string(),
                reason: "expected key=value".to_string(),
            })?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "path_required" => config.path_required = parse(key, value)?,
                "epoch_ms" => config.epoch_ms = parse(key, value)?,
                "node_id" => config.node_id = Some(parse(key, value)?),
                "id_scheme" => config.id_scheme = parse_enum(key, value)?,
                "callback_failure" => config.failure_policy.callback = parse_enum(key, value)?,
                "transport_failure" => config.failure_policy.transport = parse_enum(key, value)?,
                "connect_timeout_seconds" => config.timeouts.connect_seconds = parse(key, value)?,
                "request_timeout_seconds" => config.timeouts.request_seconds = parse(key, value)?,
                "pool_idle_timeout_seconds" => {
                    config.pool.idle_timeout_seconds = parse(key, value)?
                }
                "pool_max_idle_per_host" => config.pool.max_idle_per_host = parse(key, value)?,
                _ => {
                    return Err(ConfigError::InvalidOption {
                        key: key.to_string(),
                        reason: "unknown option".to_string(),
                    })
                }
            }
        }

        Ok(config)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidOption {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn parse_enum<T: DeserializeOwned>(key: &str, value: &str) -> Result<T, ConfigError> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|e| {
        ConfigError::InvalidOption {
            key: key.to_string(),
            reason: e.to_string(),
        }
    })
}
