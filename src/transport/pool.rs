//! Connection pool configuration for the reqwest transport.

use std::time::Duration;

use crate::config::PoolSettings;

/// Pool configuration for outbound requests.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Idle timeout for pooled connections.
    pub pool_idle_timeout: Duration,
    /// Max idle connections per host.
    pub pool_max_idle_per_host: usize,
}

impl PoolConfig {
    pub fn new(pool_idle_timeout_secs: u64, pool_max_idle_per_host: usize) -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(pool_idle_timeout_secs),
            pool_max_idle_per_host,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from(&PoolSettings::default())
    }
}

impl From<&PoolSettings> for PoolConfig {
    fn from(settings: &PoolSettings) -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(settings.idle_timeout_seconds.into()),
            pool_max_idle_per_host: settings.max_idle_per_host as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_config() {
        let config = PoolConfig::default();
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(90));
        assert_eq!(config.pool_max_idle_per_host, 8);
    }

    #[test]
    fn test_from_settings() {
        let config = PoolConfig::from(&PoolSettings {
            idle_timeout_seconds: 10,
            max_idle_per_host: 2,
        });
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(10));
        assert_eq!(config.pool_max_idle_per_host, 2);
    }
}
