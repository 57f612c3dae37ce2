//! Timeouts applied by [`ReqwestTransport`](super::ReqwestTransport).

use std::time::Duration;

use crate::config::TimeoutSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// TCP connect, including TLS handshake.
    pub connect: Duration,
    /// Whole exchange, from send until the body is read.
    pub request: Duration,
}

impl TimeoutConfig {
    pub fn new(connect: Duration, request: Duration) -> Self {
        Self { connect, request }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from(&TimeoutSettings::default())
    }
}

impl From<&TimeoutSettings> for TimeoutConfig {
    fn from(settings: &TimeoutSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.connect_seconds.into()),
            Duration::from_secs(settings.request_seconds.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_settings() {
        let config = TimeoutConfig::default();
        assert_eq!(config.connect, Duration::from_secs(5));
        assert_eq!(config.request, Duration::from_secs(30));
    }

    #[test]
    fn test_from_settings() {
        let config = TimeoutConfig::from(&TimeoutSettings {
            connect_seconds: 10,
            request_seconds: 45,
        });
        assert_eq!(
            config,
            TimeoutConfig::new(Duration::from_secs(10), Duration::from_secs(45))
        );
    }
}
