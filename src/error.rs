//! Error types for the capture shim.
//!
//! Only [`TransportError`] and [`ConfigError`] ever reach application code.
//! Match, callback and sink failures are folded into [`InterceptionError`]
//! and logged, so interception stays transparent to the caller.

use thiserror::Error;

/// Boxed error used at the seams where user code plugs in.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A capture pattern could not be evaluated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid pattern '{pattern}': {reason}")]
pub struct MatchError {
    pub pattern: String,
    pub reason: String,
}

impl MatchError {
    pub fn new(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// A capture callback returned an error or panicked.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("capture callback for '{pattern}' failed: {source}")]
    Failed {
        pattern: String,
        #[source]
        source: BoxError,
    },

    #[error("capture callback for '{pattern}' panicked: {message}")]
    Panicked { pattern: String, message: String },
}

/// The real network call failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),

    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Connection(_) => "connection",
            TransportError::Request(_) => "request",
            TransportError::InvalidRequest(_) => "invalid_request",
        }
    }
}

/// The log sink refused a record.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink rejected record: {0}")]
    Rejected(String),

    #[error("sink panicked: {0}")]
    Panicked(String),

    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures inside the interception path that are logged, never propagated.
#[derive(Debug, Error)]
pub enum InterceptionError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Callback(#[from] CallbackError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Configuration could not be loaded or parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },
}

/// Extract a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_type() {
        let err = TransportError::Timeout("deadline elapsed".into());
        assert!(err.is_timeout());
        assert_eq!(err.error_type(), "timeout");
        assert_eq!(
            TransportError::InvalidRequest("bad".into()).error_type(),
            "invalid_request"
        );
    }

    #[test]
    fn test_interception_error_wraps_match() {
        let err: InterceptionError = MatchError::new("nope", "missing scheme").into();
        assert_eq!(err.to_string(), "invalid pattern 'nope': missing scheme");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
