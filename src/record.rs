//! Structured record emitted for every instrumented request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Severity of a captured request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Error,
}

impl Level {
    /// `ERROR` for 4xx/5xx, `INFO` otherwise.
    pub fn from_status(status: u16) -> Self {
        if status >= 400 {
            Level::Error
        } else {
            Level::Info
        }
    }
}

/// Wire shape delivered to the log sink.
///
/// Field order is the serialization order. `status_code` is `None` only when
/// the transport failed before a response existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRecord {
    pub level: Level,
    pub id: String,
    pub url: String,
    pub status_code: Option<u16>,
    pub duration_ms: f64,
    pub metadata: BTreeMap<String, String>,
    pub error: Option<String>,
}

impl CapturedRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_status() {
        assert_eq!(Level::from_status(200), Level::Info);
        assert_eq!(Level::from_status(399), Level::Info);
        assert_eq!(Level::from_status(400), Level::Error);
        assert_eq!(Level::from_status(503), Level::Error);
    }

    #[test]
    fn test_wire_shape() {
        let record = CapturedRecord {
            level: Level::Error,
            id: "42".to_string(),
            url: "https://example.com/test".to_string(),
            status_code: Some(500),
            duration_ms: 1.5,
            metadata: BTreeMap::from([("x-sample".to_string(), "sample".to_string())]),
            error: Some("Internal Server Error".to_string()),
        };

        assert_eq!(
            record.to_json().unwrap(),
            r#"{"level":"ERROR","id":"42","url":"https://example.com/test","statusCode":500,"durationMs":1.5,"metadata":{"x-sample":"sample"},"error":"Internal Server Error"}"#
        );
    }

    #[test]
    fn test_absent_error_is_null() {
        let record = CapturedRecord {
            level: Level::Info,
            id: "1".to_string(),
            url: "https://example.com/".to_string(),
            status_code: Some(204),
            duration_ms: 0.25,
            metadata: BTreeMap::new(),
            error: None,
        };
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(value["level"], "INFO");
        assert!(value["error"].is_null());
        assert_eq!(value["statusCode"], 204);
    }
}
