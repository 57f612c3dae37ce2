#![allow(dead_code, unused_imports)]

pub mod mock_transport;

use std::sync::Arc;

use bytes::Bytes;
use capture_shim::{HttpRequest, LogSink, SinkError};
use parking_lot::Mutex;

pub use mock_transport::MockTransport;

pub fn get(url: &str) -> HttpRequest {
    http::Request::builder()
        .method("GET")
        .uri(url)
        .body(Bytes::new())
        .unwrap()
}

pub fn get_with_header(url: &str, name: &str, value: &str) -> HttpRequest {
    http::Request::builder()
        .method("GET")
        .uri(url)
        .header(name, value)
        .body(Bytes::new())
        .unwrap()
}

/// Sink that keeps every message it receives.
#[derive(Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn records(&self) -> Vec<serde_json::Value> {
        self.messages
            .lock()
            .iter()
            .map(|m| serde_json::from_str(m).expect("record is valid json"))
            .collect()
    }
}

impl LogSink for MemorySink {
    fn deliver(&self, message: &str) -> Result<(), SinkError> {
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}

/// Sink that rejects everything.
pub struct FailingSink;

impl LogSink for FailingSink {
    fn deliver(&self, _message: &str) -> Result<(), SinkError> {
        Err(SinkError::Rejected("sink offline".to_string()))
    }
}
