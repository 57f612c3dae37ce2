//! Log sinks receiving serialized [`CapturedRecord`](crate::record::CapturedRecord)s.
//!
//! Delivery is best effort. A sink failure never reaches the request that
//! produced the record.

use crate::error::SinkError;

pub trait LogSink: Send + Sync {
    fn deliver(&self, message: &str) -> Result<(), SinkError>;
}

/// Any `Fn(&str)` closure is an infallible sink.
impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn deliver(&self, message: &str) -> Result<(), SinkError> {
        self(message);
        Ok(())
    }
}

/// Emits each record as a tracing event under the `capture_shim::record` target.
///
/// Records are inspected for their level so `ERROR` records surface as
/// `error!` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn deliver(&self, message: &str) -> Result<(), SinkError> {
        let is_error = serde_json::from_str::<serde_json::Value>(message)
            .map(|v| v["level"] == "ERROR")
            .unwrap_or(false);

        if is_error {
            tracing::error!(target: "capture_shim::record", "{}", message);
        } else {
            tracing::info!(target: "capture_shim::record", "{}", message);
        }
        Ok(())
    }
}
