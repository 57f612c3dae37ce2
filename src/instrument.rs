//! Instrumentation path: time the real call, classify it, emit one record.

use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::config::TransportFailure;
use crate::error::{panic_message, InterceptionError, SinkError};
use crate::id::IdGenerator;
use crate::record::{CapturedRecord, Level};
use crate::registry::CaptureDecision;
use crate::sink::LogSink;
use crate::transport::{reason_phrase, HttpRequest, HttpResponse};

pub struct Instrumentation {
    ids: Arc<dyn IdGenerator>,
    sink: Option<Arc<dyn LogSink>>,
    transport_failure: TransportFailure,
}

impl Instrumentation {
    pub fn new(
        ids: Arc<dyn IdGenerator>,
        sink: Option<Arc<dyn LogSink>>,
        transport_failure: TransportFailure,
    ) -> Self {
        Self {
            ids,
            sink,
            transport_failure,
        }
    }

    /// Perform `send` once and record the outcome.
    ///
    /// The response or transport error is returned exactly as `send` produced it.
    pub async fn run<F, Fut, E>(
        &self,
        request: HttpRequest,
        decision: CaptureDecision,
        send: F,
    ) -> Result<HttpResponse, E>
    where
        F: FnOnce(HttpRequest) -> Fut,
        Fut: Future<Output = Result<HttpResponse, E>>,
        E: fmt::Display,
    {
        let url = request.uri().to_string();

        let started = Instant::now();
        let result = send(request).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let record = match &result {
            Ok(response) => {
                let status = response.status().as_u16();
                let level = Level::from_status(status);
                Some(CapturedRecord {
                    level,
                    id: self.ids.next_id(),
                    url,
                    status_code: Some(status),
                    duration_ms,
                    metadata: decision.metadata,
                    error: (level == Level::Error).then(|| reason_phrase(response)),
                })
            }
            Err(err) => match self.transport_failure {
                TransportFailure::Skip => {
                    tracing::debug!(url = %url, error = %err, "Transport failed, no record emitted");
                    None
                }
                TransportFailure::Record => Some(CapturedRecord {
                    level: Level::Error,
                    id: self.ids.next_id(),
                    url,
                    status_code: None,
                    duration_ms,
                    metadata: decision.metadata,
                    error: Some(err.to_string()),
                }),
            },
        };

        if let Some(record) = record {
            self.emit(&record);
        }

        result
    }

    fn emit(&self, record: &CapturedRecord) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(err) = deliver(sink.as_ref(), record) {
            let err = InterceptionError::from(err);
            tracing::debug!(id = %record.id, error = %err, "Dropped captured record");
        }
    }
}

fn deliver(sink: &dyn LogSink, record: &CapturedRecord) -> Result<(), SinkError> {
    let message = record.to_json()?;
    match catch_unwind(AssertUnwindSafe(|| sink.deliver(&message))) {
        Ok(result) => result,
        Err(payload) => Err(SinkError::Panicked(panic_message(payload.as_ref()))),
    }
}
