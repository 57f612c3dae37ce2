use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use capture_shim::{HttpRequest, HttpResponse, Transport, TransportError};
use http::StatusCode;

/// Canned upstream that counts how often it is really called.
#[derive(Clone)]
pub struct MockTransport {
    calls: Arc<AtomicUsize>,
    status: StatusCode,
    body: Bytes,
    delay: Option<Duration>,
    fail_with_timeout: bool,
}

impl MockTransport {
    pub fn ok(body: &'static str) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn with_status(status: StatusCode, body: &'static str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            status,
            body: Bytes::from_static(body.as_bytes()),
            delay: None,
            fail_with_timeout: false,
        }
    }

    pub fn timing_out() -> Self {
        Self {
            fail_with_timeout: true,
            ..Self::ok("")
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_with_timeout {
            return Err(TransportError::Timeout(
                format!("upstream {} took too long", request.uri()).into(),
            ));
        }

        let mut response = HttpResponse::new(self.body.clone());
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert("x-upstream", http::HeaderValue::from_static("mock"));
        Ok(response)
    }
}
