//! Outbound transport seam.
//!
//! A [`Transport`] performs the real network call. [`CaptureTransport`]
//! decorates any transport with capture; [`CaptureLayer`] does the same for
//! tower services.

pub mod layer;
pub mod pool;
pub mod timeout;
pub mod upstream;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::engine::Interceptor;
use crate::error::TransportError;

pub use layer::{CaptureLayer, CaptureService};
pub use pool::PoolConfig;
pub use timeout::TimeoutConfig;
pub use upstream::ReqwestTransport;

pub type HttpRequest = http::Request<Bytes>;
pub type HttpResponse = http::Response<Bytes>;

/// Response extension carrying the reason phrase sent on the wire.
///
/// Transports that see the raw status line can attach it; otherwise the
/// canonical reason of the status code is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonPhrase(pub String);

pub fn reason_phrase(response: &HttpResponse) -> String {
    if let Some(ReasonPhrase(reason)) = response.extensions().get::<ReasonPhrase>() {
        return reason.clone();
    }
    let status = response.status();
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// A transport whose requests pass through the capture engine.
pub struct CaptureTransport<T> {
    inner: T,
    interceptor: Interceptor,
}

impl<T: Transport> CaptureTransport<T> {
    pub fn new(inner: T, interceptor: Interceptor) -> Self {
        Self { inner, interceptor }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for CaptureTransport<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.interceptor
            .intercept(request, |req| self.inner.send(req))
            .await
    }
}
