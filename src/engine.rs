//! The interception engine every captured request passes through.
//!
//! Per request: find the first matching rule, run its callback, then either
//! pass the request through or hand it to [`Instrumentation`]. The real call
//! is an `FnOnce`, so it runs exactly once on every path.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::config::CallbackFailure;
use crate::error::InterceptionError;
use crate::instrument::Instrumentation;
use crate::matcher::PatternMatcher;
use crate::registry::{CaptureDecision, CaptureRegistry};
use crate::shim::state::{ShimState, StateCell};
use crate::transport::{HttpRequest, HttpResponse};

/// Shareable handle to the engine. Cloning is cheap.
#[derive(Clone)]
pub struct Interceptor {
    inner: Arc<InterceptorInner>,
}

struct InterceptorInner {
    registry: CaptureRegistry,
    matcher: Arc<dyn PatternMatcher>,
    path_required: bool,
    callback_failure: CallbackFailure,
    instrumentation: Instrumentation,
    state: Arc<StateCell>,
}

impl Interceptor {
    pub(crate) fn new(
        registry: CaptureRegistry,
        matcher: Arc<dyn PatternMatcher>,
        path_required: bool,
        callback_failure: CallbackFailure,
        instrumentation: Instrumentation,
        state: Arc<StateCell>,
    ) -> Self {
        Self {
            inner: Arc::new(InterceptorInner {
                registry,
                matcher,
                path_required,
                callback_failure,
                instrumentation,
                state,
            }),
        }
    }

    pub fn state(&self) -> ShimState {
        self.inner.state.get()
    }

    /// Route `request` through capture, using `send` for the real call.
    pub async fn intercept<F, Fut, E>(&self, request: HttpRequest, send: F) -> Result<HttpResponse, E>
    where
        F: FnOnce(HttpRequest) -> Fut,
        Fut: Future<Output = Result<HttpResponse, E>>,
        E: fmt::Display,
    {
        let inner = &self.inner;

        if inner.state.get() != ShimState::Running {
            return send(request).await;
        }

        let url = request.uri().to_string();
        let Some(rule) = inner
            .registry
            .find(&url, inner.matcher.as_ref(), inner.path_required)
        else {
            tracing::trace!(url = %url, "No capture rule matched");
            return send(request).await;
        };

        let decision = match rule.evaluate(&request) {
            Ok(decision) => decision,
            Err(err) => {
                let err = InterceptionError::from(err);
                tracing::warn!(url = %url, error = %err, "Capture callback failed");
                match inner.callback_failure {
                    CallbackFailure::PassThrough => return send(request).await,
                    CallbackFailure::CaptureWithoutMetadata => CaptureDecision::capture(),
                }
            }
        };

        if decision.exclude {
            tracing::trace!(url = %url, pattern = %rule.pattern(), "Request excluded from capture");
            return send(request).await;
        }

        tracing::trace!(url = %url, pattern = %rule.pattern(), "Capturing request");
        inner.instrumentation.run(request, decision, send).await
    }
}
