//! Shim construction and lifecycle.
//!
//! A [`ShimHandle`] owns the capture registry, identifier generator and
//! lifecycle state. Requests only flow through it once the caller installs
//! it on a transport with [`ShimHandle::wrap`] or [`ShimHandle::layer`].
//!
//! [`Shim::create`] returns the process-wide instance; the first call wins and
//! later arguments are ignored. [`Shim::new`] builds an independent instance.

pub mod state;

use std::sync::{Arc, OnceLock};

use crate::config::{disabled_from_env, ShimConfig, ShimOptions, OPTIONS_ENV};
use crate::engine::Interceptor;
use crate::error::{BoxError, TransportError};
use crate::id::{IdGenerator, IdScheme, SnowflakeGenerator, Uuid7Generator};
use crate::instrument::Instrumentation;
use crate::matcher::{PatternMatcher, WildcardMatcher};
use crate::registry::{CaptureDecision, CaptureRegistry, CaptureRule};
use crate::transport::{CaptureLayer, CaptureTransport, HttpRequest, ReqwestTransport, Transport};

pub use state::ShimState;
use state::StateCell;

static GLOBAL: ShimCell = ShimCell::new();

pub struct Shim;

impl Shim {
    /// The process-wide shim, created on first call.
    pub fn create(api_key: Option<String>, options: ShimOptions) -> ShimHandle {
        GLOBAL.get_or_create(api_key, options)
    }

    /// The process-wide shim if [`Shim::create`] has run.
    pub fn global() -> Option<ShimHandle> {
        GLOBAL.get().cloned()
    }

    /// An independent shim, not tied to the process-wide instance.
    pub fn new(api_key: Option<String>, options: ShimOptions) -> ShimHandle {
        ShimHandle::build(api_key, options)
    }
}

/// One-time initialization guard for a shared shim.
///
/// Concurrent first callers race on the inner `OnceLock`; exactly one
/// initializer runs and everyone observes the finished handle. The winning
/// initializer also installs diagnostics logging when
/// [`LOG_ENV`](crate::logging::LOG_ENV) is set.
pub struct ShimCell {
    cell: OnceLock<ShimHandle>,
}

impl ShimCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_create(&self, api_key: Option<String>, options: ShimOptions) -> ShimHandle {
        let mut initialized_here = false;
        let handle = self.cell.get_or_init(|| {
            initialized_here = true;
            if crate::logging::init_tracing() {
                tracing::debug!("Diagnostics logging enabled");
            }
            ShimHandle::build(api_key, options)
        });
        if !initialized_here {
            tracing::debug!("Shim already initialized, construction arguments ignored");
        }
        handle.clone()
    }

    pub fn get(&self) -> Option<&ShimHandle> {
        self.cell.get()
    }
}

impl Default for ShimCell {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct ShimHandle {
    inner: Arc<ShimInner>,
}

struct ShimInner {
    api_key: Option<String>,
    options: ShimOptions,
    registry: CaptureRegistry,
    interceptor: Interceptor,
    state: Arc<StateCell>,
}

impl ShimHandle {
    fn build(api_key: Option<String>, mut options: ShimOptions) -> Self {
        if options.config == ShimConfig::default() {
            match ShimConfig::from_env() {
                Ok(config) => options.config = config,
                Err(err) => tracing::warn!(error = %err, "Ignoring {}", OPTIONS_ENV),
            }
        }
        let config = &options.config;
        let disabled = options.disabled.unwrap_or_else(disabled_from_env);
        let state = Arc::new(StateCell::new(if disabled {
            ShimState::Disabled
        } else {
            ShimState::Running
        }));

        let ids: Arc<dyn IdGenerator> = match config.id_scheme {
            IdScheme::Snowflake => Arc::new(match config.node_id {
                Some(node) => SnowflakeGenerator::new(node, config.epoch_ms),
                None => SnowflakeGenerator::for_process(config.epoch_ms),
            }),
            IdScheme::Uuid7 => Arc::new(Uuid7Generator),
        };
        let matcher: Arc<dyn PatternMatcher> = options
            .matcher
            .clone()
            .unwrap_or_else(|| Arc::new(WildcardMatcher));

        let registry = CaptureRegistry::new();
        let instrumentation =
            Instrumentation::new(ids, options.log.clone(), config.failure_policy.transport);
        let interceptor = Interceptor::new(
            registry.clone(),
            matcher,
            config.path_required,
            config.failure_policy.callback,
            instrumentation,
            state.clone(),
        );

        tracing::info!(
            state = ?state.get(),
            id_scheme = ?config.id_scheme,
            sink = options.log.is_some(),
            "Capture shim initialized"
        );

        Self {
            inner: Arc::new(ShimInner {
                api_key,
                options,
                registry,
                interceptor,
                state,
            }),
        }
    }

    /// Register a capture rule. Rules are matched in registration order.
    pub fn capture<F>(&self, pattern: impl Into<String>, callback: F)
    where
        F: Fn(&HttpRequest) -> CaptureDecision + Send + Sync + 'static,
    {
        self.try_capture(pattern, move |req| Ok::<_, BoxError>(callback(req)));
    }

    /// Register a capture rule whose callback may fail.
    ///
    /// A failing callback never fails the request; see
    /// [`CallbackFailure`](crate::config::CallbackFailure).
    pub fn try_capture<F, E>(&self, pattern: impl Into<String>, callback: F)
    where
        F: Fn(&HttpRequest) -> Result<CaptureDecision, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let pattern = pattern.into();
        tracing::debug!(pattern = %pattern, "Registered capture rule");
        self.inner.registry.register(CaptureRule::new(
            pattern,
            Arc::new(move |req: &HttpRequest| -> Result<CaptureDecision, BoxError> {
                callback(req).map_err(Into::into)
            }),
        ));
    }

    /// Uninstall capture: every later request passes straight through.
    pub fn stop(&self) {
        if self.inner.state.stop() {
            tracing::info!("Capture shim stopped");
        }
    }

    pub fn state(&self) -> ShimState {
        self.inner.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ShimState::Running
    }

    pub fn api_key(&self) -> Option<&str> {
        self.inner.api_key.as_deref()
    }

    pub fn options(&self) -> &ShimOptions {
        &self.inner.options
    }

    pub fn patterns(&self) -> Vec<String> {
        self.inner.registry.patterns()
    }

    pub fn interceptor(&self) -> Interceptor {
        self.inner.interceptor.clone()
    }

    /// Decorate `transport` so its requests pass through capture.
    pub fn wrap<T: Transport>(&self, transport: T) -> CaptureTransport<T> {
        CaptureTransport::new(transport, self.interceptor())
    }

    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer::new(self.interceptor())
    }

    /// A reqwest transport configured from the shim's options, already wrapped.
    pub fn client(&self) -> Result<CaptureTransport<ReqwestTransport>, TransportError> {
        let transport = ReqwestTransport::from_config(&self.inner.options.config)?;
        Ok(self.wrap(transport))
    }

    /// Whether both handles refer to the same shim.
    pub fn same_as(&self, other: &ShimHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_first_call_wins() {
        let cell = ShimCell::new();
        assert!(cell.get().is_none());

        let first =
            cell.get_or_create(Some("key-one".to_string()), ShimOptions::new().disabled(false));
        first.capture("https://example.com/*", |_req| CaptureDecision::capture());

        let second =
            cell.get_or_create(Some("key-two".to_string()), ShimOptions::new().disabled(true));
        assert!(first.same_as(&second));
        assert_eq!(second.api_key(), Some("key-one"));
        assert_eq!(second.state(), ShimState::Running);
        assert_eq!(second.patterns(), vec!["https://example.com/*"]);
    }

    #[test]
    fn test_independent_instances() {
        let a = Shim::new(None, ShimOptions::new().disabled(false));
        let b = Shim::new(None, ShimOptions::new().disabled(false));
        assert!(!a.same_as(&b));
        assert!(a.api_key().is_none());
    }

    #[test]
    fn test_stop_is_terminal() {
        let shim = Shim::new(None, ShimOptions::new().disabled(false));
        assert!(shim.is_running());
        shim.stop();
        shim.stop();
        assert_eq!(shim.state(), ShimState::Stopped);
    }

    #[test]
    fn test_disabled_is_terminal() {
        let shim = Shim::new(None, ShimOptions::new().disabled(true));
        assert_eq!(shim.state(), ShimState::Disabled);
        shim.stop();
        assert_eq!(shim.state(), ShimState::Disabled);
        assert_eq!(shim.interceptor().state(), ShimState::Disabled);
    }

    #[test]
    fn test_uuid_scheme_from_config() {
        let config = ShimConfig {
            id_scheme: IdScheme::Uuid7,
            ..ShimConfig::default()
        };
        let shim = Shim::new(None, ShimOptions::new().with_config(config).disabled(false));
        assert_eq!(shim.options().config.id_scheme, IdScheme::Uuid7);
    }
}
