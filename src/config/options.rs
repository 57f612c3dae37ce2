//! Construction-time options for a shim.

use std::fmt;
use std::sync::Arc;

use super::types::ShimConfig;
use crate::matcher::PatternMatcher;
use crate::sink::LogSink;

/// Options passed to [`Shim::create`](crate::shim::Shim::create).
#[derive(Clone, Default)]
pub struct ShimOptions {
    /// Destination for serialized records. Without a sink, records are dropped.
    pub log: Option<Arc<dyn LogSink>>,
    /// Pattern matcher; [`WildcardMatcher`](crate::matcher::WildcardMatcher) when unset.
    pub matcher: Option<Arc<dyn PatternMatcher>>,
    /// Overrides [`DISABLE_ENV`](super::DISABLE_ENV) when set.
    pub disabled: Option<bool>,
    /// Left at its default, the shim reads [`OPTIONS_ENV`](super::OPTIONS_ENV)
    /// at construction instead. An explicit config ignores the variable.
    pub config: ShimConfig,
}

impl ShimOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, sink: impl LogSink + 'static) -> Self {
        self.log = Some(Arc::new(sink));
        self
    }

    pub fn with_matcher(mut self, matcher: impl PatternMatcher + 'static) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    pub fn with_config(mut self, config: ShimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }
}

impl fmt::Debug for ShimOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShimOptions")
            .field("log", &self.log.is_some())
            .field("matcher", &self.matcher.is_some())
            .field("disabled", &self.disabled)
            .field("config", &self.config)
            .finish()
    }
}
