//! Ordered capture rules.
//!
//! Rules are append-only and evaluated in registration order; the first
//! pattern matching a request URL wins. The rule list is copy-on-write:
//! `register` swaps in a new list, lookups clone the current `Arc` and scan
//! it without holding the lock.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{panic_message, BoxError, CallbackError, InterceptionError};
use crate::matcher::PatternMatcher;
use crate::transport::HttpRequest;

/// Decides per request whether to capture and what metadata to attach.
pub type CaptureCallback =
    Arc<dyn Fn(&HttpRequest) -> Result<CaptureDecision, BoxError> + Send + Sync>;

/// Outcome of a capture callback for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureDecision {
    pub metadata: BTreeMap<String, String>,
    /// Skip instrumentation and pass the request straight through.
    pub exclude: bool,
}

impl CaptureDecision {
    pub fn capture() -> Self {
        Self::default()
    }

    pub fn exclude() -> Self {
        Self {
            metadata: BTreeMap::new(),
            exclude: true,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Capture with every request header whose name starts with `prefix`
    /// copied into metadata. Non-UTF-8 values are skipped.
    pub fn from_headers(request: &HttpRequest, prefix: &str) -> Self {
        let prefix = prefix.to_ascii_lowercase();
        let metadata = request
            .headers()
            .iter()
            .filter(|(name, _)| name.as_str().starts_with(&prefix))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self {
            metadata,
            exclude: false,
        }
    }
}

/// A registered (pattern, callback) pair.
#[derive(Clone)]
pub struct CaptureRule {
    pattern: String,
    callback: CaptureCallback,
}

impl fmt::Debug for CaptureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureRule")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl CaptureRule {
    pub fn new(pattern: impl Into<String>, callback: CaptureCallback) -> Self {
        Self {
            pattern: pattern.into(),
            callback,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Run the callback. Errors and panics both become [`CallbackError`].
    pub fn evaluate(&self, request: &HttpRequest) -> Result<CaptureDecision, CallbackError> {
        match catch_unwind(AssertUnwindSafe(|| (self.callback)(request))) {
            Ok(Ok(decision)) => Ok(decision),
            Ok(Err(source)) => Err(CallbackError::Failed {
                pattern: self.pattern.clone(),
                source,
            }),
            Err(payload) => Err(CallbackError::Panicked {
                pattern: self.pattern.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

#[derive(Clone, Default)]
pub struct CaptureRegistry {
    rules: Arc<RwLock<Arc<Vec<CaptureRule>>>>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, rule: CaptureRule) {
        let mut rules = self.rules.write();
        let mut next = Vec::with_capacity(rules.len() + 1);
        next.extend(rules.iter().cloned());
        next.push(rule);
        *rules = Arc::new(next);
    }

    /// Current rule list. Later registrations do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Vec<CaptureRule>> {
        self.rules.read().clone()
    }

    /// First rule whose pattern matches `url`.
    ///
    /// A pattern the matcher rejects is skipped and scanning continues.
    pub fn find(
        &self,
        url: &str,
        matcher: &dyn PatternMatcher,
        path_required: bool,
    ) -> Option<CaptureRule> {
        let rules = self.snapshot();
        rules
            .iter()
            .find(|rule| match matcher.matches(&rule.pattern, url, path_required) {
                Ok(matched) => matched,
                Err(err) => {
                    let err = InterceptionError::from(err);
                    tracing::debug!(url = %url, error = %err, "Skipping capture rule");
                    false
                }
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn patterns(&self) -> Vec<String> {
        self.snapshot().iter().map(|r| r.pattern.clone()).collect()
    }
}
