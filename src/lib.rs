//! Outbound HTTP capture.
//!
//! Register URL patterns with a callback; matching requests are timed,
//! classified and reported to a log sink as a [`CapturedRecord`] while the
//! real call proceeds untouched.
//!
//! ```no_run
//! use capture_shim::{CaptureDecision, Shim, ShimOptions, Transport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let shim = Shim::create(None, ShimOptions::new().with_log(|msg: &str| println!("{}", msg)));
//! shim.capture("https://example.com/*", |req| CaptureDecision::from_headers(req, "x-"));
//!
//! let client = shim.client()?;
//! let request = http::Request::builder()
//!     .uri("https://example.com/test")
//!     .header("x-sample", "sample")
//!     .body(bytes::Bytes::new())?;
//! let response = client.send(request).await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod id;
pub mod instrument;
pub mod logging;
pub mod matcher;
pub mod record;
pub mod registry;
pub mod shim;
pub mod sink;
pub mod transport;

pub use config::{CallbackFailure, FailurePolicy, ShimConfig, ShimOptions, TransportFailure};
pub use engine::Interceptor;
pub use error::{
    BoxError, CallbackError, ConfigError, InterceptionError, MatchError, SinkError, TransportError,
};
pub use id::{IdGenerator, IdScheme, Snowflake, SnowflakeGenerator, Uuid7Generator};
pub use matcher::{PatternMatcher, WildcardMatcher};
pub use record::{CapturedRecord, Level};
pub use registry::{CaptureCallback, CaptureDecision, CaptureRegistry, CaptureRule};
pub use shim::{Shim, ShimCell, ShimHandle, ShimState};
pub use sink::{LogSink, TracingSink};
pub use transport::{
    CaptureLayer, CaptureService, CaptureTransport, HttpRequest, HttpResponse, ReasonPhrase,
    ReqwestTransport, Transport,
};
