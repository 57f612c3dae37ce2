mod env;
mod options;
mod types;

pub use env::{disabled_from_env, DISABLE_ENV, OPTIONS_ENV};
pub use options::ShimOptions;
pub use types::{
    CallbackFailure, FailurePolicy, PoolSettings, ShimConfig, TimeoutSettings, TransportFailure,
};
