//! Diagnostics for the shim itself, separate from captured records.

use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable naming the diagnostics log file.
pub const LOG_ENV: &str = "CAPTURE_SHIM_LOG";

const DEFAULT_DIRECTIVE: &str = "capture_shim=info";

/// Install a file-backed subscriber when `CAPTURE_SHIM_LOG` names a file.
///
/// The file is appended to. Nothing is ever written to the host's stdout or
/// stderr: an unset variable, an unopenable file or an already installed
/// global subscriber all leave tracing untouched and return false.
pub fn init_tracing() -> bool {
    let Some(log_path) = std::env::var_os(LOG_ENV) else {
        return false;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return false;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_ok()
}
