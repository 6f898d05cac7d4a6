//! Telemetry — opt-in `tracing` subscriber for applications using the SDK.
//!
//! The client only emits `tracing` events; nothing is printed unless the host
//! installs a subscriber, either its own or the one built here.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{FabraicError, FabraicResult};

/// Filter used when `RUST_LOG` is unset and no default is given.
pub const DEFAULT_LOG_FILTER: &str = "info,fabraic=debug";

/// Install a global subscriber with structured JSON logging.
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails if a global
/// subscriber is already installed.
pub fn init_logging(default_filter: Option<&str>) -> FabraicResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or(DEFAULT_LOG_FILTER)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| FabraicError::Config(format!("logging already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging(Some("warn"));
        let err = init_logging(None).unwrap_err();
        assert!(matches!(err, FabraicError::Config(_)));
    }
}
