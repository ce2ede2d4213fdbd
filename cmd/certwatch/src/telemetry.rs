//! Diagnostic logging for certwatch
//!
//! Standard output carries the warning notice, so all diagnostics go to
//! stderr.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "CERTWATCH_LOG";

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_reported() {
        assert!(init_logging().is_ok());
        assert!(init_logging().is_err());
    }
}
