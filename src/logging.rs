//! Diagnostic logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `CODEAID_LOG=codeaid=debug`.
pub const LOG_ENV: &str = "CODEAID_LOG";

/// Installs a stderr subscriber filtered by [`LOG_ENV`]. Logging stays off
/// when the variable is unset or invalid, so chat output is not interleaved
/// with diagnostics.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();

    if let Err(err) = result {
        eprintln!("Failed to initialize logging: {err}");
    }
}
