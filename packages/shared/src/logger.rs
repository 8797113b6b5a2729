//! Logging setup for the rickshaw binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the library crates of the workspace and the binary itself.
/// `RUST_LOG` overrides the default when set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "rickshaw-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use rickshaw_shared::logger::setup_logger;
///
/// setup_logger("rickshaw-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let binary_target = binary_name.replace('-', "_");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rickshaw_server={level},rickshaw_client={level},{binary}={level},tower_http=info",
                    level = default_log_level,
                    binary = binary_target,
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
