//! Logging setup utilities for the pomosync binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose logs are enabled by the default filter.
const WORKSPACE_CRATES: [&str; 3] = ["pomosync_shared", "pomosync_server", "pomosync_client"];

/// Build the default `EnvFilter` directive string.
///
/// Every workspace crate and the binary itself get `default_log_level`.
fn default_directives(binary_name: &str, default_log_level: &str) -> String {
    WORKSPACE_CRATES
        .iter()
        .map(|name| name.to_string())
        .chain(std::iter::once(binary_name.replace('-', "_")))
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
/// Output goes to stderr so it does not interleave with interactive stdout.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "pomosync-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use pomosync_shared::logger::setup_logger;
///
/// setup_logger("pomosync-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
