//! Tracing subscriber setup for the command-line binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber with optional JSON output.
///
/// `RUST_LOG` overrides the default `info` filter. Logs go to stderr so
/// that the KPI report on stdout stays machine-readable.
pub fn init_tracing(json_output: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
