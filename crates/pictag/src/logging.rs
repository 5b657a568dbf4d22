//! Logging setup on top of `tracing-subscriber`.
//!
//! Logs go to stderr; stdout carries the JSON results.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Pick level and format from `[logging]`, with the CLI flags taking
/// precedence.
pub fn init_from_config(config: &pictag_core::Config, verbose: bool, json_logs: bool) {
    let (level, json_format) = resolve(&config.logging, verbose, json_logs);
    init(level, json_format);
}

fn resolve(
    logging: &pictag_core::config::LoggingConfig,
    verbose: bool,
    json_logs: bool,
) -> (&str, bool) {
    let level = match (verbose, logging.level.as_str()) {
        (true, "trace") => "trace",
        (true, _) => "debug",
        (false, level) => level,
    };
    (level, json_logs || logging.format == "json")
}
