//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem with human-readable or JSON output. The
//! default level is `error`, which keeps a normal run quiet apart from the
//! result itself.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `level` - Default filter directive, e.g. `"error"` or `"info"`.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// # Notes
///
/// - Log output goes to stderr (stdout is reserved for the result)
/// - The RUST_LOG environment variable can override the log level
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

/// Pick the effective level: `--verbose` beats `--with-logs`, which beats config.
pub fn effective_level(config_level: &str, with_logs: bool, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else if with_logs {
        "info".to_string()
    } else {
        config_level.to_ascii_lowercase()
    }
}

/// Initialize logging from the `[logging]` config section and CLI overrides.
pub fn init_from_config(
    config: &photofind_core::Config,
    with_logs: bool,
    verbose: bool,
    json_logs_override: bool,
) {
    let level = effective_level(&config.logging.level, with_logs, verbose);
    let json_format = json_logs_override || config.logging.format.eq_ignore_ascii_case("json");
    init(&level, json_format);
}
