// src/logging.rs

//! Logging setup for `omrbench` using `tracing` + `tracing-subscriber`.
//!
//! The level is taken from `--log-level`, then from `OMRBENCH_LOG`, and
//! falls back to `info`.
//!
//! Diagnostics go to STDERR. STDOUT is reserved for the console report that
//! [`crate::console::ConsoleReporter`] prints, so piping the runner's stdout
//! never mixes the two.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "OMRBENCH_LOG";

/// Initialise the global subscriber. Call once at startup.
///
/// `ansi` follows `--no-color` so that log lines and the console report are
/// either both colored or both plain.
pub fn init_logging(cli_level: Option<LogLevel>, ansi: bool) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_value.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Pick the effective level from the CLI flag and the environment value.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_value.and_then(parse_level_str).unwrap_or(Level::INFO),
    }
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
