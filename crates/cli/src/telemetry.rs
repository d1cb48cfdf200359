//! Structured logging setup.
//!
//! Every `tracing` event emitted by any crate in the workspace is rendered as
//! one JSON object per line, either to stdout or appended to the configured
//! log file. `RUST_LOG`, when set, takes precedence over `log.level`.

use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Keeps the background log writer alive. Drop it only at process exit so
/// buffered lines are flushed.
pub struct TelemetryGuard {
    _writer: WorkerGuard,
}

/// Maps a configured level name to a filter; unknown names mean `INFO`.
pub fn level_from_name(name: &str) -> LevelFilter {
    match name.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => LevelFilter::DEBUG,
        "INFO" => LevelFilter::INFO,
        "WARN" => LevelFilter::WARN,
        "ERROR" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Installs the global JSON subscriber described by `log`.
pub fn init(log: &LogConfig) -> Result<TelemetryGuard> {
    let (writer, guard) = if log.file_path.is_empty() {
        tracing_appender::non_blocking(std::io::stdout())
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log.file_path)
            .with_context(|| format!("opening log file {}", log.file_path))?;
        tracing_appender::non_blocking(file)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level_from_name(&log.level).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(writer),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(TelemetryGuard { _writer: guard })
}
