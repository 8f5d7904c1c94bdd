//! Logging setup: console plus `pickup.log` in the log directory.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE: &str = "pickup.log";

/// Installs the global subscriber. Keep the guard alive until exit or buffered
/// file lines are lost.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(log_dir: &Path) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(non_blocking_file);

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(guard)
}
