//! File logging. The terminal belongs to the TUI, so nothing is written to stdout.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "qsdash.log";

/// Keeps the non-blocking writer alive; logs are flushed when this drops.
pub struct LogGuard {
    _worker_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Install a subscriber writing to `<dir>/qsdash.log`. Level comes from `RUST_LOG`
/// (default `info`).
pub fn init_logging(dir: &Path) -> Result<LogGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, worker_guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    let path = dir.join(LOG_FILE);
    tracing::info!(log = %path.display(), "qsdash {} starting", env!("CARGO_PKG_VERSION"));
    Ok(LogGuard {
        _worker_guard: worker_guard,
    })
}
