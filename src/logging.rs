// Logging setup.
// Sends tracing output to a log file so the alternate screen stays clean.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::{LongreadError, Result};

pub const LOG_FILE: &str = "longread.log";

/// Initialize file logging in `dir`.
///
/// `RUST_LOG` takes precedence over `default_level`. The returned guard
/// flushes buffered lines when dropped, so keep it alive until exit.
pub fn init(dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| LongreadError::Other(e.to_string()))?;

    Ok(guard)
}
