//! File-based tracing setup.
//!
//! Logs go to `<data-dir>/taskflow.log` so the terminal UI never gets
//! interleaved output. `RUST_LOG` overrides the configured level.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LOG_FILE_NAME};

/// Install the global subscriber. The returned guard flushes on drop and must
/// be held for the life of the program. Returns `None` if a subscriber was
/// already installed.
pub fn init(config: &AppConfig) -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(config.log_dir(), LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
