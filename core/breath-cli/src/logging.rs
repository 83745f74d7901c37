//! Log setup for the `justbe` binary.
//!
//! Logs go to a daily-rolling file under `~/.justbe/logs/` so they never
//! interleave with the session display on stdout. If the log directory is
//! unavailable, logs fall back to stderr.

use std::env;

use breath_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV_VAR: &str = "JUSTBE_DEBUG_LOG";
const LOG_FILE_PREFIX: &str = "justbe.log";

/// Installs the global subscriber. Keep the guard alive until exit so buffered lines flush.
pub fn init(storage: Option<&StorageConfig>) -> Option<WorkerGuard> {
    let filter = env_filter();

    let Some(logs_dir) = storage.map(StorageConfig::logs_dir) else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    };

    if let Err(err) = fs_err::create_dir_all(&logs_dir) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        tracing::warn!(error = %err, "Log directory unavailable; logging to stderr");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var(DEBUG_ENV_VAR)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
