//! Logging setup shared by the Adlift binaries.
//!
//! One rolling file per day under the log directory, pruned after a
//! retention window, optionally mirrored to stderr. Call [`init_logging`]
//! once near process start; later calls are no-ops that hand back the
//! already-resolved log file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// File stem for the rolling log (`<app_name>.log.<date>`).
    pub app_name: &'static str,
    /// Optional explicit log directory. If `None`, we consult
    /// `ADLIFT_LOG_DIR` and finally fall back to `./logs`.
    pub log_dir: Option<PathBuf>,
    /// Whether to duplicate events to `stderr` in addition to the file sink.
    pub emit_stderr: bool,
    /// Rolled files older than this many days are removed at startup.
    /// Zero keeps everything.
    pub retention_days: u64,
    /// Default filter applied when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "adlift",
            log_dir: None,
            emit_stderr: false,
            retention_days: 7,
            default_filter: "info",
        }
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Returns the concrete log file path for the current day. Subsequent calls
/// are cheap and simply hand back the originally resolved location.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let resolved_dir = resolve_log_dir(config.log_dir.as_deref());
    std::fs::create_dir_all(&resolved_dir)
        .with_context(|| format!("failed to create log directory: {}", resolved_dir.display()))?;

    let log_filename = format!("{}.log", config.app_name);
    if config.retention_days > 0 {
        if let Some(cutoff) = SystemTime::now()
            .checked_sub(Duration::from_secs(config.retention_days * SECS_PER_DAY))
        {
            prune_older_than(&resolved_dir, &format!("{log_filename}."), cutoff);
        }
    }

    let today = Local::now().format("%Y-%m-%d").to_string();
    let full_path = resolved_dir.join(format!("{log_filename}.{today}"));

    let appender = rolling::daily(resolved_dir, log_filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
    if config.emit_stderr {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
    }

    let _ = LOG_PATH.set(full_path.clone());
    Ok(full_path)
}

/// Delete rolled log files whose mtime precedes `cutoff`.
///
/// Only files named `<prefix><anything>` are considered; everything else in
/// the directory is left alone. Failures are ignored — the subscriber is
/// not up yet and a stale log file is not worth failing startup over.
fn prune_older_than(dir: &Path, prefix: &str, cutoff: SystemTime) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(prefix) {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified());
        if matches!(modified, Ok(stamp) if stamp < cutoff) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

fn resolve_log_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }

    if let Ok(env_dir) = std::env::var("ADLIFT_LOG_DIR") {
        return expand_home(Path::new(&env_dir));
    }

    PathBuf::from("logs")
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
