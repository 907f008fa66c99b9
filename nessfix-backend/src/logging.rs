use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::task;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 7);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60 * 6);

/// Keeps the non-blocking file writer flushing until dropped.
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

/// Console + daily rolling file logging.
///
/// `RUST_LOG` directives override `level`. When `cleanup` is set a background
/// task prunes log files older than a week, so it must run inside a Tokio
/// runtime.
pub fn init_logging(log_dir: impl AsRef<Path>, prefix: &str, level: &str, cleanup: bool) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref().to_path_buf();
    let (level, valid) = resolve_level(level);

    let builder = EnvFilter::builder().with_default_directive(level.parse()?);
    let directives = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&directives);
    let file_filter = builder.parse_lossy(&directives);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log file appender in {:?}: {}", log_dir, e))?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    if !valid {
        tracing::warn!("Invalid log level in config, defaulting to 'info'");
    }

    if cleanup {
        start_log_cleanup_task(log_dir, prefix.to_string());
    }

    Ok(LoggerGuard(guard))
}

/// Accepts one of the five tracing levels (any case); anything else maps to `info`.
fn resolve_level(level: &str) -> (&'static str, bool) {
    let lowered = level.trim().to_ascii_lowercase();
    match LEVELS.iter().find(|l| **l == lowered) {
        Some(l) => (*l, true),
        None => ("info", false),
    }
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String) {
    task::spawn(async move {
        loop {
            if let Err(e) = cleanup_old_logs(&log_dir, &prefix, MAX_AGE) {
                tracing::warn!("Failed to delete old log file: {}", e);
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut deleted = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(file_name.starts_with(prefix) && file_name.ends_with(".log")) {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            deleted += 1;
            tracing::info!("Old log file deleted: {}", file_name);
        }
    }
    Ok(deleted)
}
