use anyhow::Context;
use std::{
    fs,
    path::Path,
    time::{Duration, SystemTime},
};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Log files older than this are removed at start-up
const MAX_LOG_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 3);

/// Keeps the file writer alive; hold it for the whole run
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

/// Map the `-v` count onto a level, never lowering the configured one.
pub fn effective_level(configured: &str, verbose: u8) -> &str {
    match verbose {
        0 => configured,
        1 if configured == "trace" => configured,
        1 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(log_dir: impl AsRef<Path>, prefix: &str, level: &str) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref();

    let (level, invalid) = match level.parse::<LevelFilter>() {
        Ok(level) => (level, false),
        Err(_) => (LevelFilter::INFO, true),
    };

    let builder = EnvFilter::builder().with_default_directive(level.into());
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    fs::create_dir_all(log_dir).with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to create file appender")?;
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
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if invalid {
        tracing::warn!("Invalid log level, defaulting to 'info'");
    }

    if let Err(e) = cleanup_old_logs(log_dir, prefix, MAX_LOG_AGE) {
        tracing::warn!("Failed to delete old log file: {}", e);
    }

    Ok(LoggerGuard(guard))
}

fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        if let Ok(modified) = fs::metadata(&path)?.modified() {
            if now.duration_since(modified).unwrap_or_default() > max_age {
                fs::remove_file(&path)?;
                tracing::info!("Old log file deleted: {}", file_name);
                removed += 1;
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level("info", 0), "info");
        assert_eq!(effective_level("warn", 1), "debug");
        assert_eq!(effective_level("trace", 1), "trace");
        assert_eq!(effective_level("info", 3), "trace");
    }

    #[test]
    fn test_cleanup_removes_only_old_prefixed_logs() {
        let dir = TempDir::new().unwrap();
        let week_ago = SystemTime::now() - Duration::from_secs(60 * 60 * 24 * 7);
        for name in ["uls-radio.2026-10-01.log", "other.log", "uls-radio.txt"] {
            let file = fs::File::create(dir.path().join(name)).unwrap();
            file.set_modified(week_ago).unwrap();
        }
        fs::write(dir.path().join("uls-radio.2026-10-16.log"), "x").unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), "uls-radio", MAX_LOG_AGE).unwrap(), 1);
        assert!(!dir.path().join("uls-radio.2026-10-01.log").exists());
        assert!(dir.path().join("uls-radio.2026-10-16.log").exists());
        assert!(dir.path().join("other.log").exists());
        assert!(dir.path().join("uls-radio.txt").exists());
    }
}
