//! Logging Infrastructure
//!
//! Console output (pretty or JSON) plus an optional daily-rotating log file.
//! `RUST_LOG` overrides the configured level.

use chrono::{Local, NaiveDate};
use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Rotated files are named `catalog-sync.YYYY-MM-DD.log`
const LOG_PREFIX: &str = "catalog-sync";
const LOG_SUFFIX: &str = "log";

/// Days of rotated log files to keep
pub const LOG_RETENTION_DAYS: i64 = 14;

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - JSON console output instead of the pretty format
/// * `log_dir` - Optional directory for daily-rotating log files
///
/// # Examples
/// ```ignore
/// // Console only
/// init_logger_with_file("debug", false, None)?;
///
/// // Console + file
/// init_logger_with_file("info", true, Some("./work_dir/logs"))?;
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_dir {
        Some(dir) => {
            let dir = Path::new(dir);
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_PREFIX)
                .filename_suffix(LOG_SUFFIX)
                .build(dir)?;
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(appender)),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if json_format {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init()?;
    } else {
        subscriber
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    if let Some(dir) = log_dir {
        let removed = cleanup_old_logs(Path::new(dir), LOG_RETENTION_DAYS)?;
        if removed > 0 {
            tracing::info!(removed, "Deleted old log files");
        }
    }

    Ok(())
}

/// Delete rotated log files older than `days`, returning how many were removed
pub fn cleanup_old_logs(log_dir: &Path, days: i64) -> anyhow::Result<usize> {
    let cutoff = Local::now().date_naive() - chrono::Duration::days(days);
    cleanup_logs_before(log_dir, cutoff)
}

fn cleanup_logs_before(log_dir: &Path, cutoff: NaiveDate) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if let Some(date) = rotated_date(name)
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Date part of `catalog-sync.YYYY-MM-DD.log`
fn rotated_date(name: &str) -> Option<NaiveDate> {
    let date = name
        .strip_prefix(LOG_PREFIX)?
        .strip_prefix('.')?
        .strip_suffix(LOG_SUFFIX)?
        .strip_suffix('.')?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
