use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result, bail};
use tracing::Subscriber;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{self, RollingFileAppender},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingRotation};

const LOG_FILE_PREFIX: &str = "growl.log";
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Keeps the non-blocking writer alive; dropping it flushes pending lines.
pub struct LoggingGuard {
    _worker_guard: WorkerGuard,
    run_id: String,
}

impl LoggingGuard {
    /// Identifies this process in every log file it writes to.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Root span that tags everything the server logs with the run id.
    pub fn run_span(&self) -> tracing::Span {
        tracing::info_span!("growl_run", run_id = %self.run_id)
    }
}

/// Which rotated files belong to growl and how long they are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetentionPolicy {
    prefix: &'static str,
    max_age: Duration,
}

#[derive(Debug, Default)]
struct RetentionSweep {
    removed: usize,
    kept: usize,
    warnings: Vec<String>,
}

impl RetentionPolicy {
    fn days(retention_days: usize) -> Self {
        Self {
            prefix: LOG_FILE_PREFIX,
            max_age: Duration::from_secs((retention_days as u64).saturating_mul(SECS_PER_DAY)),
        }
    }

    /// Files last modified at or before the cutoff are expired.
    fn cutoff(&self, now: SystemTime) -> SystemTime {
        now.checked_sub(self.max_age).unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Removes expired growl logs from `dir`. Failures never abort startup;
    /// they are collected as warnings.
    fn sweep(&self, dir: &Path, now: SystemTime) -> RetentionSweep {
        let mut sweep = RetentionSweep::default();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                sweep.warnings.push(format!("failed to scan {}: {err}", dir.display()));
                return sweep;
            }
        };

        let cutoff = self.cutoff(now);
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    sweep.warnings.push(format!("failed to read log directory entry: {err}"));
                    continue;
                }
            };
            if !entry.file_name().to_string_lossy().starts_with(self.prefix) {
                continue;
            }
            match expire_if_older(&entry.path(), cutoff) {
                Ok(true) => sweep.removed += 1,
                Ok(false) => sweep.kept += 1,
                Err(warning) => sweep.warnings.push(warning),
            }
        }
        sweep
    }
}

fn expire_if_older(path: &Path, cutoff: SystemTime) -> Result<bool, String> {
    let metadata =
        fs::metadata(path).map_err(|err| format!("failed to stat {}: {err}", path.display()))?;
    if !metadata.is_file() {
        return Ok(false);
    }
    let modified = metadata
        .modified()
        .map_err(|err| format!("failed to read mtime for {}: {err}", path.display()))?;
    if modified > cutoff {
        return Ok(false);
    }
    fs::remove_file(path)
        .map(|()| true)
        .map_err(|err| format!("failed to remove expired log {}: {err}", path.display()))
}

pub fn init_tracing(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = parse_filter(&config.filter)?;
    let log_dir = absolute_log_dir(&config.dir)?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create logging directory {}", log_dir.display()))?;

    let sweep = RetentionPolicy::days(config.retention_days).sweep(&log_dir, SystemTime::now());
    let (writer, worker_guard) =
        tracing_appender::non_blocking(rolling_appender(&log_dir, &config.rotation));

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(json_file_layer(writer, filter))
        .with(config.stderr_warn_enabled.then(stderr_warn_layer))
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let guard = LoggingGuard {
        _worker_guard: worker_guard,
        run_id: Uuid::now_v7().to_string(),
    };
    tracing::info!(
        target: "logging",
        run_id = guard.run_id(),
        dir = %log_dir.display(),
        filter = %config.filter,
        rotation = ?config.rotation,
        "logging_initialized"
    );
    tracing::info!(
        target: "logging",
        retention_days = config.retention_days,
        removed = sweep.removed,
        kept = sweep.kept,
        "logging_retention_swept"
    );
    for warning in &sweep.warnings {
        tracing::warn!(target: "logging", warning = %warning, "logging_retention_warning");
    }

    Ok(guard)
}

/// One JSON object per line, UTC timestamps, span context included.
fn json_file_layer<S>(writer: NonBlocking, filter: EnvFilter) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter)
}

fn stderr_warn_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(LevelFilter::WARN)
}

fn parse_filter(filter: &str) -> Result<EnvFilter> {
    if filter.trim().is_empty() {
        bail!("logging.filter cannot be empty");
    }
    EnvFilter::try_new(filter).with_context(|| format!("failed to parse logging.filter '{filter}'"))
}

fn rolling_appender(log_dir: &Path, rotation: &LoggingRotation) -> RollingFileAppender {
    match rotation {
        LoggingRotation::Daily => rolling::daily(log_dir, LOG_FILE_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(log_dir, LOG_FILE_PREFIX),
    }
}

fn absolute_log_dir(dir: &Path) -> Result<PathBuf> {
    if dir.as_os_str().is_empty() {
        bail!("logging.dir cannot be empty");
    }
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    Ok(std::env::current_dir()
        .context("failed to read current working directory for logging.dir")?
        .join(dir))
}
