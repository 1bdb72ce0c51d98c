//! Rolling Logger
//!
//! Installs a `tracing` subscriber that writes to time-rotated log files and
//! keeps the most recent lines in memory. Records emitted through the `log`
//! facade are captured as well, so library crates only need `log`.

mod sink;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime, writer::MakeWriterExt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sink::RingSink;

pub use tracing_appender::rolling::Rotation;

/// Logger errors
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("log file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to create log appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("unknown log rotation {0:?}")]
    UnknownRotation(String),
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Rotation and buffering limits
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// How often a new log file is started
    pub rotation: Rotation,
    /// Log files kept in the directory; 0 keeps them all
    pub keep: usize,
    /// Lines kept in memory for `recent_lines`
    pub ring_capacity: usize,
    /// Filter directive used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            rotation: Rotation::DAILY,
            keep: 3,
            ring_capacity: 500,
            default_filter: "info".to_string(),
        }
    }
}

/// Parse a rotation name: `minutely`, `hourly`, `daily` or `never`
pub fn rotation_from_name(name: &str) -> Result<Rotation, LoggerError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "minutely" => Ok(Rotation::MINUTELY),
        "hourly" => Ok(Rotation::HOURLY),
        "daily" => Ok(Rotation::DAILY),
        "never" => Ok(Rotation::NEVER),
        _ => Err(LoggerError::UnknownRotation(name.to_string())),
    }
}

/// Handle returned by a successful init
#[derive(Clone)]
pub struct LoggerHandle {
    dir: PathBuf,
    ring: RingSink,
}

impl LoggerHandle {
    /// Directory holding the log files
    pub fn log_dir(&self) -> &Path {
        &self.dir
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.ring.recent_lines()
    }
}

static RING: OnceLock<RingSink> = OnceLock::new();

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize logging into `<log_dir>/<app_name>.*.log` with default limits
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<LoggerHandle, LoggerError> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

/// Initialize logging with explicit limits
pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: LoggerConfig,
) -> Result<LoggerHandle, LoggerError> {
    if RING.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let dir = log_dir.as_ref().to_path_buf();
    std::fs::create_dir_all(&dir)?;

    let mut builder = RollingFileAppender::builder()
        .rotation(config.rotation.clone())
        .filename_prefix(app_name)
        .filename_suffix("log");
    if config.keep > 0 {
        builder = builder.max_log_files(config.keep);
    }
    let files = builder.build(&dir)?;
    let ring = RingSink::new(config.ring_capacity);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(files.and(ring.clone()))
                .with_timer(LocalTime)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| LoggerError::Install(e.to_string()))?;

    RING.set(ring.clone()).map_err(|_| LoggerError::AlreadyInitialized)?;
    Ok(LoggerHandle { dir, ring })
}

/// Most recent formatted lines, oldest first (empty before init)
pub fn recent_lines() -> Vec<String> {
    RING.get().map(RingSink::recent_lines).unwrap_or_default()
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    RING.get().ok_or(LoggerError::NotInitialized)?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), LoggerError> {
    RING.get().ok_or(LoggerError::NotInitialized)?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    RING.get().ok_or(LoggerError::NotInitialized)?;
    tracing::error!("{}", msg);
    Ok(())
}
