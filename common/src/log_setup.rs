use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter: {0}")]
    Filter(String),
    #[error("Failed to create log directory '{path}'")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create log file appender: {0}")]
    Appender(String),
    #[error("Logging already initialized")]
    AlreadyInitialized,
}

/// Where and how log output is written.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is not set, e.g. `"info"` or `"savgol=debug"`.
    pub base_level: String,
    /// Directory for rolling log files. `None` logs to the console only.
    pub dir: Option<PathBuf>,
    pub file_prefix: String,
    pub max_log_files: usize,
}

impl LogSettings {
    pub fn new(base_level: &str) -> Self {
        Self {
            base_level: base_level.to_string(),
            dir: Some(PathBuf::from("logs")),
            file_prefix: "savgol".to_string(),
            max_log_files: 5,
        }
    }

    pub fn console_only(mut self) -> Self {
        self.dir = None;
        self
    }
}

/// Console plus daily rolling file logging under `logs/`.
pub fn setup_logging(base_level: &str) -> Result<(), LogSetupError> {
    setup_logging_with(&LogSettings::new(base_level))
}

pub fn setup_logging_with(settings: &LogSettings) -> Result<(), LogSetupError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.base_level))
        .map_err(|e| LogSetupError::Filter(e.to_string()))?;

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let Some(dir) = &settings.dir else {
        return tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()
            .map_err(|_| LogSetupError::AlreadyInitialized);
    };

    std::fs::create_dir_all(dir).map_err(|source| LogSetupError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(&settings.file_prefix)
        .filename_suffix("log")
        .max_log_files(settings.max_log_files)
        .build(dir)
        .map_err(|e| LogSetupError::Appender(e.to_string()))?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}
