//! Process-wide tracing setup driven by `LOG_OUTPUT`, `LOG_FORMAT` and `LOG_LEVEL`

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

#[derive(Debug, Error)]
pub enum LogSettingsError {
    #[error("Unknown log format {0:?}, must be one of \"console\", \"console-plain\", \"json\", \"raw\" or \"cbor\"")]
    UnknownFormat(String),

    #[error("Unknown log level {0:?}, must be one of \"trace\", \"debug\", \"info\", \"warn\" or \"error\"")]
    UnknownLevel(String),

    #[error("Invalid log file path {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: tracing_appender::rolling::InitError,
    },

    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable with ANSI colour
    Console,
    /// Human-readable without colour
    ConsolePlain,
    /// One JSON object per line, also selected by `raw` and `cbor`
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub output: LogOutput,
    pub format: LogFormat,
    pub level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            format: LogFormat::Console,
            level: LevelFilter::INFO,
        }
    }
}

impl LogSettings {
    pub fn from_env() -> Result<Self, LogSettingsError> {
        let var = |name: &str| std::env::var(name).ok();
        Self::from_values(
            var("LOG_OUTPUT").as_deref(),
            var("LOG_FORMAT").as_deref(),
            var("LOG_LEVEL").as_deref(),
        )
    }

    /// Resolve settings from raw variable values; unset and empty mean default.
    pub fn from_values(
        output: Option<&str>,
        format: Option<&str>,
        level: Option<&str>,
    ) -> Result<Self, LogSettingsError> {
        let output = match output.unwrap_or_default() {
            "" | "stderr" => LogOutput::Stderr,
            "stdout" => LogOutput::Stdout,
            path => LogOutput::File(PathBuf::from(path)),
        };

        let format = match format.unwrap_or_default() {
            "" | "console" => LogFormat::Console,
            "console-plain" => LogFormat::ConsolePlain,
            "json" | "raw" | "cbor" => LogFormat::Json,
            other => return Err(LogSettingsError::UnknownFormat(other.to_string())),
        };

        let level = match level.unwrap_or_default() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "" | "info" => LevelFilter::INFO,
            "warn" | "warning" => LevelFilter::WARN,
            "err" | "error" => LevelFilter::ERROR,
            other => return Err(LogSettingsError::UnknownLevel(other.to_string())),
        };

        Ok(Self {
            output,
            format,
            level,
        })
    }
}

fn make_writer(output: &LogOutput) -> Result<(BoxMakeWriter, Option<WorkerGuard>), LogSettingsError> {
    match output {
        LogOutput::Stderr => Ok((BoxMakeWriter::new(std::io::stderr), None)),
        LogOutput::Stdout => Ok((BoxMakeWriter::new(std::io::stdout), None)),
        LogOutput::File(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| LogSettingsError::InvalidPath(path.clone()))?;
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(&dir)
                .map_err(|source| LogSettingsError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((BoxMakeWriter::new(writer), Some(guard)))
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, takes precedence over the configured level. The
/// returned guard flushes file output on drop and must outlive all logging.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>, LogSettingsError> {
    let (writer, guard) = make_writer(&settings.output)?;
    let filter = EnvFilter::builder()
        .with_default_directive(settings.level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    let installed = match settings.format {
        LogFormat::Console => builder.with_ansi(true).try_init(),
        LogFormat::ConsolePlain => builder.with_ansi(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LogSettingsError::Install(e.to_string()))?;

    Ok(guard)
}
