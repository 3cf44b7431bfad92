use std::fs;
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{Dispatch, Level};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer as _;

use crate::error::LoggingError;
use crate::services::logger::{Logger, RecordEncoder, SinkLayer};

const DEFAULT_LOG_PATH: &str = "logs";

/// Severity names accepted by [`LogConfiguration::level`].
/// `fatal` and `panic` have no tracing counterpart and collapse onto error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Panic,
}

impl LogLevel {
    pub fn parse(name: &str) -> Option<LogLevel> {
        match name {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            "fatal" => Some(LogLevel::Fatal),
            "panic" => Some(LogLevel::Panic),
            _ => None,
        }
    }

    pub fn threshold(self) -> Level {
        match self {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Console,
}

impl LogFormat {
    pub fn parse(name: &str) -> Option<LogFormat> {
        match name {
            "json" => Some(LogFormat::Json),
            "file" | "console" => Some(LogFormat::Console),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Detail,
    Data,
}

impl LogMode {
    pub fn parse(name: &str) -> Option<LogMode> {
        match name {
            "detail" => Some(LogMode::Detail),
            "data" => Some(LogMode::Data),
            _ => None,
        }
    }
}

/// A configured string that was not recognized and got replaced by its
/// default. Surfaced on the built [`Logger`] instead of being swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFallback {
    Level { given: String },
    Format { given: String },
    Mode { given: String },
}

/// Caller populated settings for the structured logger facade.
///
/// `level`, `format` and `mode` are plain strings so the embedding
/// application can wire them straight from its own configuration source.
/// Empty strings select the documented defaults; non-empty strings outside
/// the recognized sets also resolve to the defaults, but the substitution
/// is reported through [`Logger::fallbacks`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfiguration {
    pub environment: String,
    pub service_name: String,
    pub log_path: String,
    pub max_age_days: usize,
    pub level: String,
    pub format: String,
    pub mode: String,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            environment: String::new(),
            service_name: String::new(),
            log_path: String::new(),
            max_age_days: 7,
            level: String::new(),
            format: String::new(),
            mode: String::new(),
        }
    }
}

impl LogConfiguration {
    /// Assembles the two rotating sinks and returns the ready logger handle.
    ///
    /// Records strictly below warning land in the `_info` sink, warning and
    /// above in the `_err` sink; anything below the resolved threshold is
    /// dropped before it reaches either. Rebuilding yields an equivalent but
    /// distinct logger instance.
    pub fn build(&self) -> Result<Logger, LoggingError> {
        let directory = if self.log_path.is_empty() {
            DEFAULT_LOG_PATH
        } else {
            self.log_path.as_str()
        };
        fs::create_dir_all(directory).map_err(|source| LoggingError::CreateDir {
            path: directory.to_string(),
            source,
        })?;

        let mut fallbacks = Vec::new();
        let level = self.resolve_level(&mut fallbacks);
        let format = self.resolve_format(&mut fallbacks);
        let mode = self.resolve_mode(&mut fallbacks);

        let stem = self.file_stem();
        let info_appender = rolling_writer(directory, format!("{stem}_info"), self.max_age_days)?;
        let err_appender = rolling_writer(directory, format!("{stem}_err"), self.max_age_days)?;
        let (info_writer, info_guard) = tracing_appender::non_blocking(info_appender);
        let (err_writer, err_guard) = tracing_appender::non_blocking(err_appender);

        let encoder = Arc::new(RecordEncoder::new(
            format,
            mode,
            non_empty(&self.service_name),
            non_empty(&self.environment),
        ));

        // tracing orders TRACE as the greatest level, so `<= threshold`
        // reads as "at or above the threshold severity".
        let threshold = level.threshold();
        let info_layer = SinkLayer::new(Arc::clone(&encoder), info_writer)
            .with_filter(filter_fn(move |metadata| {
                let level = *metadata.level();
                level > Level::WARN && level <= threshold
            }));
        let err_layer = SinkLayer::new(encoder, err_writer).with_filter(filter_fn(move |metadata| {
            let level = *metadata.level();
            level <= Level::WARN && level <= threshold
        }));

        let subscriber = tracing_subscriber::registry()
            .with(info_layer)
            .with(err_layer);
        Ok(Logger::new(
            Dispatch::new(subscriber),
            [info_guard, err_guard],
            fallbacks,
        ))
    }

    fn resolve_level(&self, fallbacks: &mut Vec<ConfigFallback>) -> LogLevel {
        match self.level.as_str() {
            "" => LogLevel::Info,
            name => LogLevel::parse(name).unwrap_or_else(|| {
                fallbacks.push(ConfigFallback::Level {
                    given: name.to_string(),
                });
                LogLevel::Info
            }),
        }
    }

    fn resolve_format(&self, fallbacks: &mut Vec<ConfigFallback>) -> LogFormat {
        match self.format.as_str() {
            "" => LogFormat::Json,
            name => LogFormat::parse(name).unwrap_or_else(|| {
                fallbacks.push(ConfigFallback::Format {
                    given: name.to_string(),
                });
                LogFormat::Json
            }),
        }
    }

    fn resolve_mode(&self, fallbacks: &mut Vec<ConfigFallback>) -> LogMode {
        match self.mode.as_str() {
            "" => LogMode::Detail,
            name => LogMode::parse(name).unwrap_or_else(|| {
                fallbacks.push(ConfigFallback::Mode {
                    given: name.to_string(),
                });
                LogMode::Detail
            }),
        }
    }

    fn file_stem(&self) -> String {
        if self.service_name.is_empty() {
            Local::now().format("%Y%m%d").to_string()
        } else {
            self.service_name.clone()
        }
    }
}

// Daily rotation makes one file per day, so the retention window in days
// maps directly onto the kept file count. A zero max age keeps everything.
fn rolling_writer(
    directory: &str,
    stem: String,
    max_age_days: usize,
) -> Result<RollingFileAppender, LoggingError> {
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(stem)
        .filename_suffix("log");
    if max_age_days > 0 {
        builder = builder.max_log_files(max_age_days);
    }
    Ok(builder.build(directory)?)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
