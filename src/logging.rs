//! Structured logging for reachability-rerun
//!
//! This module provides:
//! - Leveled logging in console or JSON format
//! - Correlation IDs that tie every poll of a rerun to its trigger
//! - An API logger recording each HTTP exchange with the reachability API
//!
//! All log output goes to stderr. Stdout carries test results and generated
//! CI configuration only, so it stays machine-readable.

use crate::error::AppError;
use crate::models::{Config, ConnectivityTest};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn color(&self) -> Color {
        match self {
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that emitted the entry
    pub logger: String,
    /// Ties the polls of one rerun to its trigger
    pub correlation_id: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
}

/// Leveled logger writing to stderr
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    base_fields: BTreeMap<String, serde_json::Value>,
}

impl Logger {
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: false,
            include_location: false,
            format: LogFormat::Console,
            name,
            base_fields: BTreeMap::new(),
        }
    }

    /// Logger whose level and format follow the configuration: debug logs
    /// everything as JSON, verbose logs progress, otherwise only warnings
    pub fn with_config(name: String, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            base_fields: BTreeMap::new(),
        }
        .with_field("project", &config.project)
    }

    /// Field attached to every entry of this logger
    pub fn with_field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.base_fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let mut line = self.render(&entry);
        line.push('\n');
        let mut stderr = tokio::io::stderr();
        // Losing a log line is preferable to failing a rerun over it
        let _ = stderr.write_all(line.as_bytes()).await;
        let _ = stderr.flush().await;
    }

    /// Render an entry in the configured format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S%.3f");
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color {
            level.color(entry.level.color()).to_string()
        } else {
            level
        };

        let mut output = format!("{} {} [{}] {}", timestamp, level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        let fields: Vec<String> = entry
            .fields
            .iter()
            .filter(|(key, _)| !self.base_fields.contains_key(*key))
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !fields.is_empty() {
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        serde_json::to_string(entry).unwrap_or_else(|e| {
            serde_json::json!({ "level": entry.level, "message": entry.message, "serialize_error": e.to_string() })
                .to_string()
        })
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: logger.base_fields.clone(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add the verdict of a finished connectivity test
    pub fn test_result(self, test: &ConnectivityTest) -> Self {
        self.field("test", &test.name)
            .field("result", test.result().as_str())
            .field("reachable", test.reachable())
            .field("verify_time", test.reachability_details.verify_time)
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }

    #[cfg(test)]
    fn build(self) -> LogEntry {
        self.entry
    }
}

/// Logger for exchanges with the reachability API
#[derive(Clone)]
pub struct ApiLogger {
    logger: Logger,
    echo_bodies: bool,
}

impl ApiLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("API".to_string(), config),
            echo_bodies: config.verbose || config.debug,
        }
    }

    /// Start a correlation ID for one rerun and its polls
    pub fn new_correlation_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Log HTTP request
    pub async fn log_http_request(&self, method: &str, url: &str, status_code: Option<u16>, duration_ms: f64) {
        let success = status_code == Some(200);
        let level = if success { LogLevel::Debug } else { LogLevel::Warn };

        let message = format!("{} {} -> {} in {:.1}ms",
            method, url,
            status_code.map_or("FAILED".to_string(), |c| c.to_string()),
            duration_ms);

        self.logger.log(level, &message)
            .field("url", url)
            .field("method", method)
            .field("status_code", status_code)
            .field("duration_ms", duration_ms)
            .log()
            .await;
    }

    /// Echo a raw response body when running verbose
    pub async fn log_body(&self, url: &str, body: &str) {
        if !self.echo_bodies {
            return;
        }
        self.logger.info(body.trim_end())
            .field("url", url)
            .log()
            .await;
    }

    pub async fn log_token_refreshed(&self, url: &str) {
        self.logger.info("Access token rejected, retrying with a fresh token")
            .field("url", url)
            .log()
            .await;
    }

    pub async fn log_rerun_started(&self, correlation_id: &str, test: &str, operation: &str) {
        self.logger.info(&format!("Rerun triggered for {}", test))
            .correlation_id(correlation_id)
            .field("test", test)
            .field("operation", operation)
            .log()
            .await;
    }

    pub async fn log_poll(&self, correlation_id: &str, operation: &str, attempt: u32, done: bool) {
        self.logger.debug(&format!("Poll #{} of {}: done={}", attempt, operation, done))
            .correlation_id(correlation_id)
            .field("operation", operation)
            .field("attempt", attempt)
            .field("done", done)
            .log()
            .await;
    }

    pub async fn log_rerun_finished(&self, correlation_id: &str, test: &ConnectivityTest, elapsed_ms: f64) {
        let level = if test.reachable() { LogLevel::Info } else { LogLevel::Warn };
        self.logger.log(level, &format!("Rerun of {} finished: {}", test.name, test.result()))
            .correlation_id(correlation_id)
            .test_result(test)
            .field("elapsed_ms", elapsed_ms)
            .log()
            .await;
    }

    /// Log an application error with context
    pub async fn log_error(&self, error: &AppError, context: &str, correlation_id: Option<&str>) {
        let mut builder = self.logger.error(&format!("{}: {}", context, error))
            .error_info(error);

        if let Some(id) = correlation_id {
            builder = builder.correlation_id(id);
        }

        builder.log().await;
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}
