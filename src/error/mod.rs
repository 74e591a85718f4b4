//! Error handling for reachability-rerun
//!
//! Every failure is an [`AppError`]. The variant decides the process exit
//! code, so a CI job can tell a misconfigured pipeline (1) from an API
//! outage (2), a stuck rerun (3) or missing credentials (4). Unreachable
//! tests are not errors: they surface through the run summary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Flags, environment or `.env` values are missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The API could not be reached at all
    #[error("Network error: {0}")]
    Network(String),

    /// The HTTP exchange failed after a connection was made
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// The reachability API answered with an error status or error payload
    #[error("API error: {0}")]
    Api(String),

    /// A rerun did not finish within the poll timeout
    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// A response or value could not be decoded
    #[error("Parsing error: {0}")]
    Parse(String),

    /// No access token could be obtained
    #[error("Authentication error: {0}")]
    Auth(String),

    /// CI configuration could not be generated
    #[error("Generation error: {0}")]
    Generate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Constructors, one per variant
impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn generate<S: Into<String>>(message: S) -> Self {
        Self::Generate(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl AppError {
    /// Error for a non-200 answer from the API
    pub fn from_status(status: u16, detail: Option<&str>) -> Self {
        match detail {
            Some(detail) if !detail.is_empty() => {
                Self::api(format!("error handling response, status code = {}: {}", status, detail))
            }
            _ => Self::api(format!("error handling response, status code = {}", status)),
        }
    }

    /// Short tag used in logs and console output
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::Api(_) => "API",
            Self::Timeout(_) => "TIMEOUT",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Auth(_) => "AUTH",
            Self::Generate(_) => "GENERATE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether running the same command again may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::HttpRequest(_) | Self::Timeout(_))
    }

    /// Message with a suggestion for what to do next
    pub fn user_friendly_message(&self) -> String {
        let (what, hint) = match self {
            Self::Config(msg) => (
                format!("Configuration problem: {}", msg),
                "Check the command line arguments, REACHABILITY_* variables and your .env file.",
            ),
            Self::Network(msg) => (
                format!("Could not reach the reachability API: {}", msg),
                "Check your connection, proxy settings and --endpoint.",
            ),
            Self::HttpRequest(msg) => (
                format!("HTTP request failed: {}", msg),
                "The API endpoint may be unavailable. Check --endpoint and try again.",
            ),
            Self::Api(msg) => (
                format!("The reachability API rejected the request: {}", msg),
                "Verify the project, location and test names, and that the API is enabled for the project.",
            ),
            Self::Timeout(msg) => (
                format!("Operation timed out: {}", msg),
                "Increase the poll timeout using --poll-timeout.",
            ),
            Self::Io(msg) => (
                format!("File operation failed: {}", msg),
                "Check file permissions and paths.",
            ),
            Self::Parse(msg) => (
                format!("Failed to parse data: {}", msg),
                "Run with --verbose to inspect the raw API responses.",
            ),
            Self::Auth(msg) => (
                format!("Authentication failed: {}", msg),
                "Pass --token, set GOOGLE_APPLICATION_CREDENTIALS, or run 'gcloud auth application-default login'.",
            ),
            Self::Generate(msg) => (
                format!("Could not generate CI configuration: {}", msg),
                "Check --gen, --secretkey and that the provider CLI is installed.",
            ),
            Self::Internal(msg) => (
                format!("Internal error: {}", msg),
                "This is likely a bug. Please report it with the error details.",
            ),
        };
        format!("{}\n\nSuggestion: {}", what, hint)
    }

    /// Process exit code; 1 is shared with "some test is not reachable"
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,
            Self::Network(_) | Self::HttpRequest(_) | Self::Api(_) => 2,
            Self::Timeout(_) => 3,
            Self::Auth(_) => 4,
            Self::Io(_) | Self::Generate(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// `[CATEGORY] message`, colored by severity when enabled
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if !use_color {
            return format!("[{}] {}", category, message);
        }

        use colored::{Color, Colorize};
        let color = match self {
            Self::Config(_) | Self::Parse(_) => Color::Red,
            Self::Network(_) | Self::HttpRequest(_) | Self::Api(_) => Color::Yellow,
            Self::Timeout(_) => Color::Blue,
            Self::Auth(_) => Color::Magenta,
            Self::Io(_) | Self::Generate(_) => Color::Cyan,
            Self::Internal(_) => Color::BrightRed,
        };
        format!("[{}] {}", category.color(color).bold(), message.color(color))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::config(format!("invalid URL: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else if error.is_decode() {
            Self::parse(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("cannot load .env file: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::config(format!("expected a whole number: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::config(format!("expected true or false: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::internal(format!("rerun task failed: {}", error))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", error))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Prints errors for the user on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error; verbose runs add the suggestion
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if !self.verbose {
            return;
        }

        eprintln!();
        eprintln!("{}", error.user_friendly_message());

        if error.is_recoverable() {
            let hint = "This error might be temporary. You can try running the command again.";
            eprintln!();
            if self.use_color {
                use colored::Colorize;
                eprintln!("{}", hint.green());
            } else {
                eprintln!("{}", hint);
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
