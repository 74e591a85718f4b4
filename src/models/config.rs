//! Configuration data model and validation

use crate::types::{AppError, GenTarget, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cloud project owning the connectivity tests
    #[serde(default)]
    pub project: String,

    /// Location of the tests
    #[serde(default = "default_location")]
    pub location: String,

    /// Explicit test IDs or resource names; empty means every test in the location
    #[serde(default)]
    pub tests: Vec<String>,

    /// Bearer token that bypasses credential discovery
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Base URL of the reachability API
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Delay between two polls of a pending operation
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Poll budget per operation, 0 polls until the operation is done
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_seconds: u64,

    /// CI provider to generate configuration for instead of running tests
    #[serde(default)]
    pub gen: Option<GenTarget>,

    /// Service-account key encrypted into the Travis configuration
    #[serde(default)]
    pub secret_key: Option<PathBuf>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Echo raw API responses and progress
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: String::new(),
            location: default_location(),
            tests: Vec::new(),
            token: None,
            api_endpoint: default_api_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_seconds: default_poll_timeout_secs(),
            gen: None,
            secret_key: None,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// `None` when polling is unbounded
    pub fn poll_timeout(&self) -> Option<Duration> {
        match self.poll_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Parent resource of every connectivity test in the configured location
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}/connectivityTests", self.project, self.location)
    }

    /// Full resource names for the explicitly requested tests
    pub fn test_names(&self) -> Vec<String> {
        self.tests
            .iter()
            .map(|id| {
                if id.contains('/') {
                    id.clone()
                } else {
                    format!("{}/{}", self.parent(), id)
                }
            })
            .collect()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(AppError::config("Please provide a project name"));
        }

        if self.project.contains('/') {
            return Err(AppError::config(format!("Invalid project id: {}", self.project)));
        }

        if self.location.trim().is_empty() || self.location.contains('/') {
            return Err(AppError::config(format!("Invalid location: {:?}", self.location)));
        }

        match url::Url::parse(&self.api_endpoint) {
            Ok(parsed) => {
                if parsed.scheme() != "https" && parsed.scheme() != "http" {
                    return Err(AppError::config(format!(
                        "API endpoint must use http or https: {}",
                        self.api_endpoint
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!("Invalid API endpoint '{}': {}", self.api_endpoint, e)));
            }
        }

        if self.poll_interval_ms == 0 {
            return Err(AppError::config("Poll interval must be greater than 0"));
        }

        if self.poll_interval_ms > 60_000 {
            return Err(AppError::config("Poll interval cannot exceed 60000 milliseconds"));
        }

        if self.poll_timeout_seconds > 86_400 {
            return Err(AppError::config("Poll timeout cannot exceed 86400 seconds"));
        }

        if let Some(token) = &self.token {
            if token.trim().is_empty() {
                return Err(AppError::config("Token cannot be empty"));
            }
        }

        if self.gen == Some(GenTarget::Travis) && self.secret_key.is_none() {
            return Err(AppError::config(
                "--secretkey cannot be empty; provide a Google Cloud secret key",
            ));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(project) = std::env::var("REACHABILITY_PROJECT") {
            self.project = project.trim().to_string();
        }

        if let Ok(location) = std::env::var("REACHABILITY_LOCATION") {
            self.location = location.trim().to_string();
        }

        if let Ok(tests) = std::env::var("REACHABILITY_TESTS") {
            self.tests = split_test_ids(&tests);
        }

        if let Ok(token) = std::env::var("REACHABILITY_TOKEN") {
            if !token.trim().is_empty() {
                self.token = Some(token.trim().to_string());
            }
        }

        if let Ok(endpoint) = std::env::var("REACHABILITY_ENDPOINT") {
            self.api_endpoint = endpoint.trim().to_string();
        }

        if let Ok(interval) = std::env::var("POLL_INTERVAL_MS") {
            self.poll_interval_ms = interval.parse()
                .map_err(|e| AppError::config(format!("Invalid POLL_INTERVAL_MS value '{}': {}", interval, e)))?;
        }

        if let Ok(timeout) = std::env::var("POLL_TIMEOUT_SECONDS") {
            self.poll_timeout_seconds = timeout.parse()
                .map_err(|e| AppError::config(format!("Invalid POLL_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Split a comma-separated test list, dropping blanks and repeated entries
pub fn split_test_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn default_location() -> String {
    crate::defaults::DEFAULT_LOCATION.to_string()
}

fn default_api_endpoint() -> String {
    crate::defaults::DEFAULT_API_ENDPOINT.to_string()
}

fn default_poll_interval_ms() -> u64 {
    crate::defaults::DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_poll_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_POLL_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
