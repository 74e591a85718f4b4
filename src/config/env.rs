//! Environment variables and the optional `.env` file

use crate::error::{AppError, Result};
use std::path::Path;

/// A recognised environment variable
#[derive(Debug, Clone, Copy)]
pub struct EnvVar {
    pub name: &'static str,
    pub description: &'static str,
    pub example: &'static str,
}

const fn var(name: &'static str, description: &'static str, example: &'static str) -> EnvVar {
    EnvVar { name, description, example }
}

/// Every variable read by the configuration layer
pub const SUPPORTED_VARS: &[EnvVar] = &[
    var("REACHABILITY_PROJECT", "Project owning the connectivity tests", "my-project"),
    var("REACHABILITY_LOCATION", "Location of the tests", "global"),
    var("REACHABILITY_TESTS", "Comma-separated test IDs or resource names", "web-to-db,vpn-to-onprem"),
    var("REACHABILITY_TOKEN", "OAuth2 access token, skips credential discovery", "ya29...."),
    var("REACHABILITY_ENDPOINT", "API base URL", crate::defaults::DEFAULT_API_ENDPOINT),
    var("POLL_INTERVAL_MS", "Delay between polls (1-60000)", "500"),
    var("POLL_TIMEOUT_SECONDS", "Seconds per rerun, 0 = forever (0-86400)", "600"),
    var("ENABLE_COLOR", "Colored output (true/false)", "true"),
];

pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory when present. Variables
    /// already set in the environment win over the file.
    pub fn load_env_file(debug: bool) -> Result<()> {
        let path = Path::new(".env");
        if !path.exists() {
            if debug {
                eprintln!("No .env file in the working directory");
            }
            return Ok(());
        }

        dotenv::from_path(path)?;
        if debug {
            eprintln!("Loaded settings from {}", path.display());
        }
        Ok(())
    }

    /// Check the format of a single variable without applying it
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let invalid = |reason: String| AppError::config(format!("{}={:?}: {}", key, value, reason));

        match key {
            "REACHABILITY_PROJECT" if value.trim().is_empty() || value.contains('/') => {
                Err(invalid("expected a bare project ID".to_string()))
            }
            "REACHABILITY_ENDPOINT" => url::Url::parse(value.trim())
                .map(|_| ())
                .map_err(|e| invalid(e.to_string())),
            "POLL_INTERVAL_MS" => match value.parse::<u64>() {
                Ok(1..=60_000) => Ok(()),
                Ok(n) => Err(invalid(format!("{} is outside 1..=60000", n))),
                Err(e) => Err(invalid(e.to_string())),
            },
            "POLL_TIMEOUT_SECONDS" => match value.parse::<u64>() {
                Ok(0..=86_400) => Ok(()),
                Ok(n) => Err(invalid(format!("{} is above 86400", n))),
                Err(e) => Err(invalid(e.to_string())),
            },
            "ENABLE_COLOR" => value
                .parse::<bool>()
                .map(|_| ())
                .map_err(|e| invalid(e.to_string())),
            _ => Ok(()),
        }
    }

    /// Help text listing every variable and the precedence order
    pub fn display_env_help() -> String {
        let mut help = String::from("Environment variables:\n\n");

        for var in SUPPORTED_VARS {
            help.push_str(&format!("  {:<22} {}\n", var.name, var.description));
            help.push_str(&format!("  {:<22} e.g. {}\n\n", "", var.example));
        }

        help.push_str("Precedence: command-line flags, then the environment,\n");
        help.push_str("then .env values, then built-in defaults.\n");
        help
    }

    /// Problems with variables currently set in the process environment
    pub fn validate_current_env() -> Vec<String> {
        SUPPORTED_VARS
            .iter()
            .filter_map(|var| {
                let value = std::env::var(var.name).ok()?;
                Self::validate_env_var(var.name, &value).err().map(|e| e.to_string())
            })
            .collect()
    }
}
