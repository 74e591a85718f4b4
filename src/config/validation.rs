//! Configuration validation rules that produce warnings rather than errors

use crate::{
    models::Config,
    error::Result,
    types::GenTarget,
};

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Info => "INFO",
            ValidationLevel::Warning => "WARN",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let tag = match self.level {
                ValidationLevel::Info => self.level.as_str().cyan(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
            };
            format!("[{}] {}", tag, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Configuration validator with advisory rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run the hard checks of `Config::validate`, then collect warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_endpoint(config));
        warnings.extend(Self::validate_polling(config));
        warnings.extend(Self::validate_generation(config));
        Ok(warnings)
    }

    fn validate_endpoint(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Ok(parsed) = url::Url::parse(&config.api_endpoint) {
            if parsed.scheme() == "http" {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("API endpoint '{}' is not HTTPS; the access token is sent in clear text", config.api_endpoint),
                ));
            }

            if config.api_endpoint != crate::defaults::DEFAULT_API_ENDPOINT {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Using non-default API endpoint {}", config.api_endpoint),
                ));
            }
        }

        warnings
    }

    fn validate_polling(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.poll_interval_ms < 100 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Poll interval of {}ms may exhaust the API read quota", config.poll_interval_ms),
            ));
        }

        if config.poll_timeout().is_none() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Poll timeout is disabled; a stuck rerun will block the run forever".to_string(),
            ));
        }

        warnings
    }

    fn validate_generation(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.gen.is_some() && !config.tests.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "--tests is ignored when generating CI configuration".to_string(),
            ));
        }

        if config.gen == Some(GenTarget::CircleCi) && config.secret_key.is_some() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "--secretkey is ignored for circleci; store the key in GCLOUD_SERVICE_KEY".to_string(),
            ));
        }

        if let Some(path) = &config.secret_key {
            if config.gen == Some(GenTarget::Travis) && !path.exists() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Secret key {} does not exist", path.display()),
                ));
            }
        }

        warnings
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
