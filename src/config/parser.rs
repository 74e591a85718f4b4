//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::{Config, split_test_ids},
    error::Result,
    config::env::EnvManager,
    types::GenTarget,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        self.load_env_file()?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config)?;

        if config.location.trim().is_empty() {
            config.location = crate::defaults::DEFAULT_LOCATION.to_string();
        }

        config.validate()?;

        Ok(config)
    }

    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(project) = &self.cli.project {
            config.project = project.trim().to_string();
        }

        if let Some(location) = &self.cli.location {
            config.location = location.trim().to_string();
        }

        if let Some(tests) = &self.cli.tests {
            config.tests = split_test_ids(tests);
        }

        if let Some(token) = &self.cli.token {
            config.token = Some(token.trim().to_string());
        }

        if let Some(endpoint) = &self.cli.endpoint {
            config.api_endpoint = endpoint.trim().to_string();
        }

        if let Some(interval) = self.cli.poll_interval_ms {
            config.poll_interval_ms = interval;
        }

        if let Some(timeout) = self.cli.poll_timeout {
            config.poll_timeout_seconds = timeout;
        }

        if let Some(secret_key) = &self.cli.secret_key {
            config.secret_key = Some(secret_key.clone());
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        // The project check comes first so a bare `--gen` run asks for it
        if let Some(gen) = &self.cli.gen {
            if config.project.trim().is_empty() {
                return Ok(());
            }
            config.gen = Some(gen.parse::<GenTarget>()?);
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Project: {}", config.project));
    summary.push(format!("Location: {}", config.location));
    if config.tests.is_empty() {
        summary.push("Tests: all".to_string());
    } else {
        summary.push(format!("Tests: {}", config.tests.join(", ")));
    }
    summary.push(format!("API endpoint: {}", config.api_endpoint));
    summary.push(format!("Token: {}", if config.token.is_some() { "provided" } else { "discover" }));
    summary.push(format!("Poll interval: {}ms", config.poll_interval_ms));
    match config.poll_timeout() {
        Some(timeout) => summary.push(format!("Poll timeout: {}s", timeout.as_secs())),
        None => summary.push("Poll timeout: none".to_string()),
    }
    if let Some(gen) = config.gen {
        summary.push(format!("Generate: {}", gen));
    }
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
