//! Main application orchestration and execution

use crate::{
    auth::resolve_provider,
    cli::Cli,
    client::{build_http_client, ReachabilityClient},
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::Result,
    executor::{RerunExecutor, RunSummary},
    generate::generate,
    logging::Logger,
    log_debug, log_info, log_warn,
    models::Config,
    output::OutputCoordinator,
};
use std::io::Write;
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run the application; a generation run returns an empty summary
    pub async fn run(self) -> Result<RunSummary> {
        let mut config = load_config(self.cli.clone())?;
        config.enable_color = config.enable_color && self.cli.use_colors();

        let logger = Logger::with_config("APP".to_string(), &config);
        log_debug!(logger, "{} v{} ({})", crate::PKG_NAME, crate::VERSION, crate::GIT_COMMIT);

        if config.debug {
            log_debug!(logger, "Configuration:\n{}", display_config_summary(&config));
            for problem in EnvManager::validate_current_env() {
                log_warn!(logger, "{}", problem);
            }
        }

        for warning in validate_config(&config)? {
            eprintln!("{}", warning.format(config.enable_color));
        }

        if let Some(target) = config.gen {
            let yaml = generate(target, &config).await?;
            let mut out = std::io::stdout().lock();
            out.write_all(yaml.as_bytes())?;
            out.flush()?;
            log_info!(logger, "Generated {} configuration, commit it as {}", target, target.config_path());
            return Ok(RunSummary::default());
        }

        self.rerun_tests(&config, &logger).await
    }

    async fn rerun_tests(&self, config: &Config, logger: &Logger) -> Result<RunSummary> {
        let http = build_http_client()?;
        let provider = resolve_provider(config, http.clone())?;
        log_debug!(logger, "Using {}", provider.describe());
        let client = Arc::new(ReachabilityClient::from_config(config, http, provider));
        client.authenticate().await?;
        let executor = RerunExecutor::from_config(client, config);

        let names = executor.select_tests(config).await?;
        if names.is_empty() {
            log_warn!(logger, "No connectivity tests found in {}", config.parent());
            return Ok(RunSummary::default());
        }
        log_info!(logger, "Rerunning {} connectivity tests", names.len());

        let output = Arc::new(OutputCoordinator::from_config(config));
        let summary = executor.execute(names, output.clone().into_sink()).await?;
        output.display_summary(&summary)?;

        log_info!(
            logger,
            "{} of {} connectivity tests reachable",
            summary.passed,
            summary.total
        );
        Ok(summary)
    }
}
