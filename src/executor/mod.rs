//! Rerun execution engine
//!
//! Every selected connectivity test is rerun in its own task. Each task
//! triggers the rerun, polls the returned operation to completion and
//! reports the outcome as soon as it is known. The first API or timeout
//! error aborts the whole run.

pub mod poller;

pub use poller::OperationPoller;

use crate::{
    client::ReachabilityApi,
    error::{AppError, Result},
    logging::ApiLogger,
    models::{Config, ConnectivityTest, ReachabilityResult},
    types::TestStatus,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Polling configuration for the executor
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionConfig {
    /// Delay between two polls of the same operation
    pub poll_interval: Duration,
    /// Upper bound for waiting on one operation, `None` waits forever
    pub poll_timeout: Option<Duration>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_interval: crate::defaults::DEFAULT_POLL_INTERVAL,
            poll_timeout: Some(crate::defaults::DEFAULT_POLL_TIMEOUT),
        }
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            poll_timeout: config.poll_timeout(),
        }
    }
}

/// Result of rerunning a single connectivity test
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub name: String,
    pub result: ReachabilityResult,
    pub status: TestStatus,
    pub verify_time: Option<DateTime<Utc>>,
    pub elapsed: Duration,
}

impl TestOutcome {
    pub fn from_test(test: ConnectivityTest, elapsed: Duration) -> Self {
        let status = if test.reachable() { TestStatus::Pass } else { TestStatus::Fail };
        Self {
            result: test.result().clone(),
            status,
            verify_time: test.reachability_details.verify_time,
            name: test.name,
            elapsed,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

/// Summary of a complete run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Outcomes in the order they completed
    pub outcomes: Vec<TestOutcome>,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Process exit code for the run: 1 when any test is not reachable
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() { 1 } else { 0 }
    }
}

/// Callback invoked once per finished test, in completion order
pub type OutcomeSink = Arc<dyn Fn(&TestOutcome) + Send + Sync>;

/// Reruns connectivity tests concurrently and collects their outcomes
#[derive(Clone)]
pub struct RerunExecutor {
    api: Arc<dyn ReachabilityApi>,
    poller: OperationPoller,
    logger: ApiLogger,
    failures: Arc<AtomicU32>,
}

impl RerunExecutor {
    pub fn new(api: Arc<dyn ReachabilityApi>, config: ExecutionConfig, logger: ApiLogger) -> Self {
        let poller = OperationPoller::new(api.clone(), config.poll_interval, config.poll_timeout, logger.clone());
        Self {
            api,
            poller,
            logger,
            failures: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Executor wired from the application configuration
    pub fn from_config(api: Arc<dyn ReachabilityApi>, config: &Config) -> Self {
        Self::new(api, ExecutionConfig::from(config), ApiLogger::new(config))
    }

    /// Tests to rerun: the explicit selection, or every test in the location
    pub async fn select_tests(&self, config: &Config) -> Result<Vec<String>> {
        if !config.tests.is_empty() {
            return Ok(config.test_names());
        }
        self.api.list_tests(&config.project, &config.location).await
    }

    /// Rerun one test and wait for its verification to finish
    pub async fn rerun_and_wait(&self, test_name: &str) -> Result<ConnectivityTest> {
        let correlation_id = ApiLogger::new_correlation_id();
        let started = Instant::now();

        let operation = match self.api.rerun(test_name).await {
            Ok(operation) => operation,
            Err(e) => {
                self.logger.log_error(&e, &format!("Rerun of {} failed", test_name), Some(correlation_id.as_str())).await;
                return Err(e);
            }
        };
        self.logger.log_rerun_started(&correlation_id, test_name, &operation.name).await;

        let test = match self.poller.wait(operation, &correlation_id).await {
            Ok(test) => test,
            Err(e) => {
                self.logger.log_error(&e, &format!("Waiting for {} failed", test_name), Some(correlation_id.as_str())).await;
                return Err(e);
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.logger.log_rerun_finished(&correlation_id, &test, elapsed_ms).await;
        Ok(test)
    }

    async fn run_one(&self, test_name: String) -> Result<TestOutcome> {
        let started = Instant::now();
        let mut test = self.rerun_and_wait(&test_name).await?;
        if test.name.is_empty() {
            test.name = test_name;
        }

        let outcome = TestOutcome::from_test(test, started.elapsed());
        if !outcome.passed() {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
        Ok(outcome)
    }

    /// Rerun every test concurrently, reporting each outcome to `sink`
    pub async fn execute(&self, test_names: Vec<String>, sink: OutcomeSink) -> Result<RunSummary> {
        let started = Instant::now();
        self.failures.store(0, Ordering::SeqCst);

        let mut tasks = JoinSet::new();
        for name in test_names {
            let executor = self.clone();
            tasks.spawn(async move { executor.run_one(name).await });
        }

        let mut summary = RunSummary::default();

        // Dropping the set on an early return aborts the remaining reruns
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(AppError::from)??;
            sink(&outcome);

            summary.total += 1;
            if outcome.passed() {
                summary.passed += 1;
            }
            summary.outcomes.push(outcome);
        }

        summary.failed = self.failures.load(Ordering::SeqCst);
        summary.elapsed = started.elapsed();
        Ok(summary)
    }
}
