//! Polling of long-running rerun operations

use crate::{
    client::ReachabilityApi,
    error::{AppError, Result},
    logging::ApiLogger,
    models::{ConnectivityTest, Operation},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Polls an operation at a fixed interval until the server marks it done
#[derive(Clone)]
pub struct OperationPoller {
    api: Arc<dyn ReachabilityApi>,
    interval: Duration,
    timeout: Option<Duration>,
    logger: ApiLogger,
}

impl OperationPoller {
    pub fn new(api: Arc<dyn ReachabilityApi>, interval: Duration, timeout: Option<Duration>, logger: ApiLogger) -> Self {
        Self { api, interval, timeout, logger }
    }

    /// Wait for `operation` and return the connectivity test it carries
    pub async fn wait(&self, operation: Operation, correlation_id: &str) -> Result<ConnectivityTest> {
        if operation.done {
            return Self::finish(operation);
        }

        if operation.name.is_empty() {
            return Err(AppError::api("rerun returned a pending operation without a name"));
        }

        let name = operation.name;
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let current = self.api.get_operation(&name).await?;
            self.logger.log_poll(correlation_id, &name, attempt, current.done).await;

            if current.done {
                return Self::finish(current);
            }

            if let Some(limit) = self.timeout {
                if started.elapsed() + self.interval > limit {
                    return Err(AppError::timeout(format!(
                        "operation {} not done after {}s ({} polls)",
                        name,
                        limit.as_secs(),
                        attempt
                    )));
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    fn finish(operation: Operation) -> Result<ConnectivityTest> {
        if let Some(status) = operation.error {
            return Err(AppError::api(format!("operation {} failed: {}", operation.name, status)));
        }

        operation.response.ok_or_else(|| {
            AppError::api(format!("operation {} completed without a response", operation.name))
        })
    }
}
