//! HTTP client for the reachability API
//!
//! Every call carries a bearer token from the configured [`TokenProvider`].
//! A 401 answer fetches a fresh token and retries the call once, so runs
//! that outlive a token keep working. Any other transport failure or non-200
//! status becomes an error. Raw bodies are echoed through the API logger
//! when running verbose.

use crate::{
    auth::TokenProvider,
    error::{AppError, Result},
    logging::ApiLogger,
    models::{Config, ErrorEnvelope, ListResponse, Operation},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Timeout for a single HTTP exchange; polling has its own budget
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the rerun workflow needs from the API
#[async_trait]
pub trait ReachabilityApi: Send + Sync {
    /// Resource names of every connectivity test in a location
    async fn list_tests(&self, project: &str, location: &str) -> Result<Vec<String>>;

    /// Trigger re-verification of a test
    async fn rerun(&self, test_name: &str) -> Result<Operation>;

    /// Fetch the current state of a long-running operation
    async fn get_operation(&self, operation_name: &str) -> Result<Operation>;
}

/// Build the shared reqwest client
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
        .build()
        .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))
}

/// reqwest-backed implementation of [`ReachabilityApi`]
#[derive(Clone)]
pub struct ReachabilityClient {
    http: Client,
    endpoint: String,
    credentials: Arc<dyn TokenProvider>,
    token: Arc<RwLock<Option<String>>>,
    logger: ApiLogger,
}

impl ReachabilityClient {
    pub fn new(http: Client, endpoint: &str, credentials: Arc<dyn TokenProvider>, logger: ApiLogger) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
            token: Arc::new(RwLock::new(None)),
            logger,
        }
    }

    /// Client for the configured endpoint
    pub fn from_config(config: &Config, http: Client, credentials: Arc<dyn TokenProvider>) -> Self {
        Self::new(http, &config.api_endpoint, credentials, ApiLogger::new(config))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch a token up front so credential problems surface before any rerun
    pub async fn authenticate(&self) -> Result<()> {
        self.refresh_token().await.map(|_| ())
    }

    async fn refresh_token(&self) -> Result<String> {
        let token = self.credentials.access_token().await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn current_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.refresh_token().await
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.endpoint, resource.trim_start_matches('/'))
    }

    /// One HTTP exchange, returning the status and raw body
    async fn exchange(&self, method: &str, url: &str, request: RequestBuilder, token: &str) -> Result<(u16, String)> {
        let started = Instant::now();
        let response = match request.bearer_auth(token).send().await {
            Ok(response) => response,
            Err(e) => {
                let elapsed = started.elapsed().as_secs_f64() * 1000.0;
                self.logger.log_http_request(method, url, None, elapsed).await;
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await?;
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;
        self.logger.log_http_request(method, url, Some(status), elapsed).await;
        self.logger.log_body(url, &body).await;
        Ok((status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, method: &str, url: &str, request: RequestBuilder) -> Result<T> {
        let retry = request.try_clone();
        let token = self.current_token().await?;
        let (mut status, mut body) = self.exchange(method, url, request, &token).await?;

        if status == 401 {
            if let Some(retry) = retry {
                let fresh = self.refresh_token().await?;
                // A provider that hands out the same token cannot fix a 401
                if fresh != token {
                    self.logger.log_token_refreshed(url).await;
                    (status, body) = self.exchange(method, url, retry, &fresh).await?;
                }
            }
        }

        if status != 200 {
            return Err(AppError::from_status(status, ErrorEnvelope::message_from(&body).as_deref()));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::parse(format!("Unexpected response from {}: {}", url, e)))
    }
}

#[async_trait]
impl ReachabilityApi for ReachabilityClient {
    async fn list_tests(&self, project: &str, location: &str) -> Result<Vec<String>> {
        let url = self.url(&format!("projects/{}/locations/{}/connectivityTests", project, location));
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(&url);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListResponse = self.send_json("GET", &url, request).await?;
            names.extend(page.resources.into_iter().map(|test| test.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(names)
    }

    async fn rerun(&self, test_name: &str) -> Result<Operation> {
        let url = format!("{}:rerun", self.url(test_name));
        let request = self.http.post(&url).json(&serde_json::json!({}));
        self.send_json("POST", &url, request).await
    }

    async fn get_operation(&self, operation_name: &str) -> Result<Operation> {
        let url = self.url(operation_name);
        let request = self.http.get(&url);
        self.send_json("GET", &url, request).await
    }
}
