//! OAuth2 access tokens for the reachability API
//!
//! Credentials are discovered the way Google's application default
//! credentials work: an explicit token, then the credentials file named by
//! `GOOGLE_APPLICATION_CREDENTIALS` or written by gcloud. Service-account
//! keys are exchanged for a token with a signed JWT assertion and
//! `authorized_user` files with their refresh token. Anything else is left
//! to the `gcloud` CLI.

use crate::{
    error::{AppError, Result},
    models::Config,
};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lifetime requested for service-account assertions, the maximum Google accepts
const ASSERTION_LIFETIME_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Source of bearer tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch a currently valid access token
    async fn access_token(&self) -> Result<String>;

    /// Short description used in debug output
    fn describe(&self) -> String;
}

/// A token handed in on the command line or through the environment
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    fn describe(&self) -> String {
        "explicit token".to_string()
    }
}

/// `authorized_user` credentials as written by `gcloud auth application-default login`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// A `service_account` key file as downloaded from the cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// The subset of credential file types this tool distinguishes
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    AuthorizedUser(AuthorizedUser),
    ServiceAccount(ServiceAccountKey),
    #[serde(other)]
    Other,
}

impl CredentialsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::auth(format!("Cannot read credentials file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            AppError::auth(format!("Invalid credentials file {}: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// POST a token request to `token_url` and extract the access token
async fn exchange_token(http: &Client, token_url: &str, params: &[(&str, &str)]) -> Result<String> {
    let response = http.post(token_url).form(params).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let detail = serde_json::from_str::<TokenErrorResponse>(&body)
            .map(|e| match e.error_description {
                Some(description) => format!("{}: {}", e.error, description),
                None => e.error,
            })
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(AppError::auth(format!(
            "token exchange failed with status {}: {}",
            status.as_u16(),
            detail
        )));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| AppError::auth(format!("Unexpected token response: {}", e)))?;
    Ok(token.access_token)
}

/// Exchanges an `authorized_user` refresh token for an access token
pub struct RefreshTokenProvider {
    credentials: AuthorizedUser,
    http: Client,
    token_url: String,
}

impl RefreshTokenProvider {
    pub fn new(credentials: AuthorizedUser, http: Client) -> Self {
        Self::with_token_url(credentials, http, crate::defaults::OAUTH_TOKEN_URL)
    }

    pub fn with_token_url<S: Into<String>>(credentials: AuthorizedUser, http: Client, token_url: S) -> Self {
        Self {
            credentials,
            http,
            token_url: token_url.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("scope", crate::defaults::OAUTH_SCOPE),
        ];

        exchange_token(&self.http, &self.token_url, &params).await
    }

    fn describe(&self) -> String {
        format!("refresh token for client {}", self.credentials.client_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Signs a JWT with a service-account key and trades it for an access token
pub struct ServiceAccountProvider {
    client_email: String,
    key_id: Option<String>,
    signing_key: EncodingKey,
    http: Client,
    token_url: String,
}

impl ServiceAccountProvider {
    pub fn new(key: ServiceAccountKey, http: Client) -> Result<Self> {
        let token_url = key
            .token_uri
            .clone()
            .unwrap_or_else(|| crate::defaults::OAUTH_TOKEN_URL.to_string());
        Self::with_token_url(key, http, token_url)
    }

    pub fn with_token_url<S: Into<String>>(key: ServiceAccountKey, http: Client, token_url: S) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::auth(format!("Invalid private key for {}: {}", key.client_email, e))
        })?;

        Ok(Self {
            client_email: key.client_email,
            key_id: key.private_key_id,
            signing_key,
            http,
            token_url: token_url.into(),
        })
    }

    fn assertion(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: crate::defaults::OAUTH_SCOPE.to_string(),
            aud: self.token_url.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| AppError::auth(format!("Cannot sign assertion for {}: {}", self.client_email, e)))
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountProvider {
    async fn access_token(&self) -> Result<String> {
        let assertion = self.assertion()?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        exchange_token(&self.http, &self.token_url, &params).await
    }

    fn describe(&self) -> String {
        format!("service account {}", self.client_email)
    }
}

/// Asks the gcloud CLI for an application-default access token
pub struct GcloudProvider {
    program: String,
}

impl GcloudProvider {
    pub fn new() -> Self {
        Self::with_program("gcloud")
    }

    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self { program: program.into() }
    }
}

impl Default for GcloudProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for GcloudProvider {
    async fn access_token(&self) -> Result<String> {
        let output = tokio::process::Command::new(&self.program)
            .args(["auth", "application-default", "print-access-token"])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::auth(format!(
                        "no credentials found and the {} command is not installed",
                        self.program
                    ))
                } else {
                    AppError::auth(format!("cannot run {}: {}", self.program, e))
                }
            })?;

        if !output.status.success() {
            return Err(AppError::auth(format!(
                "{} failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(AppError::auth(format!("{} printed an empty token", self.program)));
        }
        Ok(token)
    }

    fn describe(&self) -> String {
        format!("{} application-default credentials", self.program)
    }
}

/// Credential file to consult, if any
pub fn credentials_path() -> Result<Option<PathBuf>> {
    if let Ok(path) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
        if !path.trim().is_empty() {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(AppError::auth(format!(
                    "GOOGLE_APPLICATION_CREDENTIALS points to {}, which does not exist",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }
    }

    let config_dir = match std::env::var("CLOUDSDK_CONFIG") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => match std::env::var("HOME") {
            Ok(home) => Path::new(&home).join(".config").join("gcloud"),
            Err(_) => return Ok(None),
        },
    };

    let well_known = config_dir.join("application_default_credentials.json");
    Ok(well_known.exists().then_some(well_known))
}

/// Choose a token provider for the configuration
pub fn resolve_provider(config: &Config, http: Client) -> Result<Arc<dyn TokenProvider>> {
    if let Some(token) = &config.token {
        return Ok(Arc::new(StaticToken::new(token.clone())));
    }

    match credentials_path()? {
        Some(path) => provider_for(CredentialsFile::load(&path)?, http),
        None => Ok(Arc::new(GcloudProvider::new())),
    }
}

/// Token provider for a parsed credentials file
pub fn provider_for(credentials: CredentialsFile, http: Client) -> Result<Arc<dyn TokenProvider>> {
    Ok(match credentials {
        CredentialsFile::AuthorizedUser(user) => Arc::new(RefreshTokenProvider::new(user, http)),
        CredentialsFile::ServiceAccount(key) => Arc::new(ServiceAccountProvider::new(key, http)?),
        CredentialsFile::Other => Arc::new(GcloudProvider::new()),
    })
}
