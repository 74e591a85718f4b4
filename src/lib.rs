//! Reachability Rerun
//!
//! Re-runs previously defined connectivity tests against the cloud
//! reachability-analysis API, polls the resulting long-running operations to
//! completion and reports whether every tested path is still reachable.
//! It can also emit CI pipeline configuration that runs the tool on every push.

pub mod app;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod generate;
pub mod logging;
pub mod models;
pub mod output;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, ConnectivityTest, Operation, ReachabilityResult};
pub use client::{ReachabilityApi, ReachabilityClient};
pub use executor::{RerunExecutor, RunSummary};
pub use types::GenTarget;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const BUILD_TIME: &str = env!("BUILD_TIME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_API_ENDPOINT: &str = "https://reachability.googleapis.com/v1beta1";
    pub const DEFAULT_LOCATION: &str = "global";
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
    pub const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
    pub const RELEASE_BUCKET_URL: &str = "https://storage.googleapis.com/jbd-releases";
}
