//! Wire records of the reachability API
//!
//! Only the fields the rerun workflow reads are modelled; everything else in
//! the server's payloads is ignored during decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the most recent reachability analysis of a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ReachabilityResult {
    #[default]
    ResultUnspecified,
    Reachable,
    Unreachable,
    Ambiguous,
    Undetermined,
    /// A value this client does not know yet, kept verbatim
    Unknown(String),
}

impl ReachabilityResult {
    pub fn as_str(&self) -> &str {
        match self {
            ReachabilityResult::ResultUnspecified => "RESULT_UNSPECIFIED",
            ReachabilityResult::Reachable => "REACHABLE",
            ReachabilityResult::Unreachable => "UNREACHABLE",
            ReachabilityResult::Ambiguous => "AMBIGUOUS",
            ReachabilityResult::Undetermined => "UNDETERMINED",
            ReachabilityResult::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ReachabilityResult {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "RESULT_UNSPECIFIED" => ReachabilityResult::ResultUnspecified,
            "REACHABLE" => ReachabilityResult::Reachable,
            "UNREACHABLE" => ReachabilityResult::Unreachable,
            "AMBIGUOUS" => ReachabilityResult::Ambiguous,
            "UNDETERMINED" => ReachabilityResult::Undetermined,
            _ => ReachabilityResult::Unknown(raw),
        }
    }
}

impl From<ReachabilityResult> for String {
    fn from(result: ReachabilityResult) -> Self {
        match result {
            ReachabilityResult::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ReachabilityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `google.rpc.Status` as embedded in operations and reachability details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RpcStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReachabilityDetails {
    #[serde(default)]
    pub result: ReachabilityResult,
    #[serde(default)]
    pub verify_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<RpcStatus>,
}

/// A connectivity test resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityTest {
    pub name: String,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reachability_details: ReachabilityDetails,
}

impl ConnectivityTest {
    /// Only an exact REACHABLE verdict counts as a pass
    pub fn reachable(&self) -> bool {
        self.reachability_details.result == ReachabilityResult::Reachable
    }

    pub fn result(&self) -> &ReachabilityResult {
        &self.reachability_details.result
    }
}

/// Long-running operation returned by `:rerun`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<ConnectivityTest>,
    #[serde(default)]
    pub error: Option<RpcStatus>,
}

/// One page of `connectivityTests.list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub resources: Vec<ConnectivityTest>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error envelope, `{"error": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorEnvelope {
    /// Extract a readable message from an error body, if it is an envelope
    pub fn message_from(body: &str) -> Option<String> {
        let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
        match envelope.error.status {
            Some(status) => Some(format!("{} ({})", envelope.error.message, status)),
            None => Some(envelope.error.message),
        }
    }
}
