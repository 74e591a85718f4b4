//! Type definitions and aliases

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// CI providers a pipeline configuration can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenTarget {
    /// Travis CI, with the service-account key encrypted into the repository
    Travis,
    /// CircleCI, with the key provided through a project environment variable
    CircleCi,
}

impl GenTarget {
    /// Name accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            GenTarget::Travis => "travis",
            GenTarget::CircleCi => "circleci",
        }
    }

    /// Conventional location of the generated file inside a repository
    pub fn config_path(&self) -> &'static str {
        match self {
            GenTarget::Travis => ".travis.yml",
            GenTarget::CircleCi => ".circleci/config.yml",
        }
    }
}

impl FromStr for GenTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "travis" => Ok(GenTarget::Travis),
            "circleci" => Ok(GenTarget::CircleCi),
            other => Err(AppError::config(format!("unsupported gen target {:?}", other))),
        }
    }
}

impl fmt::Display for GenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict for one rerun connectivity test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    /// The test reported REACHABLE
    Pass,
    /// The test reported anything other than REACHABLE
    Fail,
}

impl TestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
        }
    }
}
