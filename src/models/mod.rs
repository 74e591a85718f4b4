//! Data models for reachability-rerun

pub mod config;
pub mod resource;

// Re-export main model types
pub use config::{Config, split_test_ids};
pub use resource::{
    ConnectivityTest, ErrorEnvelope, ListResponse, Operation, ReachabilityDetails,
    ReachabilityResult, RpcStatus,
};
