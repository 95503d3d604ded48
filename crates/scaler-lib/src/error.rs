//! Error types for the scaling engine
//!
//! Only `ConfigError` aborts an operation. Backend failures are
//! recovered by falling back to rule-based decisions, and apply
//! failures are reported inside the reconcile result.

use thiserror::Error;

/// Invalid horizontal autoscaler parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("min_replicas must be at least 1 (got {0})")]
    MinReplicas(u32),

    #[error("max_replicas ({max}) must be >= min_replicas ({min})")]
    ReplicaBounds { min: u32, max: u32 },

    #[error("{field} must be between 1 and 100 (got {value})")]
    TargetUtilization { field: &'static str, value: u32 },
}

/// Failure of the reasoning backend, always recovered via fallback
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("no reasoning backend configured")]
    NotConfigured,

    #[error("backend request timed out after {0}s")]
    Timeout(u64),

    #[error("backend transport failure: {0}")]
    Transport(String),

    #[error("backend returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Cluster apply failure, reported in reconcile notes rather than raised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cluster apply failed: {0}")]
pub struct ApplyError(pub String);
