//! Autoscaling decision and schedule engine
//!
//! This crate provides the core functionality for:
//! - Scaling decisions from utilization snapshots (rule-based, with an
//!   optional reasoning backend and mandatory fallback)
//! - Pattern extraction from historical metrics
//! - Recurring scaling schedule synthesis
//! - Horizontal autoscaler configuration reconciliation

pub mod engine;
pub mod error;
pub mod hpa;
pub mod models;
pub mod observability;
pub mod patterns;
pub mod reconciler;
pub mod schedule;

pub use engine::{DecisionEngine, ReasoningBackend};
pub use error::{ApplyError, BackendError, ConfigError};
pub use hpa::{HpaConfig, HpaManifest};
pub use models::*;
pub use observability::{ConfidenceBucket, MetricsSink, NoopSink, PrometheusSink};
pub use patterns::{analyze_patterns, PatternSummary};
pub use reconciler::{ClusterApplier, HpaReconciler, ReconcileResult};
pub use schedule::{ScalingSchedule, ScheduleEntry, ScheduleSynthesizer};
