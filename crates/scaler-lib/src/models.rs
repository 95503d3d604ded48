//! Core data models for the scaling engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of system load, supplied by an external collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    pub request_rate: f64,
    pub response_time_ms: f64,
    pub error_rate: f64,
    pub active_connections: u64,
    pub queue_depth: u64,
    pub pod_count: u32,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// Create a snapshot timestamped now; remaining fields default to zero
    pub fn new(cpu_utilization: f64, memory_utilization: f64, pod_count: u32) -> Self {
        Self {
            cpu_utilization,
            memory_utilization,
            request_rate: 0.0,
            response_time_ms: 0.0,
            error_rate: 0.0,
            active_connections: 0,
            queue_depth: 0,
            pod_count,
            timestamp: Utc::now(),
        }
    }

    pub fn with_request_rate(mut self, request_rate: f64) -> Self {
        self.request_rate = request_rate;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Scaling action recommended by the decision engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingAction {
    Maintain,
    ScaleUpHorizontal,
    ScaleDownHorizontal,
    ScaleUpVertical,
    ScaleDownVertical,
}

impl ScalingAction {
    /// Wire name, also used as a metrics label value
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalingAction::Maintain => "maintain",
            ScalingAction::ScaleUpHorizontal => "scale_up_horizontal",
            ScalingAction::ScaleDownHorizontal => "scale_down_horizontal",
            ScalingAction::ScaleUpVertical => "scale_up_vertical",
            ScalingAction::ScaleDownVertical => "scale_down_vertical",
        }
    }
}

impl std::fmt::Display for ScalingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly a decision should be acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    High,
    Critical,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A scaling decision, produced once per analysis and then immutable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingDecision {
    pub action: ScalingAction,
    pub recommended_pod_count: Option<u32>,
    pub recommended_memory_increase: Option<String>,
    pub recommended_cpu_increase: Option<String>,
    pub confidence: f64,
    pub reasoning: String,
    pub urgency: Urgency,
    pub estimated_cost_impact: Option<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ScalingDecision {
    /// Decision with no optional recommendations attached
    pub fn new(action: ScalingAction, confidence: f64, reasoning: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            action,
            recommended_pod_count: None,
            recommended_memory_increase: None,
            recommended_cpu_increase: None,
            confidence,
            reasoning: reasoning.into(),
            urgency,
            estimated_cost_impact: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_pod_count(mut self, pods: u32) -> Self {
        self.recommended_pod_count = Some(pods);
        self
    }

    pub fn with_memory_increase(mut self, increase: impl Into<String>) -> Self {
        self.recommended_memory_increase = Some(increase.into());
        self
    }

    pub fn with_cpu_increase(mut self, increase: impl Into<String>) -> Self {
        self.recommended_cpu_increase = Some(increase.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        let json = serde_json::to_string(&ScalingAction::ScaleUpHorizontal).unwrap();
        assert_eq!(json, "\"scale_up_horizontal\"");

        let parsed: ScalingAction = serde_json::from_str("\"scale_down_vertical\"").unwrap();
        assert_eq!(parsed, ScalingAction::ScaleDownVertical);
    }

    #[test]
    fn test_snapshot_defaults_timestamp() {
        let json = r#"{
            "cpu_utilization": 45.0,
            "memory_utilization": 55.0,
            "request_rate": 120.0,
            "response_time_ms": 85.0,
            "error_rate": 0.5,
            "active_connections": 450,
            "queue_depth": 5,
            "pod_count": 3
        }"#;
        let snapshot: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.pod_count, 3);
    }

    #[test]
    fn test_decision_builder() {
        let decision = ScalingDecision::new(ScalingAction::ScaleUpVertical, 0.85, "memory pressure", Urgency::High)
            .with_memory_increase("50%");
        assert_eq!(decision.recommended_memory_increase.as_deref(), Some("50%"));
        assert!(decision.recommended_pod_count.is_none());
    }
}
