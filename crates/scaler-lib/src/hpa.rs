//! Horizontal autoscaler configuration and manifest rendering
//!
//! `HpaConfig` is the one long-lived, mutable piece of state in the
//! core. It is only mutated through validated reconciliation; callers
//! must serialize concurrent access to the same instance.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default CPU utilization target (percent)
pub const DEFAULT_TARGET_CPU: u32 = 70;

/// Default memory utilization target (percent)
pub const DEFAULT_TARGET_MEMORY: u32 = 80;

/// Scale-down cooldown before successive shrink steps
const SCALE_DOWN_STABILIZATION_SECS: u32 = 300;

/// Scale-up reacts immediately
const SCALE_UP_STABILIZATION_SECS: u32 = 0;

/// Validated horizontal autoscaler parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpaConfig {
    pub name: String,
    pub namespace: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub target_cpu_pct: u32,
    pub target_memory_pct: u32,
}

impl HpaConfig {
    /// Config with default utilization targets
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        min_replicas: u32,
        max_replicas: u32,
    ) -> Result<Self, ConfigError> {
        Self::with_targets(
            name,
            namespace,
            min_replicas,
            max_replicas,
            DEFAULT_TARGET_CPU,
            DEFAULT_TARGET_MEMORY,
        )
    }

    pub fn with_targets(
        name: impl Into<String>,
        namespace: impl Into<String>,
        min_replicas: u32,
        max_replicas: u32,
        target_cpu_pct: u32,
        target_memory_pct: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            name: name.into(),
            namespace: namespace.into(),
            min_replicas,
            max_replicas,
            target_cpu_pct,
            target_memory_pct,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check replica bounds and utilization target ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_replicas < 1 {
            return Err(ConfigError::MinReplicas(self.min_replicas));
        }
        if self.max_replicas < self.min_replicas {
            return Err(ConfigError::ReplicaBounds {
                min: self.min_replicas,
                max: self.max_replicas,
            });
        }
        if !(1..=100).contains(&self.target_cpu_pct) {
            return Err(ConfigError::TargetUtilization {
                field: "target_cpu_pct",
                value: self.target_cpu_pct,
            });
        }
        if !(1..=100).contains(&self.target_memory_pct) {
            return Err(ConfigError::TargetUtilization {
                field: "target_memory_pct",
                value: self.target_memory_pct,
            });
        }
        Ok(())
    }

    /// Render the declarative autoscaling/v2 document for this config
    pub fn to_manifest(&self) -> HpaManifest {
        HpaManifest {
            api_version: "autoscaling/v2".to_string(),
            kind: "HorizontalPodAutoscaler".to_string(),
            metadata: Metadata {
                name: self.name.clone(),
                namespace: self.namespace.clone(),
            },
            spec: HpaSpec {
                scale_target_ref: ScaleTargetRef {
                    api_version: "apps/v1".to_string(),
                    kind: "Deployment".to_string(),
                    name: self.name.trim_end_matches("-hpa").to_string(),
                },
                min_replicas: self.min_replicas,
                max_replicas: self.max_replicas,
                metrics: vec![
                    ResourceMetric::utilization("cpu", self.target_cpu_pct),
                    ResourceMetric::utilization("memory", self.target_memory_pct),
                ],
                behavior: ScalingBehavior::fixed_policy(),
            },
        }
    }
}

/// Declarative autoscaler document handed to the cluster applier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: HpaSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaSpec {
    pub scale_target_ref: ScaleTargetRef,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub metrics: Vec<ResourceMetric>,
    pub behavior: ScalingBehavior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleTargetRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetric {
    #[serde(rename = "type")]
    pub metric_type: String,
    pub resource: ResourceTarget,
}

impl ResourceMetric {
    fn utilization(name: &str, percent: u32) -> Self {
        Self {
            metric_type: "Resource".to_string(),
            resource: ResourceTarget {
                name: name.to_string(),
                target: UtilizationTarget {
                    target_type: "Utilization".to_string(),
                    average_utilization: percent,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTarget {
    pub name: String,
    pub target: UtilizationTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationTarget {
    #[serde(rename = "type")]
    pub target_type: String,
    pub average_utilization: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingBehavior {
    pub scale_down: ScalingRules,
    pub scale_up: ScalingRules,
}

impl ScalingBehavior {
    /// Fixed policy set: conservative shrink, aggressive growth
    fn fixed_policy() -> Self {
        Self {
            scale_down: ScalingRules {
                stabilization_window_seconds: SCALE_DOWN_STABILIZATION_SECS,
                policies: vec![
                    ScalingPolicy::percent(50, 60),
                    ScalingPolicy::pods(2, 60),
                ],
                select_policy: "Min".to_string(),
            },
            scale_up: ScalingRules {
                stabilization_window_seconds: SCALE_UP_STABILIZATION_SECS,
                policies: vec![
                    ScalingPolicy::percent(100, 15),
                    ScalingPolicy::pods(4, 15),
                ],
                select_policy: "Max".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingRules {
    pub stabilization_window_seconds: u32,
    pub policies: Vec<ScalingPolicy>,
    pub select_policy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingPolicy {
    #[serde(rename = "type")]
    pub policy_type: String,
    pub value: u32,
    pub period_seconds: u32,
}

impl ScalingPolicy {
    fn percent(value: u32, period_seconds: u32) -> Self {
        Self {
            policy_type: "Percent".to_string(),
            value,
            period_seconds,
        }
    }

    fn pods(value: u32, period_seconds: u32) -> Self {
        Self {
            policy_type: "Pods".to_string(),
            value,
            period_seconds,
        }
    }
}
