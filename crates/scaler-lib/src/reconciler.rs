//! Applies scaling decisions to horizontal autoscaler configurations
//!
//! Bound mutations are all-or-nothing: the candidate config is
//! validated before anything is written back. Cluster pushes go
//! through an injected [`ClusterApplier`]; apply failures are reported
//! in the result, never raised.

use crate::error::{ApplyError, ConfigError};
use crate::hpa::{HpaConfig, HpaManifest, DEFAULT_TARGET_CPU, DEFAULT_TARGET_MEMORY};
use crate::models::{MetricsSnapshot, ScalingAction, ScalingDecision};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Headroom added above a scale-up recommendation
const SCALE_UP_MAX_HEADROOM: u32 = 5;

/// Headroom kept above a scale-down recommendation
const SCALE_DOWN_MAX_HEADROOM: u32 = 3;

/// Pushes a rendered manifest to the cluster
///
/// Implementations own transport, process management and their own
/// timeout; they are never retried by the reconciler.
pub trait ClusterApplier: Send + Sync {
    fn apply(&self, manifest: &HpaManifest) -> Result<(), ApplyError>;
}

/// Old/new pair for one mutated field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub old: u32,
    pub new: u32,
}

/// Outcome of one reconciliation
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResult {
    pub hpa_name: String,
    pub action: ScalingAction,
    /// Keys are "min_replicas" / "max_replicas"
    pub changes: BTreeMap<&'static str, FieldChange>,
    pub applied: bool,
    pub dry_run: bool,
    pub notes: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Reconciles decisions into HPA configurations, keeping an audit trail
pub struct HpaReconciler {
    applier: Box<dyn ClusterApplier>,
    audit: Vec<ReconcileResult>,
}

impl HpaReconciler {
    pub fn new(applier: Box<dyn ClusterApplier>) -> Self {
        Self {
            applier,
            audit: Vec::new(),
        }
    }

    /// Every reconciliation performed so far, dry-run included
    pub fn audit_log(&self) -> &[ReconcileResult] {
        &self.audit
    }

    /// Apply a decision to `config`, optionally pushing to the cluster
    ///
    /// A validation failure aborts with `ConfigError` and leaves
    /// `config` untouched.
    pub fn reconcile(
        &mut self,
        config: &mut HpaConfig,
        decision: &ScalingDecision,
        dry_run: bool,
    ) -> Result<ReconcileResult, ConfigError> {
        let mut result = ReconcileResult {
            hpa_name: config.name.clone(),
            action: decision.action,
            changes: BTreeMap::new(),
            applied: false,
            dry_run,
            notes: Vec::new(),
            timestamp: Utc::now(),
        };

        let new_bounds = match decision.action {
            ScalingAction::ScaleUpHorizontal => match decision.recommended_pod_count {
                Some(n) => Some((
                    config
                        .min_replicas
                        .max((f64::from(n) * 0.5).floor() as u32),
                    (n + SCALE_UP_MAX_HEADROOM).max(config.max_replicas),
                )),
                None => {
                    result
                        .notes
                        .push("decision carried no recommended pod count".to_string());
                    None
                }
            },
            ScalingAction::ScaleDownHorizontal => match decision.recommended_pod_count {
                Some(n) => Some((2.max(n.saturating_sub(1)), n + SCALE_DOWN_MAX_HEADROOM)),
                None => {
                    result
                        .notes
                        .push("decision carried no recommended pod count".to_string());
                    None
                }
            },
            ScalingAction::ScaleUpVertical | ScalingAction::ScaleDownVertical => {
                result.notes.push(
                    "vertical scaling requires deployment resource updates, not HPA changes"
                        .to_string(),
                );
                if let Some(memory) = &decision.recommended_memory_increase {
                    result.notes.push(format!("recommended memory increase: {memory}"));
                }
                if let Some(cpu) = &decision.recommended_cpu_increase {
                    result.notes.push(format!("recommended cpu increase: {cpu}"));
                }
                None
            }
            ScalingAction::Maintain => {
                result
                    .notes
                    .push("no HPA changes needed, current configuration is appropriate".to_string());
                None
            }
        };

        if let Some((new_min, new_max)) = new_bounds {
            // Validate the candidate before touching the live config
            let mut candidate = config.clone();
            candidate.min_replicas = new_min;
            candidate.max_replicas = new_max;
            candidate.validate()?;

            if new_min != config.min_replicas {
                result.changes.insert(
                    "min_replicas",
                    FieldChange {
                        old: config.min_replicas,
                        new: new_min,
                    },
                );
            }
            if new_max != config.max_replicas {
                result.changes.insert(
                    "max_replicas",
                    FieldChange {
                        old: config.max_replicas,
                        new: new_max,
                    },
                );
            }

            config.min_replicas = new_min;
            config.max_replicas = new_max;
        }

        if !result.changes.is_empty() {
            if dry_run {
                result
                    .notes
                    .push("dry-run mode: changes not applied to cluster".to_string());
            } else {
                match self.applier.apply(&config.to_manifest()) {
                    Ok(()) => {
                        result.applied = true;
                        info!(
                            event = "hpa_applied",
                            hpa_name = %config.name,
                            min_replicas = config.min_replicas,
                            max_replicas = config.max_replicas,
                            "HPA configuration applied to cluster"
                        );
                    }
                    Err(err) => {
                        warn!(
                            event = "hpa_apply_failed",
                            hpa_name = %config.name,
                            error = %err,
                            "HPA apply failed"
                        );
                        result.notes.push(err.to_string());
                    }
                }
            }
        }

        self.audit.push(result.clone());
        Ok(result)
    }
}

/// Usage figures backing an HPA recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageAnalysis {
    pub max_cpu_observed: f64,
    pub max_memory_observed: f64,
    pub max_pods_used: u32,
    pub avg_pods_used: f64,
}

/// Suggested HPA parameters derived from a history window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HpaRecommendation {
    pub config: HpaConfig,
    pub analysis: UsageAnalysis,
    pub reasoning: String,
}

/// Derive an HPA configuration from observed usage
///
/// Sizing follows the historical envelope: the floor tracks average
/// pod usage, the ceiling tracks the observed maximum with headroom,
/// and utilization targets are lowered when the history shows the
/// workload running hot. Empty history yields `None`.
pub fn recommend_hpa_config(
    history: &[MetricsSnapshot],
    name: &str,
    namespace: &str,
) -> Option<HpaRecommendation> {
    if history.is_empty() {
        return None;
    }

    let n = history.len() as f64;
    let max_cpu = history.iter().map(|m| m.cpu_utilization).fold(f64::MIN, f64::max);
    let max_memory = history
        .iter()
        .map(|m| m.memory_utilization)
        .fold(f64::MIN, f64::max);
    let max_pods = history.iter().map(|m| m.pod_count).max().unwrap_or(0);
    let avg_pods = history.iter().map(|m| f64::from(m.pod_count)).sum::<f64>() / n;

    let min_replicas = 2.max((avg_pods * 0.7).floor() as u32);
    let max_replicas = ((f64::from(max_pods) * 1.5).ceil() as u32).max(min_replicas + 5);

    let target_cpu = if max_cpu > 90.0 { 65 } else { DEFAULT_TARGET_CPU };
    let target_memory = if max_memory > 90.0 { 75 } else { DEFAULT_TARGET_MEMORY };

    let config = HpaConfig::with_targets(
        name,
        namespace,
        min_replicas,
        max_replicas,
        target_cpu,
        target_memory,
    )
    .ok()?;

    let reasoning = format!(
        "Based on {} data points: max CPU {max_cpu}%, max memory {max_memory}%, \
         recommending min={min_replicas} max={max_replicas} pods",
        history.len()
    );

    Some(HpaRecommendation {
        config,
        analysis: UsageAnalysis {
            max_cpu_observed: max_cpu,
            max_memory_observed: max_memory,
            max_pods_used: max_pods,
            avg_pods_used: (avg_pods * 100.0).round() / 100.0,
        },
        reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Urgency;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeApplier {
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeApplier {
        fn new(succeed: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    succeed,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl ClusterApplier for FakeApplier {
        fn apply(&self, _manifest: &HpaManifest) -> Result<(), ApplyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(ApplyError("connection refused".to_string()))
            }
        }
    }

    fn decision(action: ScalingAction, pods: Option<u32>) -> ScalingDecision {
        let mut d = ScalingDecision::new(action, 0.8, "test", Urgency::Normal);
        d.recommended_pod_count = pods;
        d
    }

    #[test]
    fn test_scale_up_widens_bounds() {
        let (applier, _) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 20).unwrap();

        let result = reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleUpHorizontal, Some(5)),
                true,
            )
            .unwrap();

        // max(5 + 5, 20) = 20 unchanged; min stays max(3, floor(2.5)) = 3
        assert_eq!(config.max_replicas, 20);
        assert_eq!(config.min_replicas, 3);
        assert!(result.changes.is_empty());

        // A larger recommendation pushes the ceiling up
        let result = reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleUpHorizontal, Some(30)),
                true,
            )
            .unwrap();
        assert_eq!(config.max_replicas, 35);
        assert_eq!(config.min_replicas, 15);
        assert_eq!(result.changes["max_replicas"], FieldChange { old: 20, new: 35 });
        assert_eq!(result.changes["min_replicas"], FieldChange { old: 3, new: 15 });
    }

    #[test]
    fn test_scale_down_narrows_bounds() {
        let (applier, _) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 5, 20).unwrap();

        reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleDownHorizontal, Some(5)),
                true,
            )
            .unwrap();

        assert_eq!(config.max_replicas, 8); // 5 + 3
        assert_eq!(config.min_replicas, 4); // max(2, 5 - 1)
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_maintain_is_idempotent() {
        let (applier, calls) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 20).unwrap();
        let before = config.clone();

        let result = reconciler
            .reconcile(&mut config, &decision(ScalingAction::Maintain, Some(3)), false)
            .unwrap();

        assert_eq!(config, before);
        assert!(result.changes.is_empty());
        assert!(!result.applied);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_vertical_decision_is_advisory() {
        let (applier, calls) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 20).unwrap();
        let before = config.clone();

        let d = ScalingDecision::new(ScalingAction::ScaleUpVertical, 0.85, "memory", Urgency::High)
            .with_memory_increase("50%");
        let result = reconciler.reconcile(&mut config, &d, false).unwrap();

        assert_eq!(config, before);
        assert!(result.notes.iter().any(|n| n.contains("memory increase: 50%")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dry_run_skips_applier() {
        let (applier, calls) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 10).unwrap();

        let result = reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleUpHorizontal, Some(12)),
                true,
            )
            .unwrap();

        assert!(!result.changes.is_empty());
        assert!(!result.applied);
        assert!(result.notes.iter().any(|n| n.contains("dry-run")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_apply_invoked_when_not_dry_run() {
        let (applier, calls) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 10).unwrap();

        let result = reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleUpHorizontal, Some(12)),
                false,
            )
            .unwrap();

        assert!(result.applied);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_apply_failure_noted_not_raised() {
        let (applier, _) = FakeApplier::new(false);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 10).unwrap();

        let result = reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleUpHorizontal, Some(12)),
                false,
            )
            .unwrap();

        assert!(!result.applied);
        assert!(result.notes.iter().any(|n| n.contains("connection refused")));
        // Config was still mutated; only the push failed
        assert_eq!(config.max_replicas, 17);
    }

    #[test]
    fn test_missing_recommendation_changes_nothing() {
        let (applier, _) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 10).unwrap();
        let before = config.clone();

        let result = reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleUpHorizontal, None),
                false,
            )
            .unwrap();

        assert_eq!(config, before);
        assert!(result.changes.is_empty());
    }

    #[test]
    fn test_bounds_valid_after_every_reconcile() {
        let (applier, _) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 2, 8).unwrap();

        for (action, pods) in [
            (ScalingAction::ScaleUpHorizontal, Some(12)),
            (ScalingAction::ScaleDownHorizontal, Some(3)),
            (ScalingAction::Maintain, Some(3)),
            (ScalingAction::ScaleUpHorizontal, Some(40)),
            (ScalingAction::ScaleDownHorizontal, Some(2)),
        ] {
            reconciler
                .reconcile(&mut config, &decision(action, pods), true)
                .unwrap();
            assert!(config.min_replicas >= 1);
            assert!(config.max_replicas >= config.min_replicas);
            assert!((1..=100).contains(&config.target_cpu_pct));
            assert!((1..=100).contains(&config.target_memory_pct));
        }
    }

    #[test]
    fn test_audit_log_records_every_call() {
        let (applier, _) = FakeApplier::new(true);
        let mut reconciler = HpaReconciler::new(Box::new(applier));
        let mut config = HpaConfig::new("svc-hpa", "default", 3, 20).unwrap();

        reconciler
            .reconcile(&mut config, &decision(ScalingAction::Maintain, Some(3)), true)
            .unwrap();
        reconciler
            .reconcile(
                &mut config,
                &decision(ScalingAction::ScaleUpHorizontal, Some(30)),
                false,
            )
            .unwrap();

        let audit = reconciler.audit_log();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].action, ScalingAction::Maintain);
        assert!(audit[0].dry_run);
        assert!(!audit[1].dry_run);
    }

    #[test]
    fn test_recommendation_from_history() {
        let history = vec![
            MetricsSnapshot::new(45.0, 55.0, 3),
            MetricsSnapshot::new(72.0, 78.0, 3),
            MetricsSnapshot::new(85.0, 88.0, 8),
            MetricsSnapshot::new(78.0, 82.0, 8),
            MetricsSnapshot::new(62.0, 68.0, 5),
            MetricsSnapshot::new(45.0, 52.0, 4),
        ];

        let rec = recommend_hpa_config(&history, "inference-hpa", "ai-services").unwrap();
        // avg pods = 5.17 -> min = max(2, 3) = 3; max = max(ceil(12), 8) = 12
        assert_eq!(rec.config.min_replicas, 3);
        assert_eq!(rec.config.max_replicas, 12);
        assert_eq!(rec.config.target_cpu_pct, DEFAULT_TARGET_CPU);
        assert_eq!(rec.analysis.max_pods_used, 8);
        assert!(rec.config.validate().is_ok());
    }

    #[test]
    fn test_recommendation_lowers_targets_when_running_hot() {
        let history = vec![
            MetricsSnapshot::new(95.0, 93.0, 6),
            MetricsSnapshot::new(88.0, 85.0, 6),
        ];

        let rec = recommend_hpa_config(&history, "svc-hpa", "default").unwrap();
        assert_eq!(rec.config.target_cpu_pct, 65);
        assert_eq!(rec.config.target_memory_pct, 75);
    }

    #[test]
    fn test_recommendation_empty_history() {
        assert!(recommend_hpa_config(&[], "svc-hpa", "default").is_none());
    }
}
