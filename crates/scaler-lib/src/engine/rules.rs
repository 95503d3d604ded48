//! Deterministic rule-based scaling strategy
//!
//! Serves both as the default strategy and as the mandatory fallback
//! when the reasoning backend fails.

use crate::models::{MetricsSnapshot, ScalingAction, ScalingDecision, Urgency};

/// Memory percent above which vertical scaling is recommended
pub const MEMORY_VERTICAL_THRESHOLD: f64 = 90.0;

/// CPU percent above which horizontal scale-up triggers
pub const CPU_SCALE_UP_THRESHOLD: f64 = 80.0;

/// Memory percent above which horizontal scale-up triggers
pub const MEMORY_SCALE_UP_THRESHOLD: f64 = 85.0;

/// CPU percent below which scale-down is considered
pub const CPU_SCALE_DOWN_THRESHOLD: f64 = 20.0;

/// Memory percent below which scale-down is considered
pub const MEMORY_SCALE_DOWN_THRESHOLD: f64 = 30.0;

/// Scale-down never goes below this many pods
pub const MIN_PODS_AFTER_SCALE_DOWN: u32 = 2;

const SCALE_UP_FACTOR: f64 = 1.5;
const SCALE_DOWN_FACTOR: f64 = 0.7;

/// Evaluate the rule chain against a snapshot
///
/// Precedence: vertical memory pressure, then horizontal scale-up,
/// then horizontal scale-down, then maintain.
pub fn decide(metrics: &MetricsSnapshot) -> ScalingDecision {
    if metrics.memory_utilization > MEMORY_VERTICAL_THRESHOLD {
        return ScalingDecision::new(
            ScalingAction::ScaleUpVertical,
            0.85,
            "Memory utilization >90%, vertical scaling recommended",
            Urgency::High,
        )
        .with_memory_increase("50%");
    }

    if metrics.cpu_utilization > CPU_SCALE_UP_THRESHOLD
        || metrics.memory_utilization > MEMORY_SCALE_UP_THRESHOLD
    {
        let target = (f64::from(metrics.pod_count) * SCALE_UP_FACTOR).ceil() as u32;
        return ScalingDecision::new(
            ScalingAction::ScaleUpHorizontal,
            0.80,
            "High CPU/memory utilization detected",
            Urgency::High,
        )
        .with_pod_count(target);
    }

    if metrics.cpu_utilization < CPU_SCALE_DOWN_THRESHOLD
        && metrics.memory_utilization < MEMORY_SCALE_DOWN_THRESHOLD
        && metrics.pod_count > MIN_PODS_AFTER_SCALE_DOWN
    {
        let target =
            MIN_PODS_AFTER_SCALE_DOWN.max((f64::from(metrics.pod_count) * SCALE_DOWN_FACTOR).floor() as u32);
        return ScalingDecision::new(
            ScalingAction::ScaleDownHorizontal,
            0.75,
            "Low resource utilization, system over-provisioned",
            Urgency::Low,
        )
        .with_pod_count(target);
    }

    ScalingDecision::new(
        ScalingAction::Maintain,
        0.90,
        "All metrics within acceptable ranges",
        Urgency::Normal,
    )
    .with_pod_count(metrics.pod_count)
}
