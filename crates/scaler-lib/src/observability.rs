//! Self-observability for the decision engine
//!
//! Decision counters and analysis latency are delivered through an
//! injected [`MetricsSink`] so tests can substitute a recording or
//! no-op sink without touching global state.

use crate::models::ScalingAction;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};

/// Latency buckets for decision analysis (in seconds)
const ANALYSIS_LATENCY_BUCKETS: &[f64] = &[0.5, 1.0, 2.0, 5.0, 10.0];

/// Coarse classification of a decision's confidence for metrics grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

impl ConfidenceBucket {
    /// high > 0.8, medium > 0.5, low otherwise
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            ConfidenceBucket::High
        } else if confidence > 0.5 {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBucket::High => "high",
            ConfidenceBucket::Medium => "medium",
            ConfidenceBucket::Low => "low",
        }
    }
}

/// Sink for engine self-observability signals
pub trait MetricsSink: Send + Sync {
    /// Count one decision, keyed by action and confidence bucket
    fn record_decision(&self, action: ScalingAction, bucket: ConfidenceBucket);

    /// Record how long one analysis call took
    fn observe_analysis_latency(&self, seconds: f64);
}

/// Sink that discards all observations
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record_decision(&self, _action: ScalingAction, _bucket: ConfidenceBucket) {}
    fn observe_analysis_latency(&self, _seconds: f64) {}
}

/// Prometheus-backed sink registering into a caller-supplied registry
#[derive(Clone)]
pub struct PrometheusSink {
    decisions_total: IntCounterVec,
    analysis_latency_seconds: Histogram,
}

impl PrometheusSink {
    /// Create the sink and register its collectors with `registry`
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let decisions_total = IntCounterVec::new(
            Opts::new(
                "scaling_decisions_total",
                "Total number of scaling decisions made",
            ),
            &["decision_type", "confidence_level"],
        )?;
        registry.register(Box::new(decisions_total.clone()))?;

        let analysis_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "scaling_analysis_latency_seconds",
                "Time taken to analyze metrics and make a scaling decision",
            )
            .buckets(ANALYSIS_LATENCY_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(analysis_latency_seconds.clone()))?;

        Ok(Self {
            decisions_total,
            analysis_latency_seconds,
        })
    }
}

impl MetricsSink for PrometheusSink {
    fn record_decision(&self, action: ScalingAction, bucket: ConfidenceBucket) {
        self.decisions_total
            .with_label_values(&[action.as_str(), bucket.as_str()])
            .inc();
    }

    fn observe_analysis_latency(&self, seconds: f64) {
        self.analysis_latency_seconds.observe(seconds);
    }
}
