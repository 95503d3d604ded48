//! Scaling decision engine
//!
//! Composes two strategies: an optional reasoning backend tried first,
//! and the deterministic rule chain used directly or as fallback.
//! `analyze` never fails for normal operation; backend trouble degrades
//! to a rule-based decision with the failure noted in the reasoning.

pub mod backend;
pub mod rules;

use crate::error::BackendError;
use crate::models::{MetricsSnapshot, ScalingDecision};
use crate::observability::{ConfidenceBucket, MetricsSink};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub use backend::{build_prompt, classify_trend, parse_decision, ReasoningBackend, Trend};

/// Turns snapshots into scaling decisions
pub struct DecisionEngine {
    backend: Option<Box<dyn ReasoningBackend>>,
    sink: Arc<dyn MetricsSink>,
}

impl DecisionEngine {
    /// Engine using only the rule strategy
    pub fn rule_based(sink: Arc<dyn MetricsSink>) -> Self {
        Self { backend: None, sink }
    }

    /// Engine trying the reasoning backend first, rules as fallback
    pub fn with_backend(backend: Box<dyn ReasoningBackend>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            backend: Some(backend),
            sink,
        }
    }

    /// Analyze a snapshot (plus optional history) into a decision
    ///
    /// History is only consulted by the backend strategy, where it
    /// feeds trend classification; the rule chain looks at the current
    /// snapshot alone.
    pub fn analyze(&self, current: &MetricsSnapshot, history: &[MetricsSnapshot]) -> ScalingDecision {
        let started = Instant::now();

        let decision = match &self.backend {
            None => rules::decide(current),
            Some(backend) => match Self::backend_decision(backend.as_ref(), current, history) {
                Ok(decision) => decision,
                Err(err) => {
                    warn!(
                        event = "backend_fallback",
                        error = %err,
                        "Reasoning backend failed, using rule-based decision"
                    );
                    let mut fallback = rules::decide(current);
                    fallback.reasoning =
                        format!("{} (reasoning backend unavailable: {err})", fallback.reasoning);
                    fallback
                }
            },
        };

        self.sink.record_decision(
            decision.action,
            ConfidenceBucket::from_confidence(decision.confidence),
        );
        self.sink
            .observe_analysis_latency(started.elapsed().as_secs_f64());

        debug!(
            event = "scaling_decision",
            action = %decision.action,
            confidence = decision.confidence,
            urgency = %decision.urgency,
            pod_count = current.pod_count,
            "Scaling decision made"
        );

        decision
    }

    fn backend_decision(
        backend: &dyn ReasoningBackend,
        current: &MetricsSnapshot,
        history: &[MetricsSnapshot],
    ) -> Result<ScalingDecision, BackendError> {
        let prompt = backend::build_prompt(current, history);
        let response = backend.complete(&prompt)?;
        backend::parse_decision(&response)
    }
}
