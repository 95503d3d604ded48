//! Reasoning backend contract and request/response handling
//!
//! The engine never talks to a concrete model API. It builds a
//! structured prompt, hands it to an injected [`ReasoningBackend`], and
//! parses the reply into a [`ScalingDecision`]. Anything short of one
//! valid JSON object is a [`BackendError`] and triggers fallback.

use crate::error::BackendError;
use crate::models::{MetricsSnapshot, ScalingAction, ScalingDecision, Urgency};
use chrono::Utc;
use serde::Deserialize;

/// Historical points quoted verbatim in the prompt
const RECENT_HISTORY_POINTS: usize = 5;

/// Window used for the short-term average in trend classification
const TREND_RECENT_WINDOW: usize = 3;

/// Percent deviation from the overall average that counts as a trend
const TREND_THRESHOLD_PERCENT: f64 = 10.0;

/// Outbound reasoning contract: one blocking call, bounded timeout
///
/// Implementations own their transport and timeout; the engine treats
/// every error identically by falling back to the rule strategy.
pub trait ReasoningBackend: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Direction of a metric's recent movement relative to its average
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    Increasing(f64),
    Decreasing(f64),
    Stable,
    InsufficientData,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing(pct) => write!(f, "increasing ({pct:.1}% above average)"),
            Trend::Decreasing(pct) => write!(f, "decreasing ({pct:.1}% below average)"),
            Trend::Stable => f.write_str("stable"),
            Trend::InsufficientData => f.write_str("insufficient data"),
        }
    }
}

/// Classify a metric series: mean of the last 3 points vs mean of all
pub fn classify_trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::InsufficientData;
    }

    let tail = &values[values.len().saturating_sub(TREND_RECENT_WINDOW)..];
    let recent_avg = tail.iter().sum::<f64>() / tail.len() as f64;
    let overall_avg = values.iter().sum::<f64>() / values.len() as f64;

    if overall_avg.abs() < f64::EPSILON {
        return Trend::Stable;
    }

    let diff_percent = (recent_avg - overall_avg) / overall_avg * 100.0;
    if diff_percent > TREND_THRESHOLD_PERCENT {
        Trend::Increasing(diff_percent)
    } else if diff_percent < -TREND_THRESHOLD_PERCENT {
        Trend::Decreasing(diff_percent.abs())
    } else {
        Trend::Stable
    }
}

/// Build the analysis prompt from the current snapshot and history
pub fn build_prompt(current: &MetricsSnapshot, history: &[MetricsSnapshot]) -> String {
    let current_json =
        serde_json::to_string_pretty(current).unwrap_or_else(|_| "{}".to_string());

    let mut sections = vec![
        "You are an expert DevOps engineer specializing in Kubernetes autoscaling and resource optimization."
            .to_string(),
        String::new(),
        "Analyze the following metrics and provide a scaling recommendation:".to_string(),
        String::new(),
        "CURRENT METRICS:".to_string(),
        current_json,
    ];

    if !history.is_empty() {
        let cpu: Vec<f64> = history.iter().map(|m| m.cpu_utilization).collect();
        let memory: Vec<f64> = history.iter().map(|m| m.memory_utilization).collect();
        let rps: Vec<f64> = history.iter().map(|m| m.request_rate).collect();

        sections.push(String::new());
        sections.push("HISTORICAL TRENDS:".to_string());
        sections.push(format!("- CPU utilization trend: {}", classify_trend(&cpu)));
        sections.push(format!("- Memory utilization trend: {}", classify_trend(&memory)));
        sections.push(format!("- Request rate trend: {}", classify_trend(&rps)));

        sections.push(String::new());
        sections.push(format!(
            "RECENT HISTORY (last {RECENT_HISTORY_POINTS} data points):"
        ));
        let start = history.len().saturating_sub(RECENT_HISTORY_POINTS);
        for (i, m) in history[start..].iter().enumerate() {
            sections.push(format!(
                "  {}. CPU: {}%, Memory: {}%, RPS: {}",
                i + 1,
                m.cpu_utilization,
                m.memory_utilization,
                m.request_rate
            ));
        }
    }

    sections.push(String::new());
    sections.push(
        r#"Based on these metrics, provide a scaling recommendation in the following JSON format:
{
    "action": "maintain|scale_up_horizontal|scale_down_horizontal|scale_up_vertical|scale_down_vertical",
    "recommended_pod_count": <number or null>,
    "recommended_memory_increase": "<percentage or null>",
    "recommended_cpu_increase": "<percentage or null>",
    "confidence": <0.0 to 1.0>,
    "reasoning": "<detailed explanation>",
    "urgency": "low|normal|high|critical",
    "estimated_cost_impact": "<cost analysis>"
}

Consider:
1. Current resource utilization and capacity
2. Error rates and response times
3. Queue depth and active connections
4. Trends from historical data (if available)
5. Cost optimization opportunities
6. Risk of service degradation

Respond with ONLY the JSON object, no additional text."#
            .to_string(),
    );

    sections.join("\n")
}

/// Decision fields the backend must return
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DecisionPayload {
    action: ScalingAction,
    #[serde(default)]
    recommended_pod_count: Option<u32>,
    #[serde(default)]
    recommended_memory_increase: Option<String>,
    #[serde(default)]
    recommended_cpu_increase: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default = "default_urgency")]
    urgency: Urgency,
    #[serde(default)]
    estimated_cost_impact: Option<String>,
}

fn default_urgency() -> Urgency {
    Urgency::Normal
}

/// Parse a backend reply into a decision, stripping code fences first
pub fn parse_decision(raw: &str) -> Result<ScalingDecision, BackendError> {
    let body = strip_code_fences(raw);

    let payload: DecisionPayload = serde_json::from_str(&body)
        .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

    if !(0.0..=1.0).contains(&payload.confidence) {
        return Err(BackendError::InvalidResponse(format!(
            "confidence {} out of [0, 1]",
            payload.confidence
        )));
    }

    Ok(ScalingDecision {
        action: payload.action,
        recommended_pod_count: payload.recommended_pod_count,
        recommended_memory_increase: payload.recommended_memory_increase,
        recommended_cpu_increase: payload.recommended_cpu_increase,
        confidence: payload.confidence,
        reasoning: payload.reasoning,
        urgency: payload.urgency,
        estimated_cost_impact: payload.estimated_cost_impact,
        timestamp: Utc::now(),
    })
}

/// Remove surrounding markdown code fences, keeping the inner body
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let inner = rest.split("```").next().unwrap_or(rest);
            let inner = inner.strip_prefix("json").unwrap_or(inner);
            inner.trim().to_string()
        }
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_insufficient_data() {
        assert_eq!(classify_trend(&[]), Trend::InsufficientData);
        assert_eq!(classify_trend(&[50.0]), Trend::InsufficientData);
    }

    #[test]
    fn test_trend_increasing() {
        // overall avg 45, recent avg (50+70+90)/3 = 70 -> +55%
        let values = [20.0, 30.0, 40.0, 50.0, 70.0, 90.0];
        match classify_trend(&values) {
            Trend::Increasing(pct) => assert!(pct > 10.0),
            other => panic!("expected increasing, got {other:?}"),
        }
    }

    #[test]
    fn test_trend_decreasing() {
        let values = [90.0, 80.0, 70.0, 30.0, 20.0, 10.0];
        match classify_trend(&values) {
            Trend::Decreasing(pct) => assert!(pct > 10.0),
            other => panic!("expected decreasing, got {other:?}"),
        }
    }

    #[test]
    fn test_trend_stable() {
        let values = [50.0, 52.0, 48.0, 51.0, 49.0, 50.0];
        assert_eq!(classify_trend(&values), Trend::Stable);
    }

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{
            "action": "scale_up_horizontal",
            "recommended_pod_count": 6,
            "recommended_memory_increase": null,
            "recommended_cpu_increase": null,
            "confidence": 0.92,
            "reasoning": "sustained load growth",
            "urgency": "high",
            "estimated_cost_impact": "+2 pods"
        }"#;

        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.action, ScalingAction::ScaleUpHorizontal);
        assert_eq!(decision.recommended_pod_count, Some(6));
        assert_eq!(decision.urgency, Urgency::High);
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"action\": \"maintain\", \"confidence\": 0.9, \"reasoning\": \"ok\", \"urgency\": \"normal\"}\n```";
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.action, ScalingAction::Maintain);
        assert_eq!(decision.confidence, 0.9);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_decision("scale up, trust me").unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let raw = r#"{"action": "panic", "confidence": 0.5, "reasoning": "", "urgency": "low"}"#;
        assert!(parse_decision(raw).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_confidence() {
        let raw = r#"{"action": "maintain", "confidence": 1.5, "reasoning": "", "urgency": "low"}"#;
        assert!(parse_decision(raw).is_err());
    }

    #[test]
    fn test_prompt_contains_trend_block_only_with_history() {
        let current = MetricsSnapshot::new(50.0, 50.0, 3);

        let bare = build_prompt(&current, &[]);
        assert!(!bare.contains("HISTORICAL TRENDS"));

        let history = vec![MetricsSnapshot::new(40.0, 40.0, 3); 4];
        let with_history = build_prompt(&current, &history);
        assert!(with_history.contains("HISTORICAL TRENDS"));
        assert!(with_history.contains("RECENT HISTORY"));
    }
}
