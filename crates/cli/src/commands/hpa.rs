//! HPA reconciliation and recommendation commands

use crate::{input, output, output::OutputFormat};
use anyhow::Result;
use scaler_lib::engine::DecisionEngine;
use scaler_lib::error::ApplyError;
use scaler_lib::hpa::{HpaConfig, HpaManifest};
use scaler_lib::observability::NoopSink;
use scaler_lib::reconciler::{recommend_hpa_config, ClusterApplier, HpaReconciler};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Applier that writes the manifest to stdout for piping into
/// `kubectl apply -f -`; the CLI carries no cluster client of its own.
struct StdoutApplier;

impl ClusterApplier for StdoutApplier {
    fn apply(&self, manifest: &HpaManifest) -> Result<(), ApplyError> {
        let json = serde_json::to_string_pretty(manifest)
            .map_err(|e| ApplyError(e.to_string()))?;
        println!("{json}");
        Ok(())
    }
}

pub fn reconcile(
    metrics: &Path,
    history: Option<&Path>,
    mut config: HpaConfig,
    apply: bool,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = input::load_snapshot(metrics)?;
    let history = match history {
        Some(path) => input::load_history(path)?,
        None => Vec::new(),
    };

    let engine = DecisionEngine::rule_based(Arc::new(NoopSink));
    let decision = engine.analyze(&snapshot, &history);
    info!(action = %decision.action, confidence = decision.confidence, "Decision made");

    let mut reconciler = HpaReconciler::new(Box::new(StdoutApplier));
    let result = reconciler.reconcile(&mut config, &decision, !apply)?;

    output::print_reconcile_result(&result, format);
    Ok(())
}

pub fn recommend(history_path: &Path, name: &str, namespace: &str, format: OutputFormat) -> Result<()> {
    let history = input::load_history(history_path)?;

    match recommend_hpa_config(&history, name, namespace) {
        Some(recommendation) => output::print_recommendation(&recommendation, format),
        None => output::print_warning("no metrics history provided, nothing to recommend"),
    }
    Ok(())
}
