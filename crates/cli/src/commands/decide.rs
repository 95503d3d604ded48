//! One-shot scaling decision from a snapshot file

use crate::{input, output, output::OutputFormat};
use anyhow::Result;
use scaler_lib::engine::DecisionEngine;
use scaler_lib::observability::NoopSink;
use std::path::Path;
use std::sync::Arc;

pub fn run(metrics: &Path, history: Option<&Path>, format: OutputFormat) -> Result<()> {
    let snapshot = input::load_snapshot(metrics)?;
    let history = match history {
        Some(path) => input::load_history(path)?,
        None => Vec::new(),
    };

    let engine = DecisionEngine::rule_based(Arc::new(NoopSink));
    let decision = engine.analyze(&snapshot, &history);

    output::print_decision(&decision, format);
    Ok(())
}
