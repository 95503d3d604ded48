//! Loading metrics snapshots from JSON files

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use scaler_lib::models::MetricsSnapshot;
use std::fs;
use std::path::Path;

/// Load a single snapshot from a JSON object file
pub fn load_snapshot(path: &Path) -> Result<MetricsSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read metrics file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid metrics snapshot in {}", path.display()))
}

/// Load an ordered history from a JSON array file
pub fn load_history(path: &Path) -> Result<Vec<MetricsSnapshot>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid metrics history in {}", path.display()))
}

/// Pair each snapshot with its embedded timestamp for pattern analysis
pub fn timestamped(history: &[MetricsSnapshot]) -> Vec<(DateTime<Utc>, MetricsSnapshot)> {
    history.iter().map(|m| (m.timestamp, m.clone())).collect()
}
