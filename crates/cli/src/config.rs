//! CLI configuration

use anyhow::Result;
use serde::Deserialize;

/// Defaults for scaling commands, overridable per invocation
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Lower bound for synthesized schedules and reconciliation
    #[serde(default = "default_min_pods")]
    pub min_pods: u32,

    /// Upper bound for synthesized schedules and reconciliation
    #[serde(default = "default_max_pods")]
    pub max_pods: u32,

    /// Deployment name used in scale commands
    #[serde(default = "default_workload")]
    pub workload: String,

    /// Namespace for HPA configurations
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_min_pods() -> u32 {
    2
}

fn default_max_pods() -> u32 {
    20
}

fn default_workload() -> String {
    "inference-service".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

impl CliConfig {
    /// Load configuration from SCALER_-prefixed environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SCALER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| CliConfig {
            min_pods: default_min_pods(),
            max_pods: default_max_pods(),
            workload: default_workload(),
            namespace: default_namespace(),
        }))
    }
}
