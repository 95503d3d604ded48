//! Autoscaling advisor CLI
//!
//! A command-line tool for one-shot scaling decisions, schedule
//! synthesis from historical metrics, and HPA reconciliation.

mod commands;
mod config;
mod input;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scaler_lib::hpa::HpaConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Autoscaling advisor CLI
#[derive(Parser)]
#[command(name = "scaler")]
#[command(author, version, about = "Autoscaling decision and schedule engine", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Make a scaling decision from a metrics snapshot
    Decide {
        /// JSON file with the current metrics snapshot
        metrics: PathBuf,

        /// Optional JSON array of historical snapshots
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Synthesize a scaling schedule from historical metrics
    Schedule {
        /// JSON array of historical snapshots
        history: PathBuf,

        /// Minimum pod count (env: SCALER_MIN_PODS)
        #[arg(long)]
        min_pods: Option<u32>,

        /// Maximum pod count (env: SCALER_MAX_PODS)
        #[arg(long)]
        max_pods: Option<u32>,

        /// Build separate weekday and weekend schedules
        #[arg(long)]
        weekly: bool,

        /// Emit periodic-job specifications instead of the schedule
        #[arg(long)]
        cron: bool,

        /// Workload name for scale commands (env: SCALER_WORKLOAD)
        #[arg(long)]
        workload: Option<String>,
    },

    /// Reconcile an HPA configuration against current metrics
    Reconcile {
        /// JSON file with the current metrics snapshot
        metrics: PathBuf,

        /// Optional JSON array of historical snapshots
        #[arg(long)]
        history: Option<PathBuf>,

        /// HPA name
        #[arg(long, default_value = "inference-hpa")]
        name: String,

        /// Namespace (env: SCALER_NAMESPACE)
        #[arg(long)]
        namespace: Option<String>,

        /// Current minimum replicas
        #[arg(long, default_value_t = 2)]
        min_replicas: u32,

        /// Current maximum replicas
        #[arg(long, default_value_t = 20)]
        max_replicas: u32,

        /// Emit the resulting manifest instead of dry-running
        #[arg(long)]
        apply: bool,
    },

    /// Recommend HPA parameters from historical metrics
    Recommend {
        /// JSON array of historical snapshots
        history: PathBuf,

        /// HPA name
        #[arg(long, default_value = "inference-hpa")]
        name: String,

        /// Namespace (env: SCALER_NAMESPACE)
        #[arg(long)]
        namespace: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let defaults = config::CliConfig::load()?;

    match cli.command {
        Commands::Decide { metrics, history } => {
            commands::decide::run(&metrics, history.as_deref(), cli.format)?;
        }
        Commands::Schedule {
            history,
            min_pods,
            max_pods,
            weekly,
            cron,
            workload,
        } => {
            commands::schedule::run(
                &history,
                min_pods.unwrap_or(defaults.min_pods),
                max_pods.unwrap_or(defaults.max_pods),
                weekly,
                cron,
                workload.as_deref().unwrap_or(&defaults.workload),
                cli.format,
            )?;
        }
        Commands::Reconcile {
            metrics,
            history,
            name,
            namespace,
            min_replicas,
            max_replicas,
            apply,
        } => {
            let config = HpaConfig::new(
                name,
                namespace.unwrap_or(defaults.namespace),
                min_replicas,
                max_replicas,
            )?;
            commands::hpa::reconcile(&metrics, history.as_deref(), config, apply, cli.format)?;
        }
        Commands::Recommend {
            history,
            name,
            namespace,
        } => {
            commands::hpa::recommend(
                &history,
                &name,
                namespace.as_deref().unwrap_or(&defaults.namespace),
                cli.format,
            )?;
        }
    }

    Ok(())
}
