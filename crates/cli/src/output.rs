//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use scaler_lib::models::ScalingDecision;
use scaler_lib::reconciler::{HpaRecommendation, ReconcileResult};
use scaler_lib::schedule::{CronJobSpec, DaySpan, ScalingSchedule};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format confidence as a colored percentage
fn color_confidence(confidence: f64) -> String {
    let formatted = format!("{:.0}%", confidence * 100.0);
    if confidence >= 0.8 {
        formatted.green().to_string()
    } else if confidence >= 0.6 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

fn print_json<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{json}");
    }
}

#[derive(Tabled)]
struct DecisionRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Pods")]
    pods: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Urgency")]
    urgency: String,
    #[tabled(rename = "Reasoning")]
    reasoning: String,
}

pub fn print_decision(decision: &ScalingDecision, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(decision),
        OutputFormat::Table => {
            let row = DecisionRow {
                action: decision.action.to_string(),
                pods: decision
                    .recommended_pod_count
                    .map_or_else(|| "-".to_string(), |p| p.to_string()),
                confidence: color_confidence(decision.confidence),
                urgency: decision.urgency.to_string(),
                reasoning: decision.reasoning.clone(),
            };
            println!("{}", Table::new([row]).with(Style::rounded()));
            if let Some(memory) = &decision.recommended_memory_increase {
                println!("  recommended memory increase: {memory}");
            }
            if let Some(cpu) = &decision.recommended_cpu_increase {
                println!("  recommended cpu increase: {cpu}");
            }
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Target Pods")]
    target_pods: u32,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

pub fn print_schedule(schedule: &ScalingSchedule, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(schedule),
        OutputFormat::Table => {
            println!("{} ({})", schedule.name.bold(), schedule.description);
            if schedule.is_empty() {
                print_warning("schedule is empty");
                return;
            }
            let rows: Vec<EntryRow> = schedule
                .entries
                .iter()
                .map(|e| EntryRow {
                    time: e.time.clone(),
                    days: match e.day_of_week {
                        Some(DaySpan::Weekday) => "Mon-Fri".to_string(),
                        Some(DaySpan::Weekend) => "Sat-Sun".to_string(),
                        None => "daily".to_string(),
                    },
                    target_pods: e.target_pods,
                    confidence: color_confidence(e.confidence),
                    reason: e.reason.clone(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
}

#[derive(Tabled)]
struct CronRow {
    #[tabled(rename = "Schedule")]
    schedule: String,
    #[tabled(rename = "Target Pods")]
    target_pods: u32,
    #[tabled(rename = "Command")]
    command: String,
}

pub fn print_cron_jobs(jobs: &[CronJobSpec], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&jobs),
        OutputFormat::Table => {
            if jobs.is_empty() {
                print_warning("no periodic jobs generated");
                return;
            }
            let rows: Vec<CronRow> = jobs
                .iter()
                .map(|j| CronRow {
                    schedule: j.schedule.clone(),
                    target_pods: j.target_pods,
                    command: j.scale_command.clone(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
}

pub fn print_reconcile_result(result: &ReconcileResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            println!(
                "{} {} ({})",
                result.hpa_name.bold(),
                result.action,
                if result.dry_run { "dry-run" } else { "live" }
            );
            for (field, change) in &result.changes {
                println!("  {field}: {} -> {}", change.old, change.new);
            }
            if result.changes.is_empty() {
                println!("  no changes");
            }
            if result.applied {
                println!("  {} applied to cluster", "✓".green().bold());
            }
            for note in &result.notes {
                println!("  {note}");
            }
        }
    }
}

pub fn print_recommendation(recommendation: &HpaRecommendation, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(recommendation),
        OutputFormat::Table => {
            let config = &recommendation.config;
            println!("{}/{}", config.namespace, config.name.bold());
            println!(
                "  replicas: {}..{}, targets: cpu {}%, memory {}%",
                config.min_replicas, config.max_replicas, config.target_cpu_pct, config.target_memory_pct
            );
            println!("  {}", recommendation.reasoning);
        }
    }
}
