//! Scaling schedule synthesis
//!
//! Turns a pattern summary into a recurring time-of-day schedule and
//! translates it into periodic-job specifications. When several rules
//! produce an entry for the same time slot, the last entry wins (the
//! low-traffic override beats the standard hourly entry).

use crate::models::MetricsSnapshot;
use crate::patterns::{analyze_patterns, PatternSummary};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Target CPU utilization the schedule sizes pods against
pub const TARGET_CPU_PERCENT: f64 = 70.0;

/// Target memory utilization the schedule sizes pods against
pub const TARGET_MEMORY_PERCENT: f64 = 80.0;

/// Day restriction for a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaySpan {
    Weekday,
    Weekend,
}

impl DaySpan {
    /// Cron day-of-week field for this span
    fn cron_days(&self) -> &'static str {
        match self {
            DaySpan::Weekday => "1-5",
            DaySpan::Weekend => "0,6",
        }
    }
}

/// One scheduled scaling step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Time of day, "HH:MM"
    pub time: String,
    pub target_pods: u32,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DaySpan>,
    pub confidence: f64,
}

/// A recurring scaling schedule, entries ordered by time of day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingSchedule {
    pub name: String,
    pub description: String,
    pub entries: Vec<ScheduleEntry>,
}

impl ScalingSchedule {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate every entry into a periodic-job specification
    pub fn to_cron_jobs(&self, workload: &str) -> Vec<CronJobSpec> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let (hour, minute) = entry.time.split_once(':')?;
                let days = entry.day_of_week.map_or("*", |d| d.cron_days());
                Some(CronJobSpec {
                    schedule: format!("{minute} {hour} * * {days}"),
                    target_pods: entry.target_pods,
                    reason: entry.reason.clone(),
                    scale_command: format!(
                        "kubectl scale deployment {workload} --replicas={}",
                        entry.target_pods
                    ),
                })
            })
            .collect()
    }
}

/// Periodic-job form of one schedule entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CronJobSpec {
    /// Cron expression, "MM HH * * DAYS"
    pub schedule: String,
    pub target_pods: u32,
    pub reason: String,
    /// Idempotent scale command for the workload
    pub scale_command: String,
}

/// Weekday/weekend pair produced by the weekly variant
#[derive(Debug, Clone, Serialize)]
pub struct WeeklySchedules {
    pub weekday: Option<ScalingSchedule>,
    pub weekend: Option<ScalingSchedule>,
}

/// Builds scaling schedules from metrics history
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSynthesizer {
    pub min_pods: u32,
    pub max_pods: u32,
}

impl ScheduleSynthesizer {
    pub fn new(min_pods: u32, max_pods: u32) -> Self {
        Self { min_pods, max_pods }
    }

    /// Build a schedule covering every hour with data
    ///
    /// Empty history yields an empty schedule rather than an error.
    pub fn build(&self, history: &[(DateTime<Utc>, MetricsSnapshot)]) -> ScalingSchedule {
        let summary = analyze_patterns(history);
        if summary.is_empty() {
            return ScalingSchedule::new("workload-schedule", "no metrics history available");
        }

        let mut schedule = ScalingSchedule::new(
            "workload-schedule",
            "Generated from historical metrics analysis",
        );
        self.fill_entries(&mut schedule, &summary);

        debug!(
            event = "schedule_built",
            entries = schedule.entries.len(),
            peak_hours = summary.peak_hours.len(),
            low_traffic_hours = summary.low_traffic_hours.len(),
            "Scaling schedule built"
        );

        schedule
    }

    /// Build independent weekday (Mon-Fri) and weekend schedules
    pub fn build_weekly(&self, history: &[(DateTime<Utc>, MetricsSnapshot)]) -> WeeklySchedules {
        let (weekday_history, weekend_history): (Vec<_>, Vec<_>) = history
            .iter()
            .cloned()
            .partition(|(ts, _)| ts.weekday().num_days_from_monday() < 5);

        let weekday = (!weekday_history.is_empty()).then(|| {
            let mut schedule = self.build(&weekday_history);
            schedule.name = "weekday-schedule".to_string();
            schedule.description = "Scaling schedule for Monday-Friday".to_string();
            tag_entries(&mut schedule, DaySpan::Weekday);
            schedule
        });

        let weekend = (!weekend_history.is_empty()).then(|| {
            let mut schedule = self.build(&weekend_history);
            schedule.name = "weekend-schedule".to_string();
            schedule.description = "Scaling schedule for Saturday-Sunday".to_string();
            tag_entries(&mut schedule, DaySpan::Weekend);
            schedule
        });

        WeeklySchedules { weekday, weekend }
    }

    fn fill_entries(&self, schedule: &mut ScalingSchedule, summary: &PatternSummary) {
        let mut entries: Vec<ScheduleEntry> = Vec::new();

        for stats in summary.hourly.values() {
            let cpu_factor = stats.mean_cpu / TARGET_CPU_PERCENT;
            let memory_factor = stats.mean_memory / TARGET_MEMORY_PERCENT;
            let scaling_factor = cpu_factor.max(memory_factor);

            let recommended = ((stats.mean_pods * scaling_factor.max(1.0)).round() as u32)
                .clamp(self.min_pods, self.max_pods);

            if summary.is_peak_hour(stats.hour) {
                // Pre-scale half an hour ahead of the peak
                let pre_hour = (stats.hour + 23) % 24;
                entries.push(ScheduleEntry {
                    time: format!("{pre_hour:02}:30"),
                    target_pods: recommended,
                    reason: format!("pre-scale for peak hour {}", stats.hour),
                    day_of_week: None,
                    confidence: 0.90,
                });
            }

            entries.push(ScheduleEntry {
                time: format!("{:02}:00", stats.hour),
                target_pods: recommended,
                reason: format!("scheduled scaling for hour {}", stats.hour),
                day_of_week: None,
                confidence: 0.85,
            });
        }

        for low in &summary.low_traffic_hours {
            entries.push(ScheduleEntry {
                time: format!("{:02}:00", low.hour),
                target_pods: self.min_pods,
                reason: "scale down during low traffic".to_string(),
                day_of_week: None,
                confidence: 0.95,
            });
        }

        schedule.entries = resolve_time_slots(entries);
    }
}

/// Collapse duplicate time slots, last entry wins, then order by time
fn resolve_time_slots(entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    let mut slots: BTreeMap<(String, Option<DaySpan>), ScheduleEntry> = BTreeMap::new();
    for entry in entries {
        slots.insert((entry.time.clone(), entry.day_of_week), entry);
    }
    // "HH:MM" keys sort lexicographically in time order
    slots.into_values().collect()
}

fn tag_entries(schedule: &mut ScalingSchedule, span: DaySpan) {
    for entry in &mut schedule.entries {
        entry.day_of_week = Some(span);
    }
}
