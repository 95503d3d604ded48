//! Schedule synthesis from a metrics history file

use crate::{input, output, output::OutputFormat};
use anyhow::Result;
use scaler_lib::schedule::ScheduleSynthesizer;
use std::path::Path;

pub fn run(
    history_path: &Path,
    min_pods: u32,
    max_pods: u32,
    weekly: bool,
    cron: bool,
    workload: &str,
    format: OutputFormat,
) -> Result<()> {
    let history = input::load_history(history_path)?;
    let history = input::timestamped(&history);
    let synthesizer = ScheduleSynthesizer::new(min_pods, max_pods);

    let schedules = if weekly {
        let weekly = synthesizer.build_weekly(&history);
        weekly.weekday.into_iter().chain(weekly.weekend).collect()
    } else {
        vec![synthesizer.build(&history)]
    };

    if schedules.is_empty() {
        output::print_warning("no schedules could be generated from this history");
        return Ok(());
    }

    for schedule in &schedules {
        if cron {
            output::print_cron_jobs(&schedule.to_cron_jobs(workload), format);
        } else {
            output::print_schedule(schedule, format);
        }
    }
    Ok(())
}
