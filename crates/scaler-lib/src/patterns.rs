//! Historical pattern extraction
//!
//! Aggregates a metrics history into per-hour and per-day statistics
//! and derives peak and low-traffic hour lists. Built fresh per call;
//! empty history yields an explicit empty summary, never an error.

use crate::models::MetricsSnapshot;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Peak threshold: hourly mean must exceed 1.5x the mean of hourly means
const PEAK_FACTOR: f64 = 1.5;

/// Low-traffic threshold: hourly mean must fall below 0.5x the global mean
const LOW_TRAFFIC_FACTOR: f64 = 0.5;

/// Aggregate statistics for one hour-of-day bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyStats {
    pub hour: u32,
    pub mean_cpu: f64,
    pub mean_memory: f64,
    pub mean_request_rate: f64,
    pub mean_pods: f64,
    pub max_pods: u32,
}

/// Aggregate statistics for one day-of-week bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub day: String,
    pub mean_cpu: f64,
    pub mean_memory: f64,
    pub mean_request_rate: f64,
    pub mean_pods: f64,
}

/// An hour whose load stands out above the rest of the day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakHour {
    pub hour: u32,
    pub mean_cpu: f64,
    pub mean_request_rate: f64,
}

/// An hour with markedly low cpu and traffic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowTrafficHour {
    pub hour: u32,
    pub mean_cpu: f64,
    pub mean_request_rate: f64,
}

/// Derived, read-only view over a history window
#[derive(Debug, Clone, Serialize)]
pub struct PatternSummary {
    pub hourly: BTreeMap<u32, HourlyStats>,
    pub daily: BTreeMap<String, DailyStats>,
    /// Sorted descending by mean cpu
    pub peak_hours: Vec<PeakHour>,
    /// Sorted ascending by hour
    pub low_traffic_hours: Vec<LowTrafficHour>,
    pub analyzed_at: DateTime<Utc>,
}

impl PatternSummary {
    fn empty() -> Self {
        Self {
            hourly: BTreeMap::new(),
            daily: BTreeMap::new(),
            peak_hours: Vec::new(),
            low_traffic_hours: Vec::new(),
            analyzed_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hourly.is_empty()
    }

    pub fn is_peak_hour(&self, hour: u32) -> bool {
        self.peak_hours.iter().any(|p| p.hour == hour)
    }
}

/// Group a history by hour-of-day and day-of-week and derive peaks
pub fn analyze_patterns(history: &[(DateTime<Utc>, MetricsSnapshot)]) -> PatternSummary {
    if history.is_empty() {
        return PatternSummary::empty();
    }

    let mut hourly_buckets: BTreeMap<u32, Vec<&MetricsSnapshot>> = BTreeMap::new();
    let mut daily_buckets: BTreeMap<String, Vec<&MetricsSnapshot>> = BTreeMap::new();

    for (timestamp, snapshot) in history {
        hourly_buckets.entry(timestamp.hour()).or_default().push(snapshot);
        daily_buckets
            .entry(timestamp.weekday().to_string())
            .or_default()
            .push(snapshot);
    }

    let hourly: BTreeMap<u32, HourlyStats> = hourly_buckets
        .into_iter()
        .map(|(hour, group)| {
            let n = group.len() as f64;
            (
                hour,
                HourlyStats {
                    hour,
                    mean_cpu: group.iter().map(|m| m.cpu_utilization).sum::<f64>() / n,
                    mean_memory: group.iter().map(|m| m.memory_utilization).sum::<f64>() / n,
                    mean_request_rate: group.iter().map(|m| m.request_rate).sum::<f64>() / n,
                    mean_pods: group.iter().map(|m| f64::from(m.pod_count)).sum::<f64>() / n,
                    max_pods: group.iter().map(|m| m.pod_count).max().unwrap_or(0),
                },
            )
        })
        .collect();

    let daily: BTreeMap<String, DailyStats> = daily_buckets
        .into_iter()
        .map(|(day, group)| {
            let n = group.len() as f64;
            let stats = DailyStats {
                day: day.clone(),
                mean_cpu: group.iter().map(|m| m.cpu_utilization).sum::<f64>() / n,
                mean_memory: group.iter().map(|m| m.memory_utilization).sum::<f64>() / n,
                mean_request_rate: group.iter().map(|m| m.request_rate).sum::<f64>() / n,
                mean_pods: group.iter().map(|m| f64::from(m.pod_count)).sum::<f64>() / n,
            };
            (day, stats)
        })
        .collect();

    let peak_hours = identify_peak_hours(&hourly);
    let low_traffic_hours = identify_low_traffic_hours(&hourly);

    PatternSummary {
        hourly,
        daily,
        peak_hours,
        low_traffic_hours,
        analyzed_at: Utc::now(),
    }
}

/// Hours whose mean cpu or request rate exceed 1.5x the hourly-means average
fn identify_peak_hours(hourly: &BTreeMap<u32, HourlyStats>) -> Vec<PeakHour> {
    if hourly.is_empty() {
        return Vec::new();
    }

    let n = hourly.len() as f64;
    let avg_cpu = hourly.values().map(|h| h.mean_cpu).sum::<f64>() / n;
    let avg_rps = hourly.values().map(|h| h.mean_request_rate).sum::<f64>() / n;

    let mut peaks: Vec<PeakHour> = hourly
        .values()
        .filter(|h| h.mean_cpu > avg_cpu * PEAK_FACTOR || h.mean_request_rate > avg_rps * PEAK_FACTOR)
        .map(|h| PeakHour {
            hour: h.hour,
            mean_cpu: h.mean_cpu,
            mean_request_rate: h.mean_request_rate,
        })
        .collect();

    peaks.sort_by(|a, b| {
        b.mean_cpu
            .partial_cmp(&a.mean_cpu)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    peaks
}

/// Hours whose mean cpu and request rate both fall below half the average
fn identify_low_traffic_hours(hourly: &BTreeMap<u32, HourlyStats>) -> Vec<LowTrafficHour> {
    if hourly.is_empty() {
        return Vec::new();
    }

    let n = hourly.len() as f64;
    let avg_cpu = hourly.values().map(|h| h.mean_cpu).sum::<f64>() / n;
    let avg_rps = hourly.values().map(|h| h.mean_request_rate).sum::<f64>() / n;

    // BTreeMap iteration keeps the ascending-by-hour order
    hourly
        .values()
        .filter(|h| {
            h.mean_cpu < avg_cpu * LOW_TRAFFIC_FACTOR && h.mean_request_rate < avg_rps * LOW_TRAFFIC_FACTOR
        })
        .map(|h| LowTrafficHour {
            hour: h.hour,
            mean_cpu: h.mean_cpu,
            mean_request_rate: h.mean_request_rate,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_hour(hour: u32, snapshot: MetricsSnapshot) -> (DateTime<Utc>, MetricsSnapshot) {
        let ts = Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap(); // a Monday
        (ts, snapshot.with_timestamp(ts))
    }

    fn daily_curve() -> Vec<(DateTime<Utc>, MetricsSnapshot)> {
        // Quiet nights, busy early afternoon
        (0..24)
            .map(|hour| {
                let (cpu, rps, pods) = match hour {
                    13 | 14 => (90.0, 800.0, 8),
                    9..=12 | 15..=17 => (50.0, 300.0, 5),
                    _ => (10.0, 40.0, 3),
                };
                at_hour(hour, MetricsSnapshot::new(cpu, 50.0, pods).with_request_rate(rps))
            })
            .collect()
    }

    #[test]
    fn test_empty_history_yields_empty_summary() {
        let summary = analyze_patterns(&[]);
        assert!(summary.is_empty());
        assert!(summary.peak_hours.is_empty());
        assert!(summary.low_traffic_hours.is_empty());
    }

    #[test]
    fn test_hourly_means_and_max_pods() {
        let history = vec![
            at_hour(10, MetricsSnapshot::new(40.0, 60.0, 4).with_request_rate(100.0)),
            at_hour(10, MetricsSnapshot::new(60.0, 40.0, 6).with_request_rate(300.0)),
        ];

        let summary = analyze_patterns(&history);
        let hour = &summary.hourly[&10];
        assert_eq!(hour.mean_cpu, 50.0);
        assert_eq!(hour.mean_memory, 50.0);
        assert_eq!(hour.mean_request_rate, 200.0);
        assert_eq!(hour.mean_pods, 5.0);
        assert_eq!(hour.max_pods, 6);
    }

    #[test]
    fn test_daily_grouping_uses_weekday_names() {
        let history = daily_curve();
        let summary = analyze_patterns(&history);
        assert!(summary.daily.contains_key("Mon"));
        assert_eq!(summary.daily.len(), 1);
    }

    #[test]
    fn test_peak_hours_sorted_by_cpu_descending() {
        let summary = analyze_patterns(&daily_curve());

        assert!(!summary.peak_hours.is_empty());
        for pair in summary.peak_hours.windows(2) {
            assert!(pair[0].mean_cpu >= pair[1].mean_cpu);
        }
        assert!(summary.is_peak_hour(13));
        assert!(summary.is_peak_hour(14));
    }

    #[test]
    fn test_low_traffic_hours_sorted_by_hour_ascending() {
        let summary = analyze_patterns(&daily_curve());

        assert!(!summary.low_traffic_hours.is_empty());
        for pair in summary.low_traffic_hours.windows(2) {
            assert!(pair[0].hour < pair[1].hour);
        }
        // Night hours are well below half the global average
        assert!(summary.low_traffic_hours.iter().any(|h| h.hour == 3));
        // Peak hours never show up as low traffic
        assert!(summary.low_traffic_hours.iter().all(|h| h.hour != 13));
    }

    #[test]
    fn test_uniform_load_has_no_peaks_or_lows() {
        let history: Vec<_> = (0..24)
            .map(|hour| at_hour(hour, MetricsSnapshot::new(50.0, 50.0, 4).with_request_rate(200.0)))
            .collect();

        let summary = analyze_patterns(&history);
        assert!(summary.peak_hours.is_empty());
        assert!(summary.low_traffic_hours.is_empty());
    }
}
