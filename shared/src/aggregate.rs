//! Pure reductions over activity records. Nothing here does I/O.

use chrono::{Duration, NaiveDate, TimeZone};
use std::collections::HashMap;

use crate::lenient::RecordTime;
use crate::ActivityRecord;

/// Total time spent on one calendar day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub hours: f64,
}

impl DayBucket {
    /// `YYYY-MM-DD`, used as the chart label
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Hours rounded to two decimals for display
    pub fn rounded_hours(&self) -> f64 {
        (self.hours * 100.0).round() / 100.0
    }
}

/// Time spent on one site or app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUsage {
    pub site: String,
    pub minutes: u64,
}

/// First day of an `days`-long window that ends on `today`
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(i64::from(days.max(1)) - 1)
}

/// Calendar day a record belongs to in `tz`
pub fn record_day<Tz: TimeZone>(time: &RecordTime, tz: &Tz) -> NaiveDate {
    match time {
        RecordTime::Zoned(instant) => instant.with_timezone(tz).date_naive(),
        RecordTime::Floating(naive) => naive.date(),
    }
}

/// Hours per day over the `days` days ending on `today`, oldest first.
///
/// Every day of the window is present even without activity. Records
/// outside the window or without a usable timestamp are left out.
pub fn aggregate_by_day<Tz: TimeZone>(records: &[ActivityRecord], today: NaiveDate, days: u32, tz: &Tz) -> Vec<DayBucket> {
    let start = window_start(today, days);
    let len = days.max(1) as usize;
    let mut seconds = vec![0u64; len];

    for record in records {
        let Some(time) = &record.timestamp else {
            continue;
        };
        let day = record_day(time, tz);
        let offset = (day - start).num_days();
        if (0..len as i64).contains(&offset) {
            let slot = &mut seconds[offset as usize];
            *slot = slot.saturating_add(record.duration_seconds);
        }
    }

    seconds
        .into_iter()
        .enumerate()
        .map(|(i, secs)| DayBucket {
            date: start + Duration::days(i as i64),
            hours: secs as f64 / 3600.0,
        })
        .collect()
}

/// Whole minutes per site or app; seconds are summed before rounding
pub fn aggregate_by_site(records: &[ActivityRecord]) -> HashMap<String, u64> {
    let mut seconds: HashMap<String, u64> = HashMap::new();
    for record in records {
        let total = seconds.entry(record.site_or_app.clone()).or_insert(0);
        *total = total.saturating_add(record.duration_seconds);
    }
    seconds
        .into_iter()
        .map(|(site, secs)| (site, seconds_to_minutes(secs)))
        .collect()
}

/// Most-used first, ties by name
pub fn sorted_by_usage(usage: HashMap<String, u64>) -> Vec<SiteUsage> {
    let mut rows: Vec<SiteUsage> = usage
        .into_iter()
        .map(|(site, minutes)| SiteUsage { site, minutes })
        .collect();
    rows.sort_by(|a, b| b.minutes.cmp(&a.minutes).then_with(|| a.site.cmp(&b.site)));
    rows
}

pub fn sorted_by_name(usage: HashMap<String, u64>) -> Vec<SiteUsage> {
    let mut rows: Vec<SiteUsage> = usage
        .into_iter()
        .map(|(site, minutes)| SiteUsage { site, minutes })
        .collect();
    rows.sort_by(|a, b| a.site.cmp(&b.site));
    rows
}

pub fn sum_durations(records: &[ActivityRecord]) -> u64 {
    records
        .iter()
        .fold(0u64, |acc, record| acc.saturating_add(record.duration_seconds))
}

pub fn count_where(records: &[ActivityRecord], predicate: impl Fn(&ActivityRecord) -> bool) -> usize {
    records.iter().filter(|record| predicate(record)).count()
}

pub fn count_blocked(records: &[ActivityRecord]) -> usize {
    count_where(records, ActivityRecord::is_blocked)
}

/// Rounded to the nearest minute
pub fn seconds_to_minutes(seconds: u64) -> u64 {
    seconds / 60 + u64::from(seconds % 60 >= 30)
}
