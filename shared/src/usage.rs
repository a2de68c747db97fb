use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::info;

use crate::aggregate::{self, DayBucket, SiteUsage};
use crate::error::DashboardError;
use crate::remote::{Query, TableStore};
use crate::{tables, ActivityRecord};

const ACTIVITY_COLUMNS: &str = "site_or_app,action,duration_seconds,timestamp";

/// Start of `date` in `tz` as an instant.
///
/// When local midnight does not exist (a DST gap) the UTC midnight of the
/// same date is used.
pub fn day_start<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Bound for a `gte` timestamp filter
pub fn since_param(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

/// Activity records for a child, optionally only those at or after `since`
pub async fn fetch_activity(
    store: &dyn TableStore,
    child_id: &str,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<ActivityRecord>, DashboardError> {
    let mut query = Query::new().columns(ACTIVITY_COLUMNS).eq("child_id", child_id);
    if let Some(since) = since {
        query = query.gte("timestamp", since_param(since));
    }
    store
        .select_as(tables::ACTIVITY_LOGS, &query)
        .await
        .map_err(DashboardError::fetch("activity"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyReport {
    pub days: Vec<DayBucket>,
}

impl WeeklyReport {
    pub fn total_hours(&self) -> f64 {
        self.days.iter().map(|d| d.hours).sum()
    }

    pub fn labels(&self) -> Vec<String> {
        self.days.iter().map(DayBucket::key).collect()
    }
}

/// Hours per day for the `days` days ending on `today` in `tz`
pub async fn weekly_report<Tz: TimeZone>(
    store: &dyn TableStore,
    child_id: &str,
    today: NaiveDate,
    days: u32,
    tz: &Tz,
) -> Result<WeeklyReport, DashboardError> {
    let start = aggregate::window_start(today, days);
    info!("Loading {}-day report for child {} from {}", days, child_id, start);

    let records = fetch_activity(store, child_id, Some(day_start(start, tz))).await?;
    Ok(WeeklyReport {
        days: aggregate::aggregate_by_day(&records, today, days, tz),
    })
}

/// Per-site usage against the daily limit
#[derive(Debug, Clone, PartialEq)]
pub struct SiteUsageReport {
    /// Most-used first
    pub sites: Vec<SiteUsage>,
    pub used_minutes: u64,
    pub limit_minutes: u32,
}

impl SiteUsageReport {
    pub fn from_records(records: &[ActivityRecord], limit_minutes: u32) -> Self {
        let sites = aggregate::sorted_by_usage(aggregate::aggregate_by_site(records));
        let used_minutes = sites.iter().fold(0u64, |acc, s| acc.saturating_add(s.minutes));
        Self {
            sites,
            used_minutes,
            limit_minutes,
        }
    }

    pub fn remaining_minutes(&self) -> u64 {
        u64::from(self.limit_minutes).saturating_sub(self.used_minutes)
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Usage of every site the child has logged, over all recorded activity
pub async fn site_usage(
    store: &dyn TableStore,
    child_id: &str,
    limit_minutes: u32,
) -> Result<SiteUsageReport, DashboardError> {
    let records = fetch_activity(store, child_id, None).await?;
    info!("Aggregating {} activity records for child {}", records.len(), child_id);
    Ok(SiteUsageReport::from_records(&records, limit_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use crate::RemoteError;
    use chrono::FixedOffset;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            tables::ACTIVITY_LOGS,
            vec![
                json!({"child_id": 1, "site_or_app": "youtube.com", "action": "Allowed", "duration_seconds": 3600, "timestamp": "2025-03-10T09:00:00Z"}),
                json!({"child_id": 1, "site_or_app": "youtube.com", "action": "Allowed", "duration_seconds": 1800, "timestamp": "2025-03-08T09:00:00Z"}),
                json!({"child_id": 1, "site_or_app": "minecraft", "action": "Allowed", "duration_seconds": 900, "timestamp": "2025-02-01T09:00:00Z"}),
                json!({"child_id": 1, "site_or_app": "x.com", "action": "Blocked", "duration_seconds": null, "timestamp": "2025-03-10T10:00:00Z"}),
                json!({"child_id": 2, "site_or_app": "roblox", "action": "Allowed", "duration_seconds": 7200, "timestamp": "2025-03-10T09:00:00Z"}),
            ],
        );
        store
    }

    #[test]
    fn test_day_start_in_offset_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(since_param(day_start(day(2025, 3, 4), &tz)), "2025-03-03T22:00:00+00:00");
        assert_eq!(since_param(day_start(day(2025, 3, 4), &Utc)), "2025-03-04T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_weekly_report_only_counts_window() {
        let store = seeded();
        let report = weekly_report(&store, "1", day(2025, 3, 10), 7, &Utc).await.unwrap();

        assert_eq!(report.days.len(), 7);
        assert_eq!(report.labels()[0], "2025-03-04");
        assert_eq!(report.days[6].hours, 1.0);
        assert_eq!(report.days[4].hours, 0.5);
        assert!((report.total_hours() - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_weekly_report_without_activity_is_all_zero() {
        let store = MemoryStore::new();
        let report = weekly_report(&store, "1", day(2025, 3, 10), 7, &Utc).await.unwrap();
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.total_hours(), 0.0);
    }

    #[tokio::test]
    async fn test_site_usage_is_all_time_and_per_child() {
        let store = seeded();
        let report = site_usage(&store, "1", 120).await.unwrap();

        let sites: Vec<(&str, u64)> = report.sites.iter().map(|s| (s.site.as_str(), s.minutes)).collect();
        assert_eq!(sites, vec![("youtube.com", 90), ("minecraft", 15), ("x.com", 0)]);
        assert_eq!(report.used_minutes, 105);
        assert_eq!(report.remaining_minutes(), 15);
    }

    #[tokio::test]
    async fn test_remaining_never_negative() {
        let store = seeded();
        let report = site_usage(&store, "2", 60).await.unwrap();
        assert_eq!(report.used_minutes, 120);
        assert_eq!(report.remaining_minutes(), 0);
    }

    #[tokio::test]
    async fn test_site_usage_with_saturated_durations() {
        let store = MemoryStore::new();
        store.seed(
            tables::ACTIVITY_LOGS,
            vec![
                json!({"child_id": 3, "site_or_app": "a.com", "action": "Allowed", "duration_seconds": 1e30}),
                json!({"child_id": 3, "site_or_app": "a.com", "action": "Allowed", "duration_seconds": u64::MAX}),
                json!({"child_id": 3, "site_or_app": "b.com", "action": "Allowed", "duration_seconds": u64::MAX}),
            ],
        );
        let report = site_usage(&store, "3", 120).await.unwrap();
        assert_eq!(report.sites.len(), 2);
        assert!(report.used_minutes >= u64::MAX / 60);
        assert_eq!(report.remaining_minutes(), 0);
    }

    #[tokio::test]
    async fn test_site_usage_empty() {
        let store = MemoryStore::new();
        let report = site_usage(&store, "9", 120).await.unwrap();
        assert!(report.is_empty());
        assert_eq!(report.remaining_minutes(), 120);
    }

    #[tokio::test]
    async fn test_fetch_failure() {
        let store = MemoryStore::new();
        store.fail_table(tables::ACTIVITY_LOGS, RemoteError::Network("offline".to_string()));
        let err = weekly_report(&store, "1", day(2025, 3, 10), 7, &Utc).await.unwrap_err();
        assert_eq!(err.user_message(), "Error loading activity");
    }
}
