use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::aggregate;
use crate::error::DashboardError;
use crate::format;
use crate::remote::TableStore;
use crate::settings;
use crate::usage;

/// Today's headline numbers for one child
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewSummary {
    pub child_id: String,
    pub vpn_enabled: bool,
    pub time_limit_minutes: u32,
    pub used_minutes_today: u64,
    pub blocked_attempts_today: usize,
}

impl OverviewSummary {
    pub fn vpn_label(&self) -> &'static str {
        if self.vpn_enabled {
            "ON"
        } else {
            "OFF"
        }
    }

    pub fn limit_label(&self) -> String {
        format::limit_label(self.time_limit_minutes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverviewState {
    Idle,
    /// No child selected
    Empty,
    Loading { child_id: String },
    Loaded(OverviewSummary),
    Failed(String),
}

/// Placeholder shown for every number that is not available
pub const PLACEHOLDER: &str = "--";

impl OverviewState {
    /// State to enter when the selection becomes `child_id`
    pub fn start(child_id: Option<&str>) -> Self {
        match child_id {
            Some(id) => OverviewState::Loading {
                child_id: id.to_string(),
            },
            None => OverviewState::Empty,
        }
    }

    pub fn finish(result: Result<OverviewSummary, DashboardError>) -> Self {
        match result {
            Ok(summary) => OverviewState::Loaded(summary),
            Err(e) => {
                warn!("Overview failed to load: {}", e);
                OverviewState::Failed(e.user_message())
            }
        }
    }

    pub fn summary(&self) -> Option<&OverviewSummary> {
        match self {
            OverviewState::Loaded(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn vpn_text(&self) -> String {
        self.summary()
            .map(|s| s.vpn_label().to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn limit_text(&self) -> String {
        self.summary()
            .map(OverviewSummary::limit_label)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn used_text(&self) -> String {
        self.summary()
            .map(|s| format!("{} min", s.used_minutes_today))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn blocked_text(&self) -> String {
        self.summary()
            .map(|s| s.blocked_attempts_today.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OverviewState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Settings plus today's activity for `child_id`.
///
/// `since` is the start of the current local day. Either fetch failing
/// fails the whole summary so no stale or partial numbers are shown.
pub async fn load_overview(
    store: &dyn TableStore,
    child_id: &str,
    since: DateTime<Utc>,
    default_limit_minutes: u32,
) -> Result<OverviewSummary, DashboardError> {
    info!("Loading overview for child {}", child_id);

    let settings = settings::load_settings(store, child_id, default_limit_minutes).await?;
    let records = usage::fetch_activity(store, child_id, Some(since)).await?;

    Ok(OverviewSummary {
        child_id: child_id.to_string(),
        vpn_enabled: settings.vpn_enabled,
        time_limit_minutes: settings.time_limit_minutes,
        used_minutes_today: aggregate::seconds_to_minutes(aggregate::sum_durations(&records)),
        blocked_attempts_today: aggregate::count_blocked(&records),
    })
}

/// Selection a fetch was started for.
///
/// A result is applied only if the selection is still the same when it
/// arrives; otherwise it belongs to a child the parent has moved away from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStamp {
    child_id: Option<String>,
}

impl FetchStamp {
    pub fn new(child_id: Option<&str>) -> Self {
        Self {
            child_id: child_id.map(str::to_string),
        }
    }

    pub fn child_id(&self) -> Option<&str> {
        self.child_id.as_deref()
    }

    pub fn is_current(&self, current: Option<&str>) -> bool {
        let current_matches = self.child_id.as_deref() == current;
        if !current_matches {
            info!(
                "Discarding result for {:?}, selection is now {:?}",
                self.child_id, current
            );
        }
        current_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use crate::{tables, RemoteError};
    use chrono::TimeZone;
    use serde_json::json;

    fn midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            tables::CHILD_SETTINGS,
            vec![json!({"child_id": "c1", "time_limit_minutes": 90, "vpn_enabled": true})],
        );
        store.seed(
            tables::ACTIVITY_LOGS,
            vec![
                json!({"child_id": "c1", "site_or_app": "youtube.com", "action": "Allowed", "duration_seconds": 1500, "timestamp": "2025-03-10T08:00:00Z"}),
                json!({"child_id": "c1", "site_or_app": "tiktok.com", "action": "Blocked", "duration_seconds": 0, "timestamp": "2025-03-10T09:00:00Z"}),
                json!({"child_id": "c1", "site_or_app": "x.com", "action": "blocked", "duration_seconds": null, "timestamp": "2025-03-10T10:00:00Z"}),
                json!({"child_id": "c1", "site_or_app": "youtube.com", "action": "Allowed", "duration_seconds": 9000, "timestamp": "2025-03-09T20:00:00Z"}),
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_summary_counts_today_only() {
        let store = seeded();
        let summary = load_overview(&store, "c1", midnight(), 120).await.unwrap();
        assert!(summary.vpn_enabled);
        assert_eq!(summary.vpn_label(), "ON");
        assert_eq!(summary.limit_label(), "1.5h max");
        assert_eq!(summary.used_minutes_today, 25);
        assert_eq!(summary.blocked_attempts_today, 2);
    }

    #[tokio::test]
    async fn test_saturated_duration_does_not_break_summary() {
        let store = MemoryStore::new();
        store.seed(
            tables::ACTIVITY_LOGS,
            vec![
                json!({"child_id": "c5", "site_or_app": "a.com", "action": "Allowed", "duration_seconds": 1e30, "timestamp": "2025-03-10T08:00:00Z"}),
                json!({"child_id": "c5", "site_or_app": "b.com", "action": "Allowed", "duration_seconds": u64::MAX, "timestamp": "2025-03-10T09:00:00Z"}),
            ],
        );
        let summary = load_overview(&store, "c5", midnight(), 120).await.unwrap();
        assert_eq!(summary.used_minutes_today, u64::MAX / 60);
        assert_eq!(summary.blocked_attempts_today, 0);
    }

    #[tokio::test]
    async fn test_defaults_without_settings_row() {
        let store = MemoryStore::new();
        let summary = load_overview(&store, "c2", midnight(), 120).await.unwrap();
        assert!(!summary.vpn_enabled);
        assert_eq!(summary.limit_label(), "2h max");
        assert_eq!(summary.used_minutes_today, 0);
        assert_eq!(summary.blocked_attempts_today, 0);
    }

    #[tokio::test]
    async fn test_activity_failure_fails_whole_summary() {
        let store = seeded();
        store.fail_table(tables::ACTIVITY_LOGS, RemoteError::Timeout(10_000));
        let state = OverviewState::finish(load_overview(&store, "c1", midnight(), 120).await);

        assert!(matches!(state, OverviewState::Failed(_)));
        assert_eq!(state.error(), Some("Error loading activity"));
        assert_eq!(state.vpn_text(), PLACEHOLDER);
        assert_eq!(state.limit_text(), PLACEHOLDER);
        assert_eq!(state.used_text(), PLACEHOLDER);
        assert_eq!(state.blocked_text(), PLACEHOLDER);
    }

    #[test]
    fn test_start_without_selection_is_empty() {
        assert_eq!(OverviewState::start(None), OverviewState::Empty);
        assert_eq!(
            OverviewState::start(Some("c1")),
            OverviewState::Loading {
                child_id: "c1".to_string()
            }
        );
    }

    #[test]
    fn test_loaded_texts() {
        let state = OverviewState::Loaded(OverviewSummary {
            child_id: "c1".to_string(),
            vpn_enabled: false,
            time_limit_minutes: 45,
            used_minutes_today: 12,
            blocked_attempts_today: 3,
        });
        assert_eq!(state.vpn_text(), "OFF");
        assert_eq!(state.limit_text(), "45 min max");
        assert_eq!(state.used_text(), "12 min");
        assert_eq!(state.blocked_text(), "3");
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_stale_stamp_is_rejected() {
        let stamp = FetchStamp::new(Some("a"));
        assert!(stamp.is_current(Some("a")));
        assert!(!stamp.is_current(Some("b")));
        assert!(!stamp.is_current(None));
        assert!(FetchStamp::new(None).is_current(None));
    }

    #[tokio::test]
    async fn test_late_response_after_switch_is_discarded() {
        let store = seeded();
        let mut current = Some("c1".to_string());
        let stamp = FetchStamp::new(current.as_deref());
        let result = load_overview(&store, "c1", midnight(), 120).await;

        // parent switched children while the request was in flight
        current = Some("c2".to_string());
        let mut state = OverviewState::start(current.as_deref());
        if stamp.is_current(current.as_deref()) {
            state = OverviewState::finish(result);
        }
        assert_eq!(
            state,
            OverviewState::Loading {
                child_id: "c2".to_string()
            }
        );
    }
}
