use serde::{Deserialize, Serialize};
use std::fmt;

pub mod aggregate;
pub mod auth;
pub mod blocking;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod format;
pub mod lenient;
pub mod overview;
pub mod picker;
pub mod remote;
pub mod selection;
pub mod settings;
pub mod usage;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DashboardError, RemoteError, ValidationError};
pub use lenient::RecordTime;

/// Table names in the remote store
pub mod tables {
    pub const PARENTS: &str = "parents";
    pub const CHILDREN: &str = "children";
    pub const CHILD_SETTINGS: &str = "child_settings";
    pub const ACTIVITY_LOGS: &str = "activity_logs";
    pub const BLOCKED_SITES: &str = "blocked_sites";
}

/// A child profile owned by one parent account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    #[serde(deserialize_with = "lenient::id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_id_string", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Child {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }
}

/// The `parents` row for a signed-in account.
///
/// Credentials live only with the auth provider; this row never carries a
/// password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Set once at sign-up; omitted from later upserts so it is never rotated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_key: Option<String>,
}

/// One usage event reported for a child (a visit, an app session, a block)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityRecord {
    #[serde(default, deserialize_with = "lenient::opt_id_string")]
    pub child_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub site_or_app: String,
    /// e.g. "Allowed" or "Blocked"
    #[serde(default, deserialize_with = "lenient::label")]
    pub action: String,
    /// Missing or malformed durations decode as zero
    #[serde(default, deserialize_with = "lenient::seconds")]
    pub duration_seconds: u64,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub timestamp: Option<RecordTime>,
}

impl ActivityRecord {
    pub fn new(site_or_app: &str, action: &str, duration_seconds: u64, timestamp: Option<RecordTime>) -> Self {
        Self {
            child_id: None,
            site_or_app: site_or_app.to_string(),
            action: action.to_string(),
            duration_seconds,
            timestamp,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.action.trim().eq_ignore_ascii_case("blocked")
    }
}

/// Per-child settings as the pages use them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSettings {
    pub time_limit_minutes: u32,
    pub vpn_enabled: bool,
}

/// Raw `child_settings` row; either field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsRow {
    #[serde(default, deserialize_with = "lenient::opt_minutes")]
    pub time_limit_minutes: Option<u32>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub vpn_enabled: bool,
}

/// Partial `child_settings` upsert; absent fields are left untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
    pub child_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpn_enabled: Option<bool>,
}

/// Status of a `blocked_sites` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SiteStatus {
    Blocked,
    Unblocked,
    Other(String),
}

impl SiteStatus {
    fn unknown() -> Self {
        SiteStatus::Other(String::new())
    }
}

impl From<String> for SiteStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "blocked" => SiteStatus::Blocked,
            "unblocked" => SiteStatus::Unblocked,
            _ => SiteStatus::Other(value),
        }
    }
}

impl From<SiteStatus> for String {
    fn from(status: SiteStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteStatus::Blocked => write!(f, "blocked"),
            SiteStatus::Unblocked => write!(f, "unblocked"),
            SiteStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// A row of the `blocked_sites` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockedSite {
    #[serde(deserialize_with = "lenient::id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::opt_id_string")]
    pub child_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub domain: String,
    #[serde(default = "SiteStatus::unknown")]
    pub status: SiteStatus,
    #[serde(default, deserialize_with = "lenient::opt_id_string")]
    pub added_by: Option<String>,
    /// RFC 3339 timestamp set by the store
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Insert payload for a new blocked domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBlockedSite {
    pub child_id: String,
    pub domain: String,
    pub added_by: Option<String>,
    pub status: SiteStatus,
}
