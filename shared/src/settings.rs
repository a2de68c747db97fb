use log::{info, warn};

use crate::error::{DashboardError, ValidationError};
use crate::remote::{Query, TableStore};
use crate::{tables, ChildSettings, SettingsRow, SettingsUpdate};

/// Range of the time-limit slider, in hours
pub const MIN_LIMIT_HOURS: u32 = 1;
pub const MAX_LIMIT_HOURS: u32 = 12;

/// Largest daily limit accepted from the minutes input
pub const MAX_LIMIT_MINUTES: u32 = 24 * 60;

/// Settings for a child; a missing row (or missing limit) yields defaults
pub async fn load_settings(
    store: &dyn TableStore,
    child_id: &str,
    default_limit_minutes: u32,
) -> Result<ChildSettings, DashboardError> {
    let query = Query::new()
        .columns("time_limit_minutes,vpn_enabled")
        .eq("child_id", child_id);
    let row: Option<SettingsRow> = store
        .select_one(tables::CHILD_SETTINGS, &query)
        .await
        .map_err(DashboardError::fetch("settings"))?;

    let row = row.unwrap_or_else(|| {
        info!("No settings stored for child {}, using defaults", child_id);
        SettingsRow::default()
    });
    Ok(ChildSettings {
        time_limit_minutes: row.time_limit_minutes.unwrap_or(default_limit_minutes),
        vpn_enabled: row.vpn_enabled,
    })
}

pub fn validate_limit_minutes(value: i64) -> Result<u32, ValidationError> {
    if (0..=i64::from(MAX_LIMIT_MINUTES)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ValidationError::InvalidTimeLimit {
            value,
            min: 0,
            max: MAX_LIMIT_MINUTES,
        })
    }
}

/// Slider hours to stored minutes
pub fn validate_limit_hours(hours: i64) -> Result<u32, ValidationError> {
    if (i64::from(MIN_LIMIT_HOURS)..=i64::from(MAX_LIMIT_HOURS)).contains(&hours) {
        Ok(hours as u32 * 60)
    } else {
        Err(ValidationError::InvalidTimeLimit {
            value: hours * 60,
            min: MIN_LIMIT_HOURS * 60,
            max: MAX_LIMIT_HOURS * 60,
        })
    }
}

fn require_child(child_id: Option<&str>) -> Result<&str, ValidationError> {
    child_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ValidationError::NoChildSelected)
}

/// Upsert the given fields of the settings row, keyed on `child_id`
pub async fn update_settings(store: &dyn TableStore, update: &SettingsUpdate) -> Result<(), DashboardError> {
    info!("Updating settings for child {}", update.child_id);
    store
        .upsert_as(tables::CHILD_SETTINGS, update, "child_id")
        .await
        .map_err(|e| {
            warn!("Settings update for child {} failed: {}", update.child_id, e);
            DashboardError::write("settings")(e)
        })
}

/// Save a limit given in minutes; returns the stored value
pub async fn save_time_limit(
    store: &dyn TableStore,
    child_id: Option<&str>,
    minutes: i64,
) -> Result<u32, DashboardError> {
    let child_id = require_child(child_id)?;
    let minutes = validate_limit_minutes(minutes)?;
    update_settings(
        store,
        &SettingsUpdate {
            child_id: child_id.to_string(),
            time_limit_minutes: Some(minutes),
            vpn_enabled: None,
        },
    )
    .await?;
    Ok(minutes)
}

/// Save a limit picked on the hour slider; returns the stored minutes
pub async fn save_time_limit_hours(
    store: &dyn TableStore,
    child_id: Option<&str>,
    hours: i64,
) -> Result<u32, DashboardError> {
    let child_id = require_child(child_id)?;
    let minutes = validate_limit_hours(hours)?;
    save_time_limit(store, Some(child_id), i64::from(minutes)).await
}

pub async fn set_vpn_enabled(store: &dyn TableStore, child_id: Option<&str>, enabled: bool) -> Result<(), DashboardError> {
    let child_id = require_child(child_id)?;
    update_settings(
        store,
        &SettingsUpdate {
            child_id: child_id.to_string(),
            time_limit_minutes: None,
            vpn_enabled: Some(enabled),
        },
    )
    .await
}
