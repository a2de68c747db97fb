use shared::blocking;
use shared::error::DashboardError;
use shared::settings;
use shared::usage::{self, SiteUsageReport, WeeklyReport};
use shared::{BlockedSite, ChildSettings};

use super::use_child_data::{use_child_data, UseChildDataResult};
use crate::services::{date_utils, Services};
use yew::prelude::*;

#[hook]
pub fn use_weekly_report(services: &Services, child_id: Option<String>) -> UseChildDataResult<WeeklyReport> {
    let services = services.clone();
    let active = services.active.clone();
    use_child_data(&active, child_id, move |id| {
        let services = services.clone();
        async move {
            usage::weekly_report(
                &services.api,
                &id,
                date_utils::today(),
                services.config.report_window_days,
                &chrono::Local,
            )
            .await
        }
    })
}

#[derive(Clone, PartialEq)]
pub struct TimeManagementData {
    pub settings: ChildSettings,
    pub usage: SiteUsageReport,
}

#[hook]
pub fn use_time_management(services: &Services, child_id: Option<String>) -> UseChildDataResult<TimeManagementData> {
    let services = services.clone();
    let active = services.active.clone();
    use_child_data(&active, child_id, move |id| {
        let services = services.clone();
        async move {
            let settings =
                settings::load_settings(&services.api, &id, services.config.default_time_limit_minutes).await?;
            let usage = usage::site_usage(&services.api, &id, settings.time_limit_minutes).await?;
            Ok::<_, DashboardError>(TimeManagementData { settings, usage })
        }
    })
}

#[derive(Clone, PartialEq)]
pub struct BlockingData {
    pub sites: Vec<BlockedSite>,
    pub settings: ChildSettings,
}

#[hook]
pub fn use_blocked_sites(services: &Services, child_id: Option<String>) -> UseChildDataResult<BlockingData> {
    let services = services.clone();
    let active = services.active.clone();
    use_child_data(&active, child_id, move |id| {
        let services = services.clone();
        async move {
            let sites = blocking::list_blocked(&services.api, &id).await?;
            let settings =
                settings::load_settings(&services.api, &id, services.config.default_time_limit_minutes).await?;
            Ok::<_, DashboardError>(BlockingData { sites, settings })
        }
    })
}
