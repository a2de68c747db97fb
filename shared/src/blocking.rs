use log::{info, warn};
use serde_json::json;

use crate::error::{DashboardError, ValidationError};
use crate::remote::{Filter, Query, TableStore};
use crate::{tables, BlockedSite, NewBlockedSite, SiteStatus};

/// Trimmed, lower-cased domain; empty input is rejected
pub fn normalize_domain(raw: &str) -> Result<String, ValidationError> {
    let domain = raw.trim().to_lowercase();
    if domain.is_empty() {
        Err(ValidationError::EmptyDomain)
    } else {
        Ok(domain)
    }
}

/// Keep only the rows with `status`
pub fn filter_by_status(sites: Vec<BlockedSite>, status: &SiteStatus) -> Vec<BlockedSite> {
    sites.into_iter().filter(|site| &site.status == status).collect()
}

/// Domains currently blocked for a child, newest first
pub async fn list_blocked(store: &dyn TableStore, child_id: &str) -> Result<Vec<BlockedSite>, DashboardError> {
    let query = Query::new()
        .eq("child_id", child_id)
        .eq("status", SiteStatus::Blocked.to_string())
        .order_by("created_at", false);
    let sites: Vec<BlockedSite> = store
        .select_as(tables::BLOCKED_SITES, &query)
        .await
        .map_err(DashboardError::fetch("blocked sites"))?;

    Ok(filter_by_status(sites, &SiteStatus::Blocked))
}

/// Block `raw_domain` for the selected child; returns the stored domain
pub async fn add_site(
    store: &dyn TableStore,
    child_id: Option<&str>,
    added_by: Option<&str>,
    raw_domain: &str,
) -> Result<String, DashboardError> {
    let child_id = child_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(ValidationError::NoChildSelected)?;
    let domain = normalize_domain(raw_domain)?;

    info!("Blocking {} for child {}", domain, child_id);
    let row = NewBlockedSite {
        child_id: child_id.to_string(),
        domain: domain.clone(),
        added_by: added_by.map(str::to_string),
        status: SiteStatus::Blocked,
    };
    store
        .insert_as(tables::BLOCKED_SITES, &row)
        .await
        .map_err(|e| {
            warn!("Blocking {} failed: {}", domain, e);
            DashboardError::write("blocked sites")(e)
        })?;
    Ok(domain)
}

/// Mark a blocked-site row as unblocked
pub async fn unblock_site(store: &dyn TableStore, site_id: &str) -> Result<(), DashboardError> {
    info!("Unblocking site {}", site_id);
    store
        .update(
            tables::BLOCKED_SITES,
            json!({ "status": SiteStatus::Unblocked.to_string() }),
            &[Filter::eq("id", site_id)],
        )
        .await
        .map_err(DashboardError::write("blocked sites"))
}
