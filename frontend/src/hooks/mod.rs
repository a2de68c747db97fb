pub mod use_active_child;
pub mod use_child_data;
pub mod use_dashboard_data;
pub mod use_overview;
pub mod use_session;

pub use use_active_child::{use_active_child, use_storage_bridge};
pub use use_child_data::ChildData;
pub use use_dashboard_data::{use_blocked_sites, use_time_management, use_weekly_report};
pub use use_overview::use_overview;
pub use use_session::{use_session, SessionState};
