pub mod charts;
pub mod child_selector_menu;
pub mod header;
pub mod login_page;
pub mod overview_page;
pub mod reports_page;
pub mod time_management_page;
pub mod website_blocking_page;

pub use header::Header;
pub use login_page::LoginPage;
pub use overview_page::OverviewPage;
pub use reports_page::ReportsPage;
pub use time_management_page::TimeManagementPage;
pub use website_blocking_page::WebsiteBlockingPage;
