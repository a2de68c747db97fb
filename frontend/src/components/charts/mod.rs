pub mod usage_bar_chart;
pub mod usage_donut;

pub use usage_bar_chart::UsageBarChart;
pub use usage_donut::UsageDonut;
