use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Project URL, e.g. https://abc.supabase.co
    pub supabase_url: String,
    /// Public anon key sent as `apikey` on every request
    pub supabase_anon_key: String,
    /// Upper bound for every remote call
    pub request_timeout_ms: u32,
    /// Number of trailing days shown in the weekly report
    pub report_window_days: u32,
    /// Used when a child has no settings row yet
    pub default_time_limit_minutes: u32,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            request_timeout_ms: 10_000,
            report_window_days: 7,
            default_time_limit_minutes: 120,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl DashboardConfig {
    /// Build from values baked in at compile time; `None` keeps the default
    pub fn from_build_env(
        supabase_url: Option<&str>,
        supabase_anon_key: Option<&str>,
        log_level: Option<&str>,
    ) -> Self {
        let mut config = Self::default();
        if let Some(url) = supabase_url {
            config.supabase_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(key) = supabase_anon_key {
            config.supabase_anon_key = key.trim().to_string();
        }
        if let Some(level) = log_level {
            config.log_level = level.trim().to_string();
        }
        config
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.supabase_url = config.supabase_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supabase_url.is_empty() {
            return Err(ConfigError::Missing("supabase_url"));
        }
        if !self.supabase_url.starts_with("http://") && !self.supabase_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "supabase_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.supabase_anon_key.is_empty() {
            return Err(ConfigError::Missing("supabase_anon_key"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.report_window_days == 0 {
            return Err(ConfigError::Invalid {
                field: "report_window_days",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed `log_level`, falling back to Info for unknown values
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.report_window_days, 7);
        assert_eq!(config.default_time_limit_minutes, 120);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.validate(), Err(ConfigError::Missing("supabase_url")));
    }

    #[test]
    fn test_from_build_env() {
        let config = DashboardConfig::from_build_env(Some("https://abc.supabase.co/"), Some(" key "), None);
        assert_eq!(config.supabase_url, "https://abc.supabase.co");
        assert_eq!(config.supabase_anon_key, "key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = DashboardConfig::from_json(
            r#"{"supabase_url": "https://x.supabase.co", "supabase_anon_key": "k", "report_window_days": 14}"#,
        )
        .unwrap();
        assert_eq!(config.report_window_days, 14);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert!(DashboardConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DashboardConfig::from_build_env(Some("ftp://x"), Some("k"), None);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "supabase_url", .. })));

        config.supabase_url = "https://x.supabase.co".to_string();
        config.request_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "request_timeout_ms", .. })));
    }

    #[test]
    fn test_log_level_filter() {
        let mut config = DashboardConfig::default();
        config.log_level = "debug".to_string();
        assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);
        config.log_level = "chatty".to_string();
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
    }
}
